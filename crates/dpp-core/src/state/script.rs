//! The bootstrap script model.
//!
//! The script is kept as typed statements until it is written, so the
//! cache guard is an explicit abort in the script's control flow instead of
//! a string that happens to contain `throw`.

use std::sync::LazyLock;

use dpp_fs::NormalizedPath;
use regex::Regex;
use serde_json::Value;

/// Message thrown by the bootstrap script when its cache cannot be used.
pub const CACHE_LOADING_ERROR: &str = "Cache loading error";

static VIM_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^\s*$|^\s*""#).unwrap());

static LUA_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*$|^\s*--").unwrap());

/// Language of an inline startup fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Vim,
    Lua,
}

impl Dialect {
    /// `.lua` files are Lua, everything else is Vim script.
    pub fn of(path: &NormalizedPath) -> Self {
        match path.extension() {
            Some("lua") => Dialect::Lua,
            _ => Dialect::Vim,
        }
    }

    /// Blank lines and whole-line comments.
    pub fn is_noise(self, line: &str) -> bool {
        match self {
            Dialect::Vim => VIM_NOISE.is_match(line),
            Dialect::Lua => LUA_NOISE.is_match(line),
        }
    }
}

/// Conditions under which the bootstrap aborts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// The editor's cache version or initial runtimepath differs from the
    /// ones the script was compiled against.
    StaleCache {
        cache_version: String,
        init_runtimepath: String,
    },
    /// The loaded plugin table is empty.
    EmptyPlugins,
}

impl Guard {
    fn condition(&self) -> String {
        match self {
            Guard::StaleCache {
                cache_version,
                init_runtimepath,
            } => format!(
                "g:dpp#_cache_version !=# {} || g:dpp#_init_runtimepath !=# {}",
                cache_version,
                vim_string(init_runtimepath)
            ),
            Guard::EmptyPlugins => "s:plugins->empty()".to_string(),
        }
    }
}

/// One statement of the bootstrap script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    AbortIf(Guard),
    /// Load the plugin table and the ftplugin slot from the cache file.
    LoadCache,
    /// `let <target> = <expr>`, with `expr` already rendered.
    Let { target: String, expr: String },
    SetRuntimepath(String),
    FiletypeOff,
    FiletypePluginIndentOff,
    /// A line copied from a Vim fragment.
    Line(String),
    /// Lines copied from a Lua fragment, fenced as a heredoc.
    LuaBlock(Vec<String>),
}

impl Statement {
    pub fn render(&self) -> String {
        match self {
            Statement::AbortIf(guard) => format!(
                "if {} | throw {} | endif",
                guard.condition(),
                vim_string(CACHE_LOADING_ERROR)
            ),
            Statement::LoadCache => {
                "let [s:plugins, s:ftplugin] = dpp#min#_load_cache_raw()".to_string()
            }
            Statement::Let { target, expr } => format!("let {} = {}", target, expr),
            Statement::SetRuntimepath(runtimepath) => {
                format!("let &runtimepath = {}", vim_string(runtimepath))
            }
            Statement::FiletypeOff => "filetype off".to_string(),
            Statement::FiletypePluginIndentOff => "filetype plugin indent off".to_string(),
            Statement::Line(line) => line.clone(),
            Statement::LuaBlock(lines) => {
                let mut block = Vec::with_capacity(lines.len() + 2);
                block.push("lua <<EOF");
                block.extend(lines.iter().map(String::as_str));
                block.push("EOF");
                block.join("\n")
            }
        }
    }
}

/// Quote `value` as a Vim single-quoted string.
pub fn vim_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a host value as a Vim expression literal.
fn vim_literal(value: &Value) -> String {
    match value {
        Value::String(s) => vim_string(s),
        Value::Bool(b) => u8::from(*b).to_string(),
        other => other.to_string(),
    }
}

/// The script written to `state_<profile>.vim`.
///
/// The header (guards, cache load, published globals and runtimepath) is
/// fixed on creation. Everything after it is the body, which a Lua fragment
/// replaces wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapScript {
    header: Vec<Statement>,
    body: Vec<Statement>,
}

impl BootstrapScript {
    pub fn new(
        cache_version: &Value,
        init_runtimepath: &str,
        base_path: &str,
        runtimepath: &str,
    ) -> Self {
        let header = vec![
            Statement::AbortIf(Guard::StaleCache {
                cache_version: vim_literal(cache_version),
                init_runtimepath: init_runtimepath.to_string(),
            }),
            Statement::LoadCache,
            Statement::AbortIf(Guard::EmptyPlugins),
            Statement::Let {
                target: "g:dpp#_plugins".to_string(),
                expr: "s:plugins".to_string(),
            },
            Statement::Let {
                target: "g:dpp#ftplugin".to_string(),
                expr: "s:ftplugin".to_string(),
            },
            Statement::Let {
                target: "g:dpp#_base_path".to_string(),
                expr: vim_string(base_path),
            },
            Statement::SetRuntimepath(runtimepath.to_string()),
        ];
        Self {
            header,
            body: Vec::new(),
        }
    }

    pub fn push(&mut self, statement: Statement) {
        self.body.push(statement);
    }

    /// Add the lines of an inline fragment, dropping blank and comment lines.
    ///
    /// Vim lines are appended to the body. A Lua fragment replaces the body
    /// with a single fenced block.
    pub fn add_fragment(&mut self, dialect: Dialect, text: &str) {
        let lines = text
            .split('\n')
            .filter(|line| !dialect.is_noise(line))
            .map(str::to_string);

        match dialect {
            Dialect::Vim => self.body.extend(lines.map(Statement::Line)),
            Dialect::Lua => self.body = vec![Statement::LuaBlock(lines.collect())],
        }
    }

    pub fn header(&self) -> &[Statement] {
        &self.header
    }

    pub fn body(&self) -> &[Statement] {
        &self.body
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.header.iter().chain(self.body.iter())
    }

    /// The script text, one statement per line, no trailing newline.
    pub fn render(&self) -> String {
        self.statements()
            .map(Statement::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn script() -> BootstrapScript {
        BootstrapScript::new(&json!(1), "/rt", "/base", "/rt,/base/.dpp")
    }

    #[test]
    fn test_header_lines() {
        assert_eq!(
            script().render(),
            [
                "if g:dpp#_cache_version !=# 1 || g:dpp#_init_runtimepath !=# '/rt' | throw 'Cache loading error' | endif",
                "let [s:plugins, s:ftplugin] = dpp#min#_load_cache_raw()",
                "if s:plugins->empty() | throw 'Cache loading error' | endif",
                "let g:dpp#_plugins = s:plugins",
                "let g:dpp#ftplugin = s:ftplugin",
                "let g:dpp#_base_path = '/base'",
                "let &runtimepath = '/rt,/base/.dpp'",
            ]
            .join("\n")
        );
    }

    #[rstest]
    #[case::number(json!(2), "2")]
    #[case::string(json!("v2"), "'v2'")]
    #[case::boolean(json!(true), "1")]
    fn test_cache_version_literal(#[case] version: Value, #[case] expected: &str) {
        let script = BootstrapScript::new(&version, "", "", "");
        assert_eq!(
            script.header()[0],
            Statement::AbortIf(Guard::StaleCache {
                cache_version: expected.to_string(),
                init_runtimepath: String::new(),
            })
        );
    }

    #[test]
    fn test_quotes_are_doubled() {
        assert_eq!(vim_string("it's"), "'it''s'");
        let script = BootstrapScript::new(&json!(1), "", "/o'neil", "");
        assert_eq!(script.header()[5].render(), "let g:dpp#_base_path = '/o''neil'");
    }

    #[rstest]
    #[case::vim_blank(Dialect::Vim, "   ", true)]
    #[case::vim_comment(Dialect::Vim, "  \" comment", true)]
    #[case::vim_code(Dialect::Vim, "set number \" trailing", false)]
    #[case::vim_lua_comment(Dialect::Vim, "-- not a vim comment", false)]
    #[case::lua_comment(Dialect::Lua, "  -- comment", true)]
    #[case::lua_code(Dialect::Lua, "vim.o.number = true", false)]
    #[case::lua_vim_comment(Dialect::Lua, "\" not a lua comment", false)]
    fn test_noise(#[case] dialect: Dialect, #[case] line: &str, #[case] noise: bool) {
        assert_eq!(dialect.is_noise(line), noise);
    }

    #[rstest]
    #[case("/rc/init.lua", Dialect::Lua)]
    #[case("/rc/options.vim", Dialect::Vim)]
    #[case("/rc/vimrc", Dialect::Vim)]
    fn test_dialect_of(#[case] path: &str, #[case] expected: Dialect) {
        assert_eq!(Dialect::of(&NormalizedPath::new(path)), expected);
    }

    #[test]
    fn test_vim_fragments_append() {
        let mut script = script();
        script.push(Statement::FiletypeOff);
        script.add_fragment(Dialect::Vim, "\" header\nset number\n\nset hidden\n");
        script.add_fragment(Dialect::Vim, "let g:loaded = 1");

        assert_eq!(
            script.body(),
            &[
                Statement::FiletypeOff,
                Statement::Line("set number".to_string()),
                Statement::Line("set hidden".to_string()),
                Statement::Line("let g:loaded = 1".to_string()),
            ]
        );
    }

    #[test]
    fn test_lua_fragment_replaces_body() {
        let mut script = script();
        script.push(Statement::FiletypePluginIndentOff);
        script.add_fragment(Dialect::Vim, "set number");
        script.add_fragment(Dialect::Lua, "-- opts\nvim.o.hidden = true\n");

        assert_eq!(script.header().len(), 7);
        assert_eq!(
            script.body(),
            &[Statement::LuaBlock(vec!["vim.o.hidden = true".to_string()])]
        );
        assert!(
            script
                .render()
                .ends_with("let &runtimepath = '/rt,/base/.dpp'\nlua <<EOF\nvim.o.hidden = true\nEOF")
        );
    }

    #[test]
    fn test_vim_after_lua_appends_to_block() {
        let mut script = script();
        script.add_fragment(Dialect::Lua, "vim.o.hidden = true");
        script.add_fragment(Dialect::Vim, "set number");

        assert_eq!(script.body().len(), 2);
        assert_eq!(script.body()[1], Statement::Line("set number".to_string()));
    }
}
