//! End-to-end integration test for the plugin manager core
//!
//! This test exercises the complete flow: JSON declarations -> make_state ->
//! artifacts on disk -> an extension action reading them back.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dpp_core::{CACHE_LOADING_ERROR, Dpp};
use dpp_extensions::{
    Action, ActionArgs, Actions, BoxError, Extension, FactoryLoader, InitArgs, Protocol,
};
use dpp_fs::{Filesystem, LocalFs, NormalizedPath};
use dpp_meta::{DppOptions, Params, Plugin, parse_plugins};
use dpp_test_utils::{DEFAULT_RUNTIME, MockHost, TestBase};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

/// Lists the cached plugins that were put on the runtimepath.
struct ListSourced;

#[async_trait]
impl Action for ListSourced {
    async fn call(&self, args: ActionArgs<'_>) -> Result<Value, BoxError> {
        let base = args
            .context
            .base_path
            .clone()
            .ok_or("state has not been made")?;
        let profile = args.context.profile.clone().unwrap_or_default();
        let cache_file = NormalizedPath::new(&base).join(&format!("cache_{}.vim", profile));
        let text = LocalFs::new().read_text(&cache_file).await?;
        let cache: Value = serde_json::from_str(&text)?;

        let sourced: Vec<Value> = cache[0]
            .as_array()
            .into_iter()
            .flatten()
            .filter(|plugin| plugin["sourced"] == json!(true))
            .map(|plugin| plugin["name"].clone())
            .collect();
        let mut protocols: Vec<&String> = args.protocols.keys().collect();
        protocols.sort();

        Ok(json!({ "sourced": sourced, "protocols": protocols }))
    }
}

struct Installer {
    inits: Arc<AtomicUsize>,
    actions: Actions,
}

#[async_trait]
impl Extension for Installer {
    fn name(&self) -> &str {
        "installer"
    }

    async fn on_init(&self, _args: InitArgs<'_>) -> Result<(), BoxError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn actions(&self) -> &Actions {
        &self.actions
    }
}

struct Git;

impl Protocol for Git {
    fn name(&self) -> &str {
        "git"
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert("cloneDepth".to_string(), json!(0));
        params
    }
}

fn setup_dpp(inits: &Arc<AtomicUsize>) -> Dpp {
    let mut loader = FactoryLoader::new();
    let counter = Arc::clone(inits);
    loader.register_extension("installer", move || {
        let mut actions = Actions::new();
        actions.insert("sourced".to_string(), Arc::new(ListSourced) as Arc<dyn Action>);
        Installer {
            inits: Arc::clone(&counter),
            actions,
        }
    });
    loader.register_protocol("git", || Git);
    Dpp::new(loader)
}

/// A base directory with two installed eager plugins and one lazy plugin.
fn setup_base() -> TestBase {
    let base = TestBase::new();
    base.make_dir("repos/github.com/Shougo/ddu.vim");
    base.make_dir("repos/github.com/tpope/vim-fugitive/after");
    base.make_dir("repos/github.com/Shougo/ddc.vim");
    base.write("rc/options.vim", "\" basic options\nset number\n\nset hidden\n");
    base
}

fn declarations() -> Vec<Plugin> {
    parse_plugins(json!([
        { "name": "ddu.vim", "repo": "github.com/Shougo/ddu.vim" },
        { "name": "vim-fugitive", "repo": "github.com/tpope/vim-fugitive", "custom": { "keep": 1 } },
        { "name": "ddc.vim", "repo": "github.com/Shougo/ddc.vim", "on_event": "InsertEnter" },
        { "name": "missing.vim", "repo": "github.com/nobody/missing.vim" },
    ]))
    .unwrap()
}

fn options() -> DppOptions {
    serde_json::from_value(json!({
        "protocols": ["git"],
        "protocolParams": { "git": { "cloneDepth": 1 } },
        "inlineVimrcs": ["~/rc/options.vim"],
    }))
    .unwrap()
}

#[tokio::test]
async fn test_make_state_then_run_action() {
    let base = setup_base();
    let host = MockHost::new()
        .with_runtime_path(&format!("/home/u/.vim,{},/home/u/.vim/after", DEFAULT_RUNTIME))
        .with_home(base.root().to_str().unwrap());
    let fs = LocalFs::new();
    let inits = Arc::new(AtomicUsize::new(0));
    let mut dpp = setup_dpp(&inits);
    dpp.patch_options(&options());

    let report = dpp
        .make_state(&host, &fs, &options(), &base.base_path(), &declarations())
        .await
        .unwrap();

    let state = base.read("state_vim.vim");
    assert_eq!(state, report.script.render());
    assert!(state.contains(CACHE_LOADING_ERROR));
    assert!(state.ends_with("set number\nset hidden"));

    let runtimepath: Vec<&str> = report.runtimepath.split(',').collect();
    assert_eq!(
        runtimepath,
        vec![
            "/home/u/.vim",
            base.path("repos/github.com/tpope/vim-fugitive").as_str(),
            base.path("repos/github.com/Shougo/ddu.vim").as_str(),
            base.path(".dpp").as_str(),
            DEFAULT_RUNTIME,
            base.path("repos/github.com/tpope/vim-fugitive/after").as_str(),
            "/home/u/.vim/after",
            base.path(".dpp/after").as_str(),
        ]
    );

    let cache: Value = serde_json::from_str(&base.read("cache_vim.vim")).unwrap();
    assert_eq!(cache[0][1]["custom"], json!({ "keep": 1 }));
    assert_eq!(cache[0][2]["lazy"], json!(true));

    for _ in 0..2 {
        let result = dpp
            .ext_action(&host, &options(), "installer", "sourced", &Value::Null)
            .await
            .unwrap();
        assert_eq!(
            result,
            Some(json!({
                "sourced": ["ddu.vim", "vim-fugitive"],
                "protocols": ["git"],
            }))
        );
    }
    assert_eq!(inits.load(Ordering::SeqCst), 1);
    assert!(host.errors().is_empty());
}

#[tokio::test]
async fn test_recompile_is_byte_identical() {
    let base = setup_base();
    let host = MockHost::new()
        .with_runtime_path(DEFAULT_RUNTIME)
        .with_home(base.root().to_str().unwrap());
    let fs = LocalFs::new();
    let mut dpp = setup_dpp(&Arc::new(AtomicUsize::new(0)));

    dpp.make_state(&host, &fs, &options(), &base.base_path(), &declarations())
        .await
        .unwrap();
    let first = (base.read("state_vim.vim"), base.read("cache_vim.vim"));

    dpp.make_state(&host, &fs, &options(), &base.base_path(), &declarations())
        .await
        .unwrap();
    let second = (base.read("state_vim.vim"), base.read("cache_vim.vim"));

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_profiles_write_separate_artifacts() {
    let base = setup_base();
    let fs = LocalFs::new();
    let mut dpp = setup_dpp(&Arc::new(AtomicUsize::new(0)));

    for progname in ["vim", "nvim"] {
        let host = MockHost::new()
            .with_runtime_path(DEFAULT_RUNTIME)
            .with_global("dpp#_progname", json!(progname));
        dpp.make_state(&host, &fs, &DppOptions::default(), &base.base_path(), &[])
            .await
            .unwrap();
    }

    for file in ["state_vim.vim", "cache_vim.vim", "state_nvim.vim", "cache_nvim.vim"] {
        assert!(base.exists(file), "{} missing", file);
    }
    assert_eq!(dpp.context().profile.as_deref(), Some("nvim"));
}

#[tokio::test]
async fn test_normalization_scenarios() {
    let host = MockHost::new().with_runtime_path(DEFAULT_RUNTIME);
    let base = TestBase::new();
    let mut dpp = setup_dpp(&Arc::new(AtomicUsize::new(0)));
    let plugins = parse_plugins(json!([
        { "name": "foo", "rev": "[hoge]", "script_type": "foo", "rtp": "autoload" },
        { "name": "bar", "on_ft": "bar" },
    ]))
    .unwrap();

    let report = dpp
        .make_state(&host, &LocalFs::new(), &DppOptions::default(), &base.base_path(), &plugins)
        .await
        .unwrap();

    let by_name: HashMap<&str, &Plugin> = report
        .plugins
        .iter()
        .map(|plugin| (plugin.name.as_str(), plugin))
        .collect();
    let foo = by_name["foo"];
    assert_eq!(foo.path, Some(base.path("repos/foo__hoge_/foo")));
    assert_eq!(foo.rtp, Some(base.path("repos/foo__hoge_/foo/autoload")));
    assert_eq!((foo.lazy, foo.merged), (Some(false), Some(true)));

    let bar = by_name["bar"];
    assert_eq!(bar.path, Some(base.path("repos/bar")));
    assert_eq!(bar.rtp, bar.path);
    assert_eq!((bar.lazy, bar.merged), (Some(true), Some(false)));
}
