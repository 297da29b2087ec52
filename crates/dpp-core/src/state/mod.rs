//! State compilation.
//!
//! [`StateCompiler::compile`] normalises the declared plugins, computes the
//! load path and writes the two per-profile artifacts under the base path.

mod script;
mod table;

pub use script::{BootstrapScript, CACHE_LOADING_ERROR, Dialect, Guard, Statement, vim_string};
pub use table::PluginTable;

use dpp_fs::{Filesystem, NormalizedPath};
use dpp_meta::{DppOptions, Host, Plugin, is_truthy};
use serde_json::Value;

use crate::Result;
use crate::load_path::LoadPath;

/// Internal working directory under the base path.
pub const INTERNAL_DIR: &str = ".dpp";

/// Extension of both artifacts.
pub const ARTIFACT_EXT: &str = "vim";

/// What a compile produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileReport {
    pub state_file: NormalizedPath,
    pub cache_file: NormalizedPath,
    /// The runtimepath assigned by the bootstrap script.
    pub runtimepath: String,
    pub script: BootstrapScript,
    /// Normalised plugins as written to the cache.
    pub plugins: Vec<Plugin>,
}

/// Compiles plugin declarations into the state and cache artifacts.
///
/// Every step is awaited before the next one starts. Two compiles for the
/// same base path and profile must not run at the same time.
pub struct StateCompiler<'a> {
    host: &'a dyn Host,
    fs: &'a dyn Filesystem,
}

impl<'a> StateCompiler<'a> {
    pub fn new(host: &'a dyn Host, fs: &'a dyn Filesystem) -> Self {
        Self { host, fs }
    }

    /// Compile `declarations` for `profile` under `base_path`.
    ///
    /// Filesystem failures abort the compile; artifacts already written are
    /// left in place.
    pub async fn compile(
        &self,
        declarations: &[Plugin],
        base_path: &NormalizedPath,
        profile: &str,
        options: &DppOptions,
    ) -> Result<CompileReport> {
        let mut table = PluginTable::normalized(declarations, base_path.as_str());
        tracing::debug!(plugins = table.len(), base_path = %base_path, "normalized plugins");

        self.ensure_dir(base_path).await?;
        let internal_dir = base_path.join(INTERNAL_DIR);
        self.ensure_dir(&internal_dir).await?;

        let init_runtimepath = self
            .host
            .required_global_string("dpp#_init_runtimepath")
            .await?;
        let entries = self.host.split_load_path(&init_runtimepath).await?;
        let anchor = self.host.own_runtime_entry().await?;
        let mut load_path = LoadPath::new(entries, anchor);
        if load_path.anchor_index().is_none() {
            tracing::warn!(anchor = load_path.anchor(), "runtime entry not in load path, appending");
        }

        self.add_eager_plugins(&mut table, &mut load_path).await;
        load_path.insert_before_anchor(internal_dir.as_str());
        load_path.push_tail(internal_dir.join("after").into_string());

        let runtimepath = self
            .host
            .join_load_path(load_path.entries(), &init_runtimepath, internal_dir.as_str())
            .await?;

        let script = self
            .compose_script(base_path, &init_runtimepath, &runtimepath, options)
            .await?;

        let state_file = base_path.join(&format!("state_{}.{}", profile, ARTIFACT_EXT));
        self.fs.write_text(&state_file, &script.render()).await?;
        tracing::info!(path = %state_file, "wrote state file");

        let plugins = table.into_vec();
        let cache = serde_json::to_string(&(&plugins, serde_json::Map::new()))?;
        let cache_file = base_path.join(&format!("cache_{}.{}", profile, ARTIFACT_EXT));
        self.fs.write_text(&cache_file, &cache).await?;
        tracing::info!(path = %cache_file, plugins = plugins.len(), "wrote cache file");

        Ok(CompileReport {
            state_file,
            cache_file,
            runtimepath,
            script,
            plugins,
        })
    }

    async fn ensure_dir(&self, path: &NormalizedPath) -> Result<()> {
        if !self.fs.is_dir(path).await {
            tracing::debug!(path = %path, "creating directory");
            self.fs.create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Splice the runtime directories of eager plugins around the anchor.
    async fn add_eager_plugins(&self, table: &mut PluginTable, load_path: &mut LoadPath) {
        for plugin in table.iter_mut().filter(|plugin| !plugin.is_lazy()) {
            let Some(rtp) = plugin.rtp.as_deref().filter(|rtp| !rtp.is_empty()) else {
                continue;
            };
            let rtp = NormalizedPath::new(rtp);
            if !self.fs.is_dir(&rtp).await {
                tracing::debug!(name = %plugin.name, rtp = %rtp, "runtime directory missing, skipped");
                continue;
            }

            plugin.sourced = true;
            let after = rtp.join("after");
            load_path.insert_at_anchor_slot(rtp.into_string());
            if self.fs.is_dir(&after).await {
                load_path.insert_after_anchor(after.into_string());
            }
            tracing::debug!(name = %plugin.name, "added to load path");
        }
    }

    async fn compose_script(
        &self,
        base_path: &NormalizedPath,
        init_runtimepath: &str,
        runtimepath: &str,
        options: &DppOptions,
    ) -> Result<BootstrapScript> {
        let cache_version = self.host.required_global("dpp#_cache_version").await?;
        let mut script = BootstrapScript::new(
            &cache_version,
            init_runtimepath,
            base_path.as_str(),
            runtimepath,
        );

        let filetypes_loaded = self
            .host
            .global_var_or("did_load_filetypes", Value::Bool(false))
            .await?;
        if is_truthy(&filetypes_loaded) {
            script.push(Statement::FiletypeOff);
        }
        if self.buffer_flag("did_indent").await? || self.buffer_flag("did_ftplugin").await? {
            script.push(Statement::FiletypePluginIndentOff);
        }

        for fragment in &options.inline_vimrcs {
            let path = NormalizedPath::new(self.host.expand_path(fragment).await?);
            let text = self.fs.read_text(&path).await?;
            let dialect = Dialect::of(&path);
            tracing::debug!(path = %path, ?dialect, "inlining fragment");
            script.add_fragment(dialect, &text);
        }

        Ok(script)
    }

    async fn buffer_flag(&self, name: &str) -> Result<bool> {
        let value = self.host.buffer_var_or(name, Value::Bool(false)).await?;
        Ok(is_truthy(&value))
    }
}
