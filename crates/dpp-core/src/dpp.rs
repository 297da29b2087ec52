//! The [`Dpp`] facade: one registry, one session context, one global
//! option document.

use dpp_extensions::{CapabilityRegistry, Discover};
use dpp_fs::{Filesystem, NormalizedPath};
use dpp_meta::{Context, DppOptions, Host, Merge, Plugin};
use serde_json::Value;

use crate::Result;
use crate::state::{CompileReport, StateCompiler};

/// Entry point used by the editor bridge.
///
/// Owns the capability registry, so capability instances and their
/// initialisation state live exactly as long as the facade.
pub struct Dpp {
    registry: CapabilityRegistry,
    context: Context,
    options: DppOptions,
}

impl Dpp {
    pub fn new(discover: impl Discover + 'static) -> Self {
        Self {
            registry: CapabilityRegistry::new(discover),
            context: Context::default(),
            options: DppOptions::default(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The global option document.
    pub fn options(&self) -> &DppOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DppOptions) {
        self.options = options;
    }

    /// Merge `layer` over the global option document.
    pub fn patch_options(&mut self, layer: &DppOptions) {
        let current = std::mem::take(&mut self.options);
        self.options = current.merge(layer);
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Mutable registry access, mainly to register capabilities directly.
    pub fn registry_mut(&mut self) -> &mut CapabilityRegistry {
        &mut self.registry
    }

    /// Run `action_name` of the extension `ext_name`.
    ///
    /// The extension sees the global option document; `options` selects the
    /// protocols passed to the action. Returns `None` when the extension or
    /// action does not exist (a diagnostic has been reported to the host).
    pub async fn ext_action(
        &mut self,
        host: &dyn Host,
        options: &DppOptions,
        ext_name: &str,
        action_name: &str,
        action_params: &Value,
    ) -> Result<Option<Value>> {
        let value = self
            .registry
            .invoke(
                host,
                &self.context,
                &self.options,
                options,
                ext_name,
                action_name,
                action_params,
            )
            .await?;
        Ok(value)
    }

    /// Compile the state for the host's current profile (`g:dpp#_progname`).
    ///
    /// On success the context points at `base_path` and the profile, and
    /// `g:dpp#_base_path` is published to the host.
    pub async fn make_state(
        &mut self,
        host: &dyn Host,
        fs: &dyn Filesystem,
        options: &DppOptions,
        base_path: &NormalizedPath,
        plugins: &[Plugin],
    ) -> Result<CompileReport> {
        let profile = host.required_global_string("dpp#_progname").await?;
        tracing::debug!(profile = %profile, base_path = %base_path, "making state");

        let report = StateCompiler::new(host, fs)
            .compile(plugins, base_path, &profile, options)
            .await?;

        self.context = Context {
            base_path: Some(base_path.as_str().to_string()),
            profile: Some(profile),
        };
        host.set_global_var("dpp#_base_path", Value::from(base_path.as_str()))
            .await?;

        Ok(report)
    }
}
