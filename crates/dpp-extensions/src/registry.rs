//! Registry of resolved capabilities.
//!
//! The registry is owned by the caller (the facade) and passed by `&mut`
//! into every resolution, so two resolutions never interleave and the
//! per-instance initialisation latch needs no lock.

use std::collections::HashMap;
use std::sync::Arc;

use dpp_meta::{Context, DppOptions, Host, Params};
use serde_json::Value;

use crate::capability::{
    ActionArgs, BoxError, Capability, CapabilityKind, Extension, InitArgs, Protocol,
    ResolvedProtocol,
};
use crate::discovery::Discover;
use crate::error::{Error, Result};

/// Outcome of a resolution.
///
/// `capability` is `None` when nothing provides the name; options and
/// params then hold their defaults so callers can carry on as a no-op.
pub struct Resolved<T: ?Sized> {
    pub capability: Option<Arc<T>>,
    pub options: Params,
    pub params: Params,
}

impl<T: ?Sized> Resolved<T> {
    fn absent() -> Self {
        Self {
            capability: None,
            options: Params::new(),
            params: Params::new(),
        }
    }
}

/// An instance and its initialisation latch.
struct Slot<T: ?Sized> {
    instance: Arc<T>,
    initialized: bool,
}

impl<T: ?Sized> Slot<T> {
    fn new(instance: Arc<T>) -> Self {
        Self {
            instance,
            initialized: false,
        }
    }
}

/// Holds discovered extensions and protocols.
pub struct CapabilityRegistry {
    discover: Box<dyn Discover>,
    extensions: HashMap<String, Slot<dyn Extension>>,
    protocols: HashMap<String, Slot<dyn Protocol>>,
}

impl CapabilityRegistry {
    pub fn new(discover: impl Discover + 'static) -> Self {
        Self {
            discover: Box::new(discover),
            extensions: HashMap::new(),
            protocols: HashMap::new(),
        }
    }

    /// Register an extension instance directly, bypassing discovery.
    ///
    /// An instance already registered under the same name is replaced and
    /// the new instance starts uninitialised.
    pub fn register_extension(&mut self, ext: Arc<dyn Extension>) {
        tracing::debug!(name = ext.name(), "registered ext");
        self.extensions
            .insert(ext.name().to_string(), Slot::new(ext));
    }

    /// Register a protocol instance directly, bypassing discovery.
    pub fn register_protocol(&mut self, protocol: Arc<dyn Protocol>) {
        tracing::debug!(name = protocol.name(), "registered protocol");
        self.protocols
            .insert(protocol.name().to_string(), Slot::new(protocol));
    }

    pub fn contains(&self, kind: CapabilityKind, name: &str) -> bool {
        match kind {
            CapabilityKind::Extension => self.extensions.contains_key(name),
            CapabilityKind::Protocol => self.protocols.contains_key(name),
        }
    }

    /// Whether the instance registered under `name` has been initialised.
    pub fn is_initialized(&self, kind: CapabilityKind, name: &str) -> bool {
        match kind {
            CapabilityKind::Extension => self.extensions.get(name).is_some_and(|s| s.initialized),
            CapabilityKind::Protocol => self.protocols.get(name).is_some_and(|s| s.initialized),
        }
    }

    /// Ask discovery for `name` unless it is already registered.
    ///
    /// Only a found capability is kept; a miss or a discovery error leaves
    /// the name unknown, so the next resolution asks again.
    async fn ensure_discovered(&mut self, kind: CapabilityKind, name: &str) -> Result<()> {
        if self.contains(kind, name) || name.is_empty() {
            return Ok(());
        }

        match self.discover.discover(kind, name).await? {
            Some(Capability::Extension(ext)) if kind == CapabilityKind::Extension => {
                self.register_extension(ext);
            }
            Some(Capability::Protocol(protocol)) if kind == CapabilityKind::Protocol => {
                self.register_protocol(protocol);
            }
            Some(other) => {
                tracing::warn!(
                    requested = %kind,
                    name,
                    found = %other.kind(),
                    "discovery returned a capability of the wrong kind"
                );
            }
            None => tracing::debug!(%kind, name, "nothing discovered"),
        }
        Ok(())
    }

    /// Resolve the extension `name` with effective options from `options`.
    ///
    /// A missing extension is reported to the host (unless `name` is empty)
    /// and yields an absent result. A failing `on_init` is reported and the
    /// extension is still returned; the next resolution retries it.
    pub async fn resolve_extension(
        &mut self,
        host: &dyn Host,
        options: &DppOptions,
        name: &str,
    ) -> Result<Resolved<dyn Extension>> {
        self.ensure_discovered(CapabilityKind::Extension, name)
            .await?;

        let Some(slot) = self.extensions.get_mut(name) else {
            if !name.is_empty() {
                tracing::warn!(name, "ext not found");
                host.report_error(&format!("Not found ext: \"{}\"", name))
                    .await?;
            }
            return Ok(Resolved::absent());
        };

        let (ext_options, ext_params) = options.ext_args(name, &slot.instance.params());

        if !slot.initialized {
            let instance = Arc::clone(&slot.instance);
            let outcome = instance
                .on_init(InitArgs {
                    host,
                    options: &ext_options,
                    params: &ext_params,
                })
                .await;
            slot.initialized = settle_init(host, CapabilityKind::Extension, name, outcome).await?;
        }

        Ok(Resolved {
            capability: Some(Arc::clone(&slot.instance)),
            options: ext_options,
            params: ext_params,
        })
    }

    /// Resolve the protocol `name`. Same contract as
    /// [`CapabilityRegistry::resolve_extension`].
    pub async fn resolve_protocol(
        &mut self,
        host: &dyn Host,
        options: &DppOptions,
        name: &str,
    ) -> Result<Resolved<dyn Protocol>> {
        self.ensure_discovered(CapabilityKind::Protocol, name)
            .await?;

        let Some(slot) = self.protocols.get_mut(name) else {
            if !name.is_empty() {
                tracing::warn!(name, "protocol not found");
                host.report_error(&format!("Not found protocol: \"{}\"", name))
                    .await?;
            }
            return Ok(Resolved::absent());
        };

        let (protocol_options, protocol_params) =
            options.protocol_args(name, &slot.instance.params());

        if !slot.initialized {
            let instance = Arc::clone(&slot.instance);
            let outcome = instance
                .on_init(InitArgs {
                    host,
                    options: &protocol_options,
                    params: &protocol_params,
                })
                .await;
            slot.initialized = settle_init(host, CapabilityKind::Protocol, name, outcome).await?;
        }

        Ok(Resolved {
            capability: Some(Arc::clone(&slot.instance)),
            options: protocol_options,
            params: protocol_params,
        })
    }

    /// Resolve every protocol in `names`, skipping the ones not found.
    pub async fn resolve_protocols(
        &mut self,
        host: &dyn Host,
        options: &DppOptions,
        names: &[String],
    ) -> Result<HashMap<String, ResolvedProtocol>> {
        let mut protocols = HashMap::new();
        for name in names {
            let resolved = self.resolve_protocol(host, options, name).await?;
            if let Some(protocol) = resolved.capability {
                protocols.insert(
                    name.clone(),
                    ResolvedProtocol {
                        protocol,
                        options: resolved.options,
                        params: resolved.params,
                    },
                );
            }
        }
        Ok(protocols)
    }

    /// Invoke `action_name` of the extension `ext_name`.
    ///
    /// `global_options` supplies the extension's effective options;
    /// `caller_options` names the protocols handed to the action. Returns
    /// `None` when the extension or the action does not exist.
    #[allow(clippy::too_many_arguments)]
    pub async fn invoke(
        &mut self,
        host: &dyn Host,
        context: &Context,
        global_options: &DppOptions,
        caller_options: &DppOptions,
        ext_name: &str,
        action_name: &str,
        action_params: &Value,
    ) -> Result<Option<Value>> {
        let resolved = self
            .resolve_extension(host, global_options, ext_name)
            .await?;
        let Some(ext) = resolved.capability else {
            return Ok(None);
        };

        let Some(action) = ext.actions().get(action_name).cloned() else {
            tracing::warn!(ext = ext_name, action = action_name, "action not found");
            host.report_error(&format!("Not found UI action: {}", action_name))
                .await?;
            return Ok(None);
        };

        let protocols = self
            .resolve_protocols(host, global_options, &caller_options.protocols)
            .await?;

        tracing::debug!(ext = ext_name, action = action_name, "invoking action");
        let value = action
            .call(ActionArgs {
                host,
                context,
                options: global_options,
                protocols: &protocols,
                ext_options: &resolved.options,
                ext_params: &resolved.params,
                action_params,
            })
            .await
            .map_err(|source| Error::Action {
                ext: ext_name.to_string(),
                action: action_name.to_string(),
                source,
            })?;

        Ok(Some(value))
    }
}

/// Turn an `on_init` outcome into the new latch state, reporting failures.
async fn settle_init(
    host: &dyn Host,
    kind: CapabilityKind,
    name: &str,
    outcome: std::result::Result<(), BoxError>,
) -> Result<bool> {
    match outcome {
        Ok(()) => {
            tracing::debug!(%kind, name, "initialized");
            Ok(true)
        }
        Err(error) => {
            tracing::warn!(%kind, name, %error, "onInit failed");
            host.report_exception(
                error.as_ref(),
                &format!("{}: {} \"onInit()\" failed", kind, name),
            )
            .await?;
            Ok(false)
        }
    }
}
