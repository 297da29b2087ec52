//! Capability contracts implemented by extensions and protocols.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dpp_meta::{Context, DppOptions, ExtOptions, Host, Params, ProtocolOptions};
use serde_json::Value;

/// Error type returned by capability callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Action table of an extension, keyed by action name.
pub type Actions = HashMap<String, Arc<dyn Action>>;

/// The two capability variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    Extension,
    Protocol,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Extension => f.write_str("ext"),
            CapabilityKind::Protocol => f.write_str("protocol"),
        }
    }
}

/// Arguments of an `on_init` call.
pub struct InitArgs<'a> {
    pub host: &'a dyn Host,
    pub options: &'a Params,
    pub params: &'a Params,
}

/// An extension: a named set of actions.
#[async_trait]
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    /// Default parameters, the least specific layer of the effective params.
    fn params(&self) -> Params {
        Params::new()
    }

    /// One-time initialisation. Retried on every resolution until it
    /// returns `Ok`.
    async fn on_init(&self, _args: InitArgs<'_>) -> Result<(), BoxError> {
        Ok(())
    }

    fn actions(&self) -> &Actions;
}

/// A protocol: transfer behaviour used by extensions (fetching, updating).
///
/// Only the lifecycle is modelled here; transfer operations are defined by
/// the extensions that consume a concrete protocol.
#[async_trait]
pub trait Protocol: Send + Sync {
    fn name(&self) -> &str;

    fn params(&self) -> Params {
        Params::new()
    }

    async fn on_init(&self, _args: InitArgs<'_>) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A resolved protocol with its effective options, as handed to actions.
#[derive(Clone)]
pub struct ResolvedProtocol {
    pub protocol: Arc<dyn Protocol>,
    pub options: ProtocolOptions,
    pub params: Params,
}

impl fmt::Debug for ResolvedProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProtocol")
            .field("protocol", &self.protocol.name())
            .field("options", &self.options)
            .field("params", &self.params)
            .finish()
    }
}

/// Everything an action callback can see.
pub struct ActionArgs<'a> {
    pub host: &'a dyn Host,
    pub context: &'a Context,
    pub options: &'a DppOptions,
    pub protocols: &'a HashMap<String, ResolvedProtocol>,
    pub ext_options: &'a ExtOptions,
    pub ext_params: &'a Params,
    pub action_params: &'a Value,
}

/// A named operation of an extension.
#[async_trait]
pub trait Action: Send + Sync {
    async fn call(&self, args: ActionArgs<'_>) -> Result<Value, BoxError>;
}

/// A discovered capability, either variant.
#[derive(Clone)]
pub enum Capability {
    Extension(Arc<dyn Extension>),
    Protocol(Arc<dyn Protocol>),
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::Extension(_) => CapabilityKind::Extension,
            Capability::Protocol(_) => CapabilityKind::Protocol,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Capability::Extension(ext) => ext.name(),
            Capability::Protocol(protocol) => protocol.name(),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability::{:?}({})", self.kind(), self.name())
    }
}
