//! Extension and protocol capabilities for dpp.
//!
//! Capabilities are named units of behaviour loaded on first reference:
//! extensions expose actions, protocols expose transfer behaviour. The
//! [`CapabilityRegistry`] discovers them through a pluggable [`Discover`]
//! implementation, computes their effective options and initialises each
//! instance until one `on_init` call succeeds.

pub mod capability;
pub mod discovery;
pub mod error;
pub mod registry;

pub use capability::{
    Action, ActionArgs, Actions, BoxError, Capability, CapabilityKind, Extension, InitArgs,
    Protocol, ResolvedProtocol,
};
pub use discovery::{Discover, FactoryLoader};
pub use error::{Error, Result};
pub use registry::{CapabilityRegistry, Resolved};
