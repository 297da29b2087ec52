//! Plugin metadata, layered options and the host boundary for dpp.
//!
//! This crate holds the pure pieces of the plugin manager core:
//!
//! - [`plugin`]: the package descriptor and its normaliser
//! - [`merge`]: the layered fold used to compute effective options
//! - [`options`]: option and parameter documents that get folded
//! - [`host`]: the async RPC surface of the editor that consumes the state

pub mod error;
pub mod host;
pub mod merge;
pub mod options;
pub mod plugin;

pub use error::{Error, Result};
pub use host::{Host, is_truthy};
pub use merge::{Merge, fold_merge, merge_keyed, merge_params};
pub use options::{Context, DppOptions, ExtOptions, GLOBAL_KEY, Params, ProtocolOptions};
pub use plugin::{Depends, Plugin, normalize, parse_plugins};
