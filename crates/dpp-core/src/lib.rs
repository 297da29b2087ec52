//! State compiler and facade of the dpp plugin manager.
//!
//! This crate sits on top of the layer 0 crates and turns a set of declared
//! plugins into the two artifacts the editor reads at startup:
//!
//! - `state_<profile>.vim`: a bootstrap script that validates the cache,
//!   loads it and sets `runtimepath`
//! - `cache_<profile>.vim`: the normalised plugin table as JSON
//!
//! # Architecture
//!
//! ```text
//!                      Dpp (facade)
//!                     /            \
//!          StateCompiler        CapabilityRegistry
//!          /     |     \               |
//!   LoadPath  Bootstrap  PluginTable   |
//!                \          |          |
//!           dpp-fs        dpp-meta   dpp-extensions
//! ```
//!
//! [`logging::init`] is for the program embedding the compiler; nothing in
//! this workspace installs a subscriber on its own.
//!
//! Compiles against the same base path and profile must not overlap; the
//! artifacts are replaced file by file without any cross-file locking.

pub mod dpp;
pub mod error;
pub mod load_path;
pub mod logging;
pub mod state;

pub use dpp::Dpp;
pub use error::{Error, Result};
pub use load_path::LoadPath;
pub use state::{
    BootstrapScript, CACHE_LOADING_ERROR, CompileReport, Dialect, Guard, PluginTable,
    StateCompiler, Statement,
};
