//! Filesystem collaborator for the dpp plugin state compiler.
//!
//! Paths handled by the compiler are plain forward-slash strings (they end up
//! verbatim inside the generated bootstrap script), so this crate pairs a
//! [`NormalizedPath`] string type with an async [`Filesystem`] trait and a
//! tokio-backed [`LocalFs`] implementation.

pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use io::{Filesystem, LocalFs, write_atomic};
pub use path::NormalizedPath;
