//! Shared test utilities for the dpp workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`host`]: [`MockHost`], a scriptable editor that records diagnostics
//! - [`base`]: [`TestBase`], a temporary base directory with plugin trees

pub mod base;
pub mod host;

pub use base::TestBase;
pub use host::{DEFAULT_RUNTIME, MockHost};
