use crate::capability::{BoxError, CapabilityKind};

/// Errors that can occur while resolving or invoking capabilities.
///
/// A capability that cannot be found or fails to initialise is not an error:
/// both are reported to the host as diagnostics and resolution continues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Host RPC failure while reporting or gathering context.
    #[error(transparent)]
    Meta(#[from] dpp_meta::Error),

    /// The discovery backend itself failed (as opposed to finding nothing).
    #[error("failed to discover {kind} '{name}': {message}")]
    Discovery {
        kind: CapabilityKind,
        name: String,
        message: String,
    },

    /// An action callback returned an error.
    #[error("action '{action}' of ext '{ext}' failed: {source}")]
    Action {
        ext: String,
        action: String,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
