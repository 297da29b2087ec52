//! Error types for dpp-core

/// Result type for dpp-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a compile or an action.
///
/// Missing capabilities and failed capability initialisation never show up
/// here; they are reported to the host and resolution continues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Creating a directory, reading a fragment or writing an artifact failed.
    #[error(transparent)]
    Fs(#[from] dpp_fs::Error),

    /// A host call failed or a required host variable is missing.
    #[error(transparent)]
    Meta(#[from] dpp_meta::Error),

    #[error(transparent)]
    Extensions(#[from] dpp_extensions::Error),

    #[error("failed to serialize plugin cache: {0}")]
    Serialize(#[from] serde_json::Error),
}
