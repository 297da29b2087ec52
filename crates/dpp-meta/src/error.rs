//! Error types for dpp-meta

/// Result type for dpp-meta operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An RPC call into the host runtime failed.
    #[error("host call '{call}' failed: {message}")]
    Host { call: String, message: String },

    /// A host variable the compiler cannot work without is not set.
    #[error("host variable '{name}' is not set")]
    MissingHostVar { name: String },

    #[error("host variable '{name}' has an unexpected type (expected {expected})")]
    InvalidHostVar { name: String, expected: &'static str },

    #[error("invalid plugin declaration: {0}")]
    PluginParse(#[from] serde_json::Error),
}

impl Error {
    pub fn host(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Host {
            call: call.into(),
            message: message.into(),
        }
    }
}
