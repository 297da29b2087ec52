//! Filesystem access used while compiling state.

use std::fs::{self, OpenOptions};
use std::io::Write;

use async_trait::async_trait;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Filesystem operations the state compiler depends on.
///
/// Every method is awaited before the next compile step starts, so
/// implementations do not need to be re-entrant for the same path.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Whether `path` exists and is a directory.
    async fn is_dir(&self, path: &NormalizedPath) -> bool;

    /// Create `path` and all missing parents. Succeeds if it already exists.
    async fn create_dir_all(&self, path: &NormalizedPath) -> Result<()>;

    async fn read_text(&self, path: &NormalizedPath) -> Result<String>;

    /// Replace the whole content of `path` with `content`.
    async fn write_text(&self, path: &NormalizedPath, content: &str) -> Result<()>;
}

/// [`Filesystem`] backed by the local disk through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Filesystem for LocalFs {
    async fn is_dir(&self, path: &NormalizedPath) -> bool {
        tokio::fs::metadata(path.to_native())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        tokio::fs::create_dir_all(&native)
            .await
            .map_err(|e| Error::io(native, e))
    }

    async fn read_text(&self, path: &NormalizedPath) -> Result<String> {
        let native = path.to_native();
        tokio::fs::read_to_string(&native)
            .await
            .map_err(|e| Error::io(native, e))
    }

    async fn write_text(&self, path: &NormalizedPath, content: &str) -> Result<()> {
        let target = path.clone();
        let bytes = content.as_bytes().to_vec();
        tokio::task::spawn_blocking(move || write_atomic(&target, &bytes))
            .await
            .map_err(|e| Error::Task {
                path: path.to_native(),
                message: e.to_string(),
            })?
    }
}

/// Write content atomically to a file with locking.
///
/// The content goes to a temporary sibling first and is renamed over the
/// target, so readers never observe a half-written artifact. The advisory
/// lock only covers the temporary file; it does not serialise two writers
/// of the same target.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    tracing::trace!(path = %path, bytes = content.len(), "wrote file");
    Ok(())
}
