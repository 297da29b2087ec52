//! [`TestBase`]: a temporary dpp base directory.

use std::fs;
use std::path::Path;

use dpp_fs::NormalizedPath;
use tempfile::TempDir;

/// A temporary directory used as the compiler's base path.
///
/// # Example
///
/// ```rust,no_run
/// use dpp_test_utils::TestBase;
///
/// let base = TestBase::new();
/// base.make_dir("repos/foo/after");
/// base.write("rc/options.vim", "set number\n");
/// assert!(base.path("repos/foo").ends_with("/repos/foo"));
/// ```
pub struct TestBase {
    temp_dir: TempDir,
}

impl Default for TestBase {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBase {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The base directory as the compiler sees it.
    pub fn base_path(&self) -> NormalizedPath {
        NormalizedPath::new(self.root())
    }

    /// Forward-slash path of `rel` under the base directory.
    pub fn path(&self, rel: &str) -> String {
        self.base_path().join(rel).into_string()
    }

    /// Create `rel` (and parents) under the base directory.
    pub fn make_dir(&self, rel: &str) {
        fs::create_dir_all(self.root().join(rel))
            .unwrap_or_else(|e| panic!("TestBase::make_dir({rel}): {e}"));
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap_or_else(|e| panic!("TestBase::write({rel}): {e}"));
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel))
            .unwrap_or_else(|e| panic!("TestBase::read({rel}): {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root().join(rel).exists()
    }
}
