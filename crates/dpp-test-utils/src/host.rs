//! [`MockHost`]: an in-memory editor for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use dpp_meta::{Error, Host, Result};
use serde_json::Value;

/// Runtime directory reported by [`MockHost`] unless overridden.
pub const DEFAULT_RUNTIME: &str = "/usr/share/vim/vim91";

/// A host whose variables are set up front and whose diagnostics are
/// recorded for assertions.
///
/// Load paths are split and joined on `,`. `expand_path` only expands a
/// leading `~/` when a home directory is configured.
///
/// # Example
///
/// ```rust
/// use dpp_test_utils::MockHost;
/// use serde_json::json;
///
/// let host = MockHost::new()
///     .with_runtime_path("/home/u/.vim,/usr/share/vim/vim91")
///     .with_global("dpp#_progname", json!("vim"));
/// assert!(host.errors().is_empty());
/// ```
pub struct MockHost {
    globals: Mutex<HashMap<String, Value>>,
    buffer: HashMap<String, Value>,
    runtime_entry: String,
    home: Option<String>,
    failing: HashSet<&'static str>,
    errors: Mutex<Vec<String>>,
    exceptions: Mutex<Vec<(String, String)>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// A host with `dpp#_cache_version = 1`, `dpp#_progname = "vim"` and no
    /// runtime path.
    pub fn new() -> Self {
        let globals = HashMap::from([
            ("dpp#_cache_version".to_string(), Value::from(1)),
            ("dpp#_progname".to_string(), Value::from("vim")),
        ]);
        Self {
            globals: Mutex::new(globals),
            buffer: HashMap::new(),
            runtime_entry: DEFAULT_RUNTIME.to_string(),
            home: None,
            failing: HashSet::new(),
            errors: Mutex::new(Vec::new()),
            exceptions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_global(self, name: &str, value: Value) -> Self {
        self.globals
            .lock()
            .unwrap()
            .insert(name.to_string(), value);
        self
    }

    pub fn without_global(self, name: &str) -> Self {
        self.globals.lock().unwrap().remove(name);
        self
    }

    pub fn with_buffer_var(mut self, name: &str, value: Value) -> Self {
        self.buffer.insert(name.to_string(), value);
        self
    }

    /// Set `dpp#_init_runtimepath`, the raw load path the compiler starts from.
    pub fn with_runtime_path(self, raw: &str) -> Self {
        self.with_global("dpp#_init_runtimepath", Value::from(raw))
    }

    pub fn with_runtime_entry(mut self, entry: &str) -> Self {
        self.runtime_entry = entry.to_string();
        self
    }

    pub fn with_home(mut self, home: &str) -> Self {
        self.home = Some(home.to_string());
        self
    }

    /// Make the named trait method fail with a host error.
    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    /// Messages passed to `report_error`, in order.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    /// `(context, message)` pairs passed to `report_exception`, in order.
    pub fn exceptions(&self) -> Vec<(String, String)> {
        self.exceptions.lock().unwrap().clone()
    }

    /// Current value of a global, including ones set through the trait.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.lock().unwrap().get(name).cloned()
    }

    fn check(&self, call: &'static str) -> Result<()> {
        if self.failing.contains(call) {
            return Err(Error::host(call, "mock failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Host for MockHost {
    async fn global_var(&self, name: &str) -> Result<Option<Value>> {
        self.check("global_var")?;
        Ok(self.global(name))
    }

    async fn buffer_var(&self, name: &str) -> Result<Option<Value>> {
        self.check("buffer_var")?;
        Ok(self.buffer.get(name).cloned())
    }

    async fn set_global_var(&self, name: &str, value: Value) -> Result<()> {
        self.check("set_global_var")?;
        self.globals
            .lock()
            .unwrap()
            .insert(name.to_string(), value);
        Ok(())
    }

    async fn split_load_path(&self, raw: &str) -> Result<Vec<String>> {
        self.check("split_load_path")?;
        Ok(raw
            .split(',')
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn join_load_path(
        &self,
        entries: &[String],
        _original: &str,
        _internal_dir: &str,
    ) -> Result<String> {
        self.check("join_load_path")?;
        Ok(entries.join(","))
    }

    async fn own_runtime_entry(&self) -> Result<String> {
        self.check("own_runtime_entry")?;
        Ok(self.runtime_entry.clone())
    }

    async fn report_error(&self, message: &str) -> Result<()> {
        self.check("report_error")?;
        self.errors.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn report_exception(
        &self,
        error: &(dyn std::error::Error + Send + Sync),
        context: &str,
    ) -> Result<()> {
        self.check("report_exception")?;
        self.exceptions
            .lock()
            .unwrap()
            .push((context.to_string(), error.to_string()));
        Ok(())
    }

    async fn expand_path(&self, pattern: &str) -> Result<String> {
        self.check("expand_path")?;
        match (&self.home, pattern.strip_prefix("~/")) {
            (Some(home), Some(rest)) => Ok(format!("{}/{}", home, rest)),
            _ => Ok(pattern.to_string()),
        }
    }
}
