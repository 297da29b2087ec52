//! The editor runtime as seen by the plugin manager core.
//!
//! The core never embeds the editor; it talks to it through this RPC-shaped
//! trait. Each call may suspend, and callers await every call before issuing
//! the next one.

use async_trait::async_trait;
use serde_json::Value;

use crate::{Error, Result};

/// Async RPC surface of the host editor.
#[async_trait]
pub trait Host: Send + Sync {
    /// Read `g:<name>`. `None` when the variable is not defined.
    async fn global_var(&self, name: &str) -> Result<Option<Value>>;

    /// Read `b:<name>` of the current buffer.
    async fn buffer_var(&self, name: &str) -> Result<Option<Value>>;

    async fn set_global_var(&self, name: &str, value: Value) -> Result<()>;

    /// Split a raw `runtimepath` option value into its entries.
    async fn split_load_path(&self, raw: &str) -> Result<Vec<String>>;

    /// Join entries back into a `runtimepath` value.
    ///
    /// `original` is the raw value the entries were split from and
    /// `internal_dir` the manager's own working directory; hosts use them to
    /// keep entries they add themselves.
    async fn join_load_path(
        &self,
        entries: &[String],
        original: &str,
        internal_dir: &str,
    ) -> Result<String>;

    /// The host's own runtime directory, used as the load-path anchor.
    async fn own_runtime_entry(&self) -> Result<String>;

    /// Show an error message to the user.
    async fn report_error(&self, message: &str) -> Result<()>;

    /// Show a caught failure together with a label naming where it happened.
    async fn report_exception(
        &self,
        error: &(dyn std::error::Error + Send + Sync),
        context: &str,
    ) -> Result<()>;

    /// Expand `~`, environment variables and wildcards the way the host does.
    async fn expand_path(&self, pattern: &str) -> Result<String>;

    /// Read `g:<name>`, falling back to `default` when it is not defined.
    async fn global_var_or(&self, name: &str, default: Value) -> Result<Value> {
        Ok(self.global_var(name).await?.unwrap_or(default))
    }

    /// Read `b:<name>`, falling back to `default` when it is not defined.
    async fn buffer_var_or(&self, name: &str, default: Value) -> Result<Value> {
        Ok(self.buffer_var(name).await?.unwrap_or(default))
    }

    /// Read a global that must be present.
    async fn required_global(&self, name: &str) -> Result<Value> {
        self.global_var(name)
            .await?
            .ok_or_else(|| Error::MissingHostVar {
                name: format!("g:{}", name),
            })
    }

    /// Read a global that must be present and hold a string.
    async fn required_global_string(&self, name: &str) -> Result<String> {
        match self.required_global(name).await? {
            Value::String(s) => Ok(s),
            _ => Err(Error::InvalidHostVar {
                name: format!("g:{}", name),
                expected: "string",
            }),
        }
    }
}

/// Truthiness of a host value as the manager interprets flags.
///
/// `null`, `false`, `0` and the empty string are false; everything else
/// is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
