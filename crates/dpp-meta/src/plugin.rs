//! Package descriptors and their normalisation.
//!
//! A [`Plugin`] starts as the user's declaration and is passed once through
//! [`normalize`], which derives the install path, the runtime directory and
//! the lazy/merged classification. The declared value is never modified.

use std::sync::LazyLock;

use dpp_fs::NormalizedPath;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Result;

/// Ecosystem markers stripped from a plugin name to build its display name.
static NAME_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(n?vim|dps|denops)[_-]|[_-]n?vim$").unwrap());

/// Characters that may not appear in the revision suffix of an install path.
static REV_UNSAFE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Dependency list as declared: a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Depends {
    One(String),
    Many(Vec<String>),
}

impl Depends {
    pub fn into_list(self) -> Vec<String> {
        match self {
            Depends::One(name) => vec![name],
            Depends::Many(names) => names,
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            Depends::One(name) => std::slice::from_ref(name),
            Depends::Many(names) => names,
        }
    }
}

/// A package descriptor.
///
/// Trigger and special-handling fields are kept as raw values because only
/// their presence matters; a key declared with `null` still counts as
/// present. Keys this type does not know are preserved in `extra` so they
/// survive the round trip through the cache artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Install root. Derived unless declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Declared: sub-directory of `path`. Normalised: the runtime directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<Depends>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_ft: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_cmd: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_func: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_lua: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_map: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_path: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_if: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_event: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub on_source: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub local: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub build: Option<Value>,
    #[serde(
        rename = "if",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub if_cond: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub hook_post_update: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<bool>,
    #[serde(default)]
    pub sourced: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Deserialise a key that is present in the input as `Some`, even when its
/// value is `null`. Absent keys fall back to `None` through `default`.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether any lazy-load trigger is declared.
    pub fn has_lazy_trigger(&self) -> bool {
        [
            &self.on_ft,
            &self.on_cmd,
            &self.on_func,
            &self.on_lua,
            &self.on_map,
            &self.on_path,
            &self.on_if,
            &self.on_event,
            &self.on_source,
        ]
        .iter()
        .any(|field| field.is_some())
    }

    /// Whether the plugin needs handling that keeps it out of the merged set.
    pub fn needs_individual_handling(&self) -> bool {
        [
            &self.local,
            &self.build,
            &self.if_cond,
            &self.hook_post_update,
        ]
        .iter()
        .any(|field| field.is_some())
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy.unwrap_or(false)
    }

    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false)
    }

    /// Dependency names, empty when none are declared.
    pub fn depends_list(&self) -> &[String] {
        self.depends.as_ref().map(Depends::as_slice).unwrap_or_default()
    }
}

/// Derive the full record of `declared` for plugins installed under
/// `base_path`.
///
/// The result has `path`, `rtp`, `normalized_name`, `lazy` and `merged` set,
/// `depends` in list form, and `sourced` reset to false. Values the
/// declaration already sets for `normalized_name`, `path`, `lazy` and
/// `merged` are kept.
pub fn normalize(declared: &Plugin, base_path: &str) -> Plugin {
    let mut plugin = declared.clone();

    plugin.sourced = false;

    if plugin.normalized_name.is_none() {
        plugin.normalized_name = Some(display_name(&plugin.name));
    }

    let mut path = match &declared.path {
        Some(path) => path.clone(),
        None => format!(
            "{}/repos/{}",
            base_path,
            declared.repo.as_deref().unwrap_or(&declared.name)
        ),
    };
    if let Some(rev) = declared.rev.as_deref().filter(|rev| !rev.is_empty()) {
        path.push('_');
        path.push_str(&REV_UNSAFE.replace_all(rev, "_"));
    }
    if let Some(script_type) = declared.script_type.as_deref().filter(|s| !s.is_empty()) {
        path.push('/');
        path.push_str(script_type);
    }

    // An explicitly empty sub-path means the plugin has no runtime directory.
    let rtp = match declared.rtp.as_deref() {
        None => path.clone(),
        Some("") => String::new(),
        Some(sub) => format!("{}/{}", path, sub),
    };
    let rtp = NormalizedPath::new(rtp).trim_trailing_separator().into_string();

    plugin.path = Some(path);
    plugin.rtp = Some(rtp);

    if let Some(depends) = plugin.depends.take() {
        plugin.depends = Some(Depends::Many(depends.into_list()));
    }

    let lazy = *plugin.lazy.get_or_insert_with(|| declared.has_lazy_trigger());
    if plugin.merged.is_none() {
        plugin.merged = Some(!lazy && !declared.needs_individual_handling());
    }

    tracing::trace!(name = %plugin.name, lazy, "normalized plugin");
    plugin
}

/// Display name of a plugin: the file stem of its name without editor and
/// packaging markers (`vim-`, `nvim-`, `dps-`, `denops-`, `-vim`, `-nvim`).
pub fn display_name(name: &str) -> String {
    let path = NormalizedPath::new(name);
    let stem = path.file_stem().unwrap_or(name);
    NAME_MARKERS.replace(stem, "").into_owned()
}

/// Parse plugin declarations from the host's JSON representation.
pub fn parse_plugins(value: Value) -> Result<Vec<Plugin>> {
    Ok(serde_json::from_value(value)?)
}
