//! Name-keyed table of normalised plugins.

use std::collections::HashMap;

use dpp_meta::{Plugin, normalize};

/// Normalised plugins keyed by name, in first-declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginTable {
    plugins: Vec<Plugin>,
    index: HashMap<String, usize>,
}

impl PluginTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalise every declaration against `base_path`.
    pub fn normalized(declarations: &[Plugin], base_path: &str) -> Self {
        let mut table = Self::new();
        for declared in declarations {
            table.insert(normalize(declared, base_path));
        }
        table
    }

    /// Add `plugin`, replacing a previous plugin of the same name in place.
    pub fn insert(&mut self, plugin: Plugin) {
        match self.index.get(&plugin.name) {
            Some(&slot) => {
                tracing::debug!(name = %plugin.name, "plugin declared twice, keeping the last");
                self.plugins[slot] = plugin;
            }
            None => {
                self.index.insert(plugin.name.clone(), self.plugins.len());
                self.plugins.push(plugin);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.index.get(name).map(|&slot| &self.plugins[slot])
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    /// Mutable access in table order. Names must not be changed.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Plugin> {
        self.plugins.iter_mut()
    }

    pub fn as_slice(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn into_vec(self) -> Vec<Plugin> {
        self.plugins
    }
}
