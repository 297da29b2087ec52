//! Ordered load-path builder.
//!
//! The host's load path is a list of directories searched in order. Plugins
//! are spliced in around one entry, the host's own runtime directory (the
//! anchor), through the named insertion points below.

/// Load-path entries plus the anchor they are arranged around.
///
/// The anchor slot is the anchor's index when the builder is created (the
/// end of the list when the anchor is missing). It does not move as entries
/// are inserted, so every [`LoadPath::insert_at_anchor_slot`] lands at the
/// same index and pushes earlier insertions toward the anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPath {
    entries: Vec<String>,
    anchor: String,
    slot: usize,
}

impl LoadPath {
    pub fn new(entries: Vec<String>, anchor: impl Into<String>) -> Self {
        let anchor = anchor.into();
        let slot = entries
            .iter()
            .position(|entry| *entry == anchor)
            .unwrap_or(entries.len());
        Self {
            entries,
            anchor,
            slot,
        }
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    /// Current index of the anchor, if it is in the list.
    pub fn anchor_index(&self) -> Option<usize> {
        self.entries.iter().position(|entry| *entry == self.anchor)
    }

    /// Insert at the slot captured on creation.
    pub fn insert_at_anchor_slot(&mut self, entry: impl Into<String>) {
        let index = self.slot.min(self.entries.len());
        self.entries.insert(index, entry.into());
    }

    /// Insert right before the anchor's current position.
    pub fn insert_before_anchor(&mut self, entry: impl Into<String>) {
        let index = self.anchor_index().unwrap_or(self.entries.len());
        self.entries.insert(index, entry.into());
    }

    /// Insert right after the anchor's current position.
    pub fn insert_after_anchor(&mut self, entry: impl Into<String>) {
        let index = self
            .anchor_index()
            .map_or(self.entries.len(), |index| index + 1);
        self.entries.insert(index, entry.into());
    }

    pub fn push_tail(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}
