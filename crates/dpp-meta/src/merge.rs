//! Layered configuration merge.
//!
//! Effective options are computed by folding an ordered list of optional
//! layers, least specific first, onto a default value. Layer order is the
//! precedence order and is never rearranged.

use std::collections::HashMap;
use std::hash::Hash;

use crate::options::Params;

/// Combine a more specific layer into an accumulated value.
///
/// Implementations follow one rule per field kind:
/// - scalars: a value defined in `layer` replaces the accumulated one
/// - lists: `layer` items are appended after the accumulated items
/// - name-keyed maps: merged per key, `layer` wins on conflicting keys
pub trait Merge {
    fn merge(self, layer: &Self) -> Self;
}

/// Fold `layers` onto `default()` with `merge`, skipping absent layers.
///
/// # Example
///
/// ```
/// use dpp_meta::{fold_merge, merge_params, Params};
/// use serde_json::json;
///
/// let mut global = Params::new();
/// global.insert("depth".into(), json!(1));
/// let mut specific = Params::new();
/// specific.insert("depth".into(), json!(3));
///
/// let merged = fold_merge(merge_params, Params::new, &[Some(&global), None, Some(&specific)]);
/// assert_eq!(merged["depth"], json!(3));
/// ```
pub fn fold_merge<T, M, D>(merge: M, default: D, layers: &[Option<&T>]) -> T
where
    M: Fn(T, &T) -> T,
    D: FnOnce() -> T,
{
    layers
        .iter()
        .copied()
        .flatten()
        .fold(default(), |acc, layer| merge(acc, layer))
}

/// Shallow per-key overwrite of parameter objects.
pub fn merge_params(mut acc: Params, layer: &Params) -> Params {
    for (key, value) in layer {
        acc.insert(key.clone(), value.clone());
    }
    acc
}

/// Per-key merge of a name-keyed map; the layer's entry replaces the
/// accumulated entry for the same key.
pub fn merge_keyed<K, V>(mut acc: HashMap<K, V>, layer: &HashMap<K, V>) -> HashMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    for (key, value) in layer {
        acc.insert(key.clone(), value.clone());
    }
    acc
}

impl Merge for Params {
    fn merge(self, layer: &Self) -> Self {
        merge_params(self, layer)
    }
}
