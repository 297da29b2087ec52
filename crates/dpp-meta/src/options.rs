//! Option and parameter documents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::merge::{Merge, fold_merge, merge_keyed, merge_params};

/// Free-form parameter object of a capability.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Options of an extension. Folded like [`Params`].
pub type ExtOptions = Params;

/// Options of a protocol. Folded like [`Params`].
pub type ProtocolOptions = Params;

/// Key under which an override applies to every capability.
pub const GLOBAL_KEY: &str = "_";

/// The layered option document of the plugin manager.
///
/// Per-capability maps are keyed by capability name, with [`GLOBAL_KEY`]
/// holding overrides shared by all capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DppOptions {
    pub ext_options: HashMap<String, ExtOptions>,
    pub ext_params: HashMap<String, Params>,
    /// Protocols handed to extension actions.
    pub protocols: Vec<String>,
    pub protocol_options: HashMap<String, ProtocolOptions>,
    pub protocol_params: HashMap<String, Params>,
    /// Startup fragments inlined into the bootstrap script, in order.
    pub inline_vimrcs: Vec<String>,
}

impl Merge for DppOptions {
    fn merge(self, layer: &Self) -> Self {
        let mut protocols = self.protocols;
        protocols.extend(layer.protocols.iter().cloned());
        let mut inline_vimrcs = self.inline_vimrcs;
        inline_vimrcs.extend(layer.inline_vimrcs.iter().cloned());

        Self {
            ext_options: merge_keyed(self.ext_options, &layer.ext_options),
            ext_params: merge_keyed(self.ext_params, &layer.ext_params),
            protocols,
            protocol_options: merge_keyed(self.protocol_options, &layer.protocol_options),
            protocol_params: merge_keyed(self.protocol_params, &layer.protocol_params),
            inline_vimrcs,
        }
    }
}

impl DppOptions {
    /// Effective options and params of the extension `name`.
    ///
    /// Options: defaults < `_` override < `name` override.
    /// Params: `declared` (the extension's own defaults) < `_` < `name`.
    pub fn ext_args(&self, name: &str, declared: &Params) -> (ExtOptions, Params) {
        let options = fold_merge(
            merge_params,
            ExtOptions::new,
            &[self.ext_options.get(GLOBAL_KEY), self.ext_options.get(name)],
        );
        let params = fold_merge(
            merge_params,
            Params::new,
            &[
                Some(declared),
                self.ext_params.get(GLOBAL_KEY),
                self.ext_params.get(name),
            ],
        );
        (options, params)
    }

    /// Effective options and params of the protocol `name`, same layering
    /// as [`DppOptions::ext_args`] over the protocol tables.
    pub fn protocol_args(&self, name: &str, declared: &Params) -> (ProtocolOptions, Params) {
        let options = fold_merge(
            merge_params,
            ProtocolOptions::new,
            &[
                self.protocol_options.get(GLOBAL_KEY),
                self.protocol_options.get(name),
            ],
        );
        let params = fold_merge(
            merge_params,
            Params::new,
            &[
                Some(declared),
                self.protocol_params.get(GLOBAL_KEY),
                self.protocol_params.get(name),
            ],
        );
        (options, params)
    }
}

/// Session context shared with extension actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Context {
    /// Base directory of the last compiled state.
    pub base_path: Option<String>,
    /// Profile name of the last compiled state.
    pub profile: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_parse_camel_case_options() {
        let options: DppOptions = serde_json::from_value(json!({
            "protocols": ["git"],
            "inlineVimrcs": ["~/.vim/rc/options.vim"],
            "extParams": { "installer": { "checkDiff": true } },
        }))
        .unwrap();

        assert_eq!(options.protocols, vec!["git"]);
        assert_eq!(options.inline_vimrcs, vec!["~/.vim/rc/options.vim"]);
        assert_eq!(options.ext_params["installer"]["checkDiff"], json!(true));
        assert!(options.ext_options.is_empty());
    }

    #[test]
    fn test_merge_concatenates_lists_in_order() {
        let base = DppOptions {
            protocols: vec!["git".into()],
            inline_vimrcs: vec!["a.vim".into()],
            ..Default::default()
        };
        let layer = DppOptions {
            protocols: vec!["git".into(), "http".into()],
            inline_vimrcs: vec!["b.lua".into()],
            ..Default::default()
        };

        let merged = base.merge(&layer);

        assert_eq!(merged.protocols, vec!["git", "git", "http"]);
        assert_eq!(merged.inline_vimrcs, vec!["a.vim", "b.lua"]);
    }

    #[test]
    fn test_merge_maps_per_key() {
        let base = DppOptions {
            ext_params: HashMap::from([
                ("installer".to_string(), params(json!({ "a": 1 }))),
                ("lazy".to_string(), params(json!({ "b": 2 }))),
            ]),
            ..Default::default()
        };
        let layer = DppOptions {
            ext_params: HashMap::from([("installer".to_string(), params(json!({ "c": 3 })))]),
            ..Default::default()
        };

        let merged = base.merge(&layer);

        assert_eq!(merged.ext_params["installer"], params(json!({ "c": 3 })));
        assert_eq!(merged.ext_params["lazy"], params(json!({ "b": 2 })));
    }

    #[test]
    fn test_ext_args_precedence() {
        let options = DppOptions {
            ext_options: HashMap::from([
                ("_".to_string(), params(json!({ "timeout": 10, "shared": true }))),
                ("installer".to_string(), params(json!({ "timeout": 50 }))),
            ]),
            ext_params: HashMap::from([
                ("_".to_string(), params(json!({ "maxProcesses": 4 }))),
                ("installer".to_string(), params(json!({ "checkDiff": true }))),
            ]),
            ..Default::default()
        };
        let declared = params(json!({ "maxProcesses": 1, "checkDiff": false, "wait": 0 }));

        let (ext_options, ext_params) = options.ext_args("installer", &declared);

        assert_eq!(ext_options, params(json!({ "timeout": 50, "shared": true })));
        assert_eq!(
            ext_params,
            params(json!({ "maxProcesses": 4, "checkDiff": true, "wait": 0 }))
        );
    }

    #[test]
    fn test_ext_args_without_overrides_returns_declared() {
        let declared = params(json!({ "wait": 0 }));
        let (ext_options, ext_params) = DppOptions::default().ext_args("lazy", &declared);
        assert!(ext_options.is_empty());
        assert_eq!(ext_params, declared);
    }

    #[test]
    fn test_protocol_args_use_protocol_tables() {
        let options = DppOptions {
            ext_params: HashMap::from([("git".to_string(), params(json!({ "depth": 99 })))]),
            protocol_params: HashMap::from([("git".to_string(), params(json!({ "depth": 1 })))]),
            protocol_options: HashMap::from([("_".to_string(), params(json!({ "retry": 2 })))]),
            ..Default::default()
        };

        let (protocol_options, protocol_params) =
            options.protocol_args("git", &params(json!({ "depth": 0 })));

        assert_eq!(protocol_options, params(json!({ "retry": 2 })));
        assert_eq!(protocol_params, params(json!({ "depth": 1 })));
    }
}
