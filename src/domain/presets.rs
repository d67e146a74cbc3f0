//! Manager presets and override key resolution

use super::label::labelify;
use std::collections::BTreeMap;

/// Configuration values of a manager
pub type Presets = BTreeMap<String, String>;

/// Namespace used when no `namespace` preset is configured
pub const DEFAULT_NAMESPACE: &str = "CODETAGS";

pub const VERSION_KEY: &str = "version";
pub const NAMESPACE_KEY: &str = "namespace";
pub const INCLUDED_TAGS_KEY: &str = "INCLUDED_TAGS";
pub const EXCLUDED_TAGS_KEY: &str = "EXCLUDED_TAGS";

/// Keys copied verbatim by `merge_presets`
const RAW_KEYS: [&str; 1] = [VERSION_KEY];

/// Keys copied through `labelify` by `merge_presets`
const LABEL_KEYS: [&str; 3] = [NAMESPACE_KEY, INCLUDED_TAGS_KEY, EXCLUDED_TAGS_KEY];

/// Merge the recognized keys of `incoming` into `presets`
///
/// Unrecognized keys are ignored.
pub fn merge_presets(presets: &mut Presets, incoming: &Presets) {
    for key in RAW_KEYS {
        if let Some(value) = incoming.get(key) {
            presets.insert(key.to_string(), value.clone());
        }
    }
    for key in LABEL_KEYS {
        if let Some(value) = incoming.get(key) {
            presets.insert(key.to_string(), labelify(value));
        }
    }
}

/// Override source key for `suffix_key`, e.g. `CODETAGS_INCLUDED_TAGS`
///
/// # Examples
///
/// ```
/// use codetags::domain::presets::{label_for, Presets, EXCLUDED_TAGS_KEY};
///
/// let mut presets = Presets::new();
/// assert_eq!(label_for(&presets, EXCLUDED_TAGS_KEY), "CODETAGS_EXCLUDED_TAGS");
///
/// presets.insert("namespace".into(), "PASSION".into());
/// presets.insert("EXCLUDED_TAGS".into(), "NEGATIVE_TAGS".into());
/// assert_eq!(label_for(&presets, EXCLUDED_TAGS_KEY), "PASSION_NEGATIVE_TAGS");
/// ```
pub fn label_for(presets: &Presets, suffix_key: &str) -> String {
    let namespace = presets
        .get(NAMESPACE_KEY)
        .map(String::as_str)
        .unwrap_or(DEFAULT_NAMESPACE);
    let suffix = presets
        .get(suffix_key)
        .map(String::as_str)
        .unwrap_or(suffix_key);
    format!("{}_{}", namespace, suffix)
}
