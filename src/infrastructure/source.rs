//! Override sources for included and excluded tags

use std::collections::HashMap;

/// Key/value lookup that supplies override lists
pub trait OverrideSource: Send + Sync {
    /// Raw value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Comma-separated list under `key`, trimmed, empty items dropped
    fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| split_list(&raw))
            .unwrap_or_default()
    }
}

/// Split a comma-separated list, preserving order
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl OverrideSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory source, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl OverrideSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list("abc, def, xyz, tag-4"),
            vec!["abc", "def", "xyz", "tag-4"]
        );
        assert_eq!(split_list(" a ,, ,b,"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_map_source_lists() {
        let source = MapSource::new().with("X_INCLUDED_TAGS", "tag-1,tag-2");
        assert_eq!(source.get_list("X_INCLUDED_TAGS"), vec!["tag-1", "tag-2"]);
        assert!(source.get_list("X_EXCLUDED_TAGS").is_empty());
    }

    #[test]
    fn test_map_source_from_iter() {
        let source: MapSource = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(source.get("B").as_deref(), Some("2"));
    }

    #[test]
    fn test_env_source_reads_process_env() {
        std::env::set_var("CODETAGS_SOURCE_TEST_INCLUDED_TAGS", " one , two ");
        assert_eq!(
            EnvSource.get_list("CODETAGS_SOURCE_TEST_INCLUDED_TAGS"),
            vec!["one", "two"]
        );
        assert_eq!(EnvSource.get("CODETAGS_SOURCE_TEST_MISSING"), None);
    }
}
