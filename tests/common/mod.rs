#![allow(dead_code)]

use codetags::{MapSource, Presets, TagManager};
use std::sync::Arc;

pub fn manager_with(pairs: &[(&str, &str)]) -> TagManager {
    let source: MapSource = pairs.iter().copied().collect();
    TagManager::with_source(Arc::new(source))
}

pub fn presets(pairs: &[(&str, &str)]) -> Presets {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
