//! Declared, included and excluded tag sets with memoized activation

use super::evaluator::LabelActivation;
use std::collections::HashMap;
use tracing::trace;

/// Tag sets of one manager plus the activation cache
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    declared_tags: Vec<String>,
    included_tags: Vec<String>,
    excluded_tags: Vec<String>,
    cached_tags: HashMap<String, bool>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declared_tags(&self) -> &[String] {
        &self.declared_tags
    }

    pub fn included_tags(&self) -> &[String] {
        &self.included_tags
    }

    pub fn excluded_tags(&self) -> &[String] {
        &self.excluded_tags
    }

    /// Append names to the declared tags
    ///
    /// Callers guarantee the names are new; the cache is left alone.
    pub fn declare(&mut self, names: Vec<String>) {
        self.declared_tags.extend(names);
    }

    pub fn clear_declared(&mut self) {
        self.declared_tags.clear();
    }

    /// Replace the override lists, dropping every cached answer
    pub fn set_overrides(&mut self, included: Vec<String>, excluded: Vec<String>) {
        self.cached_tags.clear();
        self.included_tags = included;
        self.excluded_tags = excluded;
    }

    pub fn clear_cache(&mut self) {
        self.cached_tags.clear();
    }

    /// Cached answer for `name`, if any
    pub fn cached(&self, name: &str) -> Option<bool> {
        self.cached_tags.get(name).copied()
    }

    /// Uncached activation: exclude > include > declared
    pub fn force_check_label_activated(&self, name: &str) -> bool {
        if self.excluded_tags.iter().any(|t| t == name) {
            return false;
        }
        if self.included_tags.iter().any(|t| t == name) {
            return true;
        }
        self.declared_tags.iter().any(|t| t == name)
    }
}

impl LabelActivation for TagStore {
    fn check_label_activated(&mut self, name: &str) -> bool {
        if let Some(active) = self.cached(name) {
            return active;
        }
        let active = self.force_check_label_activated(name);
        trace!(tag = name, active, "activation cache miss");
        self.cached_tags.insert(name.to_string(), active);
        active
    }
}
