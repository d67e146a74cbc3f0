//! Named tag manager instances

use super::manager::TagManager;
use crate::domain::{labelify, Presets, DEFAULT_NAMESPACE};
use crate::error::{CodetagsError, Result};
use crate::infrastructure::{EnvSource, OverrideSource};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::debug;

/// Managers keyed by normalized instance name
///
/// The default instance lives under the normalized default namespace and is
/// only reachable through `default_instance` or `get_instance`.
pub struct Registry {
    instances: HashMap<String, TagManager>,
    source: Arc<dyn OverrideSource>,
}

impl Registry {
    /// Registry whose managers read the process environment
    pub fn new() -> Self {
        Self::with_source(Arc::new(EnvSource))
    }

    /// Registry whose managers read `source`
    pub fn with_source(source: Arc<dyn OverrideSource>) -> Self {
        Registry {
            instances: HashMap::new(),
            source,
        }
    }

    /// Process-wide registry
    ///
    /// The returned guard holds the registry lock. Calling `global` again on
    /// the same thread while a guard is alive deadlocks, so drop it first.
    ///
    /// # Examples
    ///
    /// ```
    /// use codetags::application::Registry;
    ///
    /// let mut registry = Registry::global();
    /// let manager = registry.default_instance();
    /// manager.reset();
    /// assert!(manager.declared_tags().is_empty());
    /// ```
    pub fn global() -> MutexGuard<'static, Registry> {
        static GLOBAL: OnceLock<Mutex<Registry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Mutex::new(Registry::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The default manager, created on first use
    pub fn default_instance(&mut self) -> &mut TagManager {
        let source = &self.source;
        self.instances
            .entry(default_name())
            .or_insert_with(|| TagManager::with_source(Arc::clone(source)))
    }

    /// Existing manager for `name`, or a new one
    ///
    /// `presets`, when given, are applied whether the manager is new or not.
    pub fn get_instance(
        &mut self,
        name: &str,
        presets: Option<&Presets>,
    ) -> Result<&mut TagManager> {
        let key = instance_key(name)?;
        let source = &self.source;
        let manager = self.instances.entry(key).or_insert_with_key(|key| {
            debug!(instance = %key, "creating tag manager");
            TagManager::with_source(Arc::clone(source))
        });
        if let Some(presets) = presets {
            manager.initialize(presets);
        }
        Ok(manager)
    }

    /// Always create a fresh manager for `name`, replacing any existing one
    ///
    /// The default instance name is reserved.
    pub fn new_instance(
        &mut self,
        name: &str,
        presets: Option<&Presets>,
    ) -> Result<&mut TagManager> {
        let key = instance_key(name)?;
        if key == default_name() {
            return Err(CodetagsError::InvalidInstanceName(format!(
                "{} is the default instance name, please provide another name",
                name
            )));
        }

        debug!(instance = %key, "creating tag manager");
        let mut manager = TagManager::with_source(Arc::clone(&self.source));
        if let Some(presets) = presets {
            manager.initialize(presets);
        }
        let manager = match self.instances.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(manager);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(manager),
        };
        Ok(manager)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(&labelify(name))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn default_name() -> String {
    labelify(DEFAULT_NAMESPACE)
}

fn instance_key(name: &str) -> Result<String> {
    let key = labelify(name);
    if key.is_empty() {
        return Err(CodetagsError::InvalidInstanceName(
            "instance name must not be empty".to_string(),
        ));
    }
    Ok(key)
}
