//! Tag manager: registration, overrides and activation checks

use crate::domain::presets::{
    label_for, merge_presets, EXCLUDED_TAGS_KEY, INCLUDED_TAGS_KEY, VERSION_KEY,
};
use crate::domain::{
    evaluate_expression, is_any_active, resolve_declarations, Declaration, Expression, Presets,
    TagStore,
};
use crate::error::{CodetagsError, Result};
use crate::infrastructure::{EnvSource, Manifest, OverrideSource};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Tags of one namespace and the rules deciding which are active
pub struct TagManager {
    store: TagStore,
    presets: Presets,
    source: Arc<dyn OverrideSource>,
}

impl TagManager {
    /// Create a manager reading overrides from the process environment
    pub fn new() -> Self {
        Self::with_source(Arc::new(EnvSource))
    }

    /// Create a manager reading overrides from `source`
    pub fn with_source(source: Arc<dyn OverrideSource>) -> Self {
        let mut manager = TagManager {
            store: TagStore::new(),
            presets: Presets::new(),
            source,
        };
        manager.refresh_overrides();
        manager
    }

    /// Merge `config` into the presets and reload the overrides
    ///
    /// Recognized keys: `version`, `namespace`, `INCLUDED_TAGS` and
    /// `EXCLUDED_TAGS`. All but `version` are label-normalized.
    pub fn initialize(&mut self, config: &Presets) -> &mut Self {
        merge_presets(&mut self.presets, config);
        self.refresh_overrides();
        self
    }

    /// Declare tags
    ///
    /// Bare names are always declared, descriptors only when their
    /// enablement resolves to `true`. Nothing is committed when any item is
    /// invalid or any name is declared twice; the error lists every problem.
    ///
    /// # Examples
    ///
    /// ```
    /// use codetags::application::TagManager;
    /// use codetags::domain::{Declaration, TagDescriptor, TagPlan};
    ///
    /// let mut manager = TagManager::new();
    /// manager
    ///     .register([
    ///         Declaration::from("tag-1"),
    ///         TagDescriptor::new("tag-2")
    ///             .with_enabled(false)
    ///             .with_plan(TagPlan::new(false))
    ///             .into(),
    ///         TagDescriptor::new("tag-3").into(),
    ///     ])
    ///     .unwrap();
    /// assert_eq!(manager.declared_tags(), ["tag-1", "tag-3"]);
    /// ```
    pub fn register<I, D>(&mut self, declarations: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = D>,
        D: Into<Declaration>,
    {
        let declarations: Vec<Declaration> = declarations.into_iter().map(Into::into).collect();
        let version = self.presets.get(VERSION_KEY).map(String::as_str);

        let names = resolve_declarations(&declarations, version, self.store.declared_tags())
            .map_err(CodetagsError::Registration)?;
        self.store.declare(names);

        debug!(declared = ?self.store.declared_tags(), "registered tags");
        Ok(self)
    }

    /// True iff any of `expressions` is active
    ///
    /// Each argument is evaluated on its own and the results are OR-ed; an
    /// empty argument list is inactive.
    pub fn is_active<I, E>(&mut self, expressions: I) -> bool
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        let expressions: Vec<Expression> = expressions.into_iter().map(Into::into).collect();
        is_any_active(&mut self.store, &expressions)
    }

    /// Parse `text` with the expression syntax and evaluate it
    pub fn is_active_str(&mut self, text: &str) -> Result<bool> {
        let expr = Expression::parse(text)?;
        Ok(self.evaluate_expression(&expr))
    }

    pub fn evaluate_expression(&mut self, expr: &Expression) -> bool {
        evaluate_expression(&mut self.store, expr)
    }

    /// Drop cached answers and reload the overrides
    pub fn clear_cache(&mut self) -> &mut Self {
        self.store.clear_cache();
        self.refresh_overrides();
        self
    }

    /// Reload the overrides, then forget declarations and presets
    ///
    /// The overrides are read under the namespace in effect before the reset.
    pub fn reset(&mut self) -> &mut Self {
        self.store.clear_cache();
        self.refresh_overrides();
        self.store.clear_declared();
        self.presets.clear();
        self
    }

    /// Initialize with the manifest presets, then register its declarations
    pub fn apply_manifest(&mut self, manifest: &Manifest) -> Result<&mut Self> {
        self.initialize(&manifest.presets);
        self.register(manifest.declarations.iter().cloned())
    }

    pub fn declared_tags(&self) -> &[String] {
        self.store.declared_tags()
    }

    pub fn included_tags(&self) -> &[String] {
        self.store.included_tags()
    }

    pub fn excluded_tags(&self) -> &[String] {
        self.store.excluded_tags()
    }

    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    fn refresh_overrides(&mut self) {
        let included_label = label_for(&self.presets, INCLUDED_TAGS_KEY);
        let excluded_label = label_for(&self.presets, EXCLUDED_TAGS_KEY);
        let included = self.source.get_list(&included_label);
        let excluded = self.source.get_list(&excluded_label);
        debug!(
            %included_label,
            ?included,
            %excluded_label,
            ?excluded,
            "refreshed tag overrides"
        );
        self.store.set_overrides(included, excluded);
    }
}

impl Default for TagManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TagManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagManager")
            .field("store", &self.store)
            .field("presets", &self.presets)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Operator, TagDescriptor, TagPlan};
    use crate::error::RegistrationError;
    use crate::infrastructure::MapSource;

    fn presets(pairs: &[(&str, &str)]) -> Presets {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn isactive_manager() -> TagManager {
        let source = MapSource::new()
            .with("ISACTIVE_INCLUDED_TAGS", "abc, def, xyz, tag-4")
            .with("ISACTIVE_EXCLUDED_TAGS", "disabled, tag-2");
        let mut manager = TagManager::with_source(Arc::new(source));
        manager.initialize(&presets(&[("namespace", "IsActive")]));
        manager.register(["tag-1", "tag-2"]).unwrap();
        manager
    }

    #[test]
    fn test_initialize_merges_presets() {
        let mut manager = TagManager::with_source(Arc::new(MapSource::new()));
        manager.initialize(&presets(&[("namespace", "ABC")]));
        manager.initialize(&presets(&[("namespace", "xyz"), ("version", "0.1.2")]));
        assert_eq!(
            manager.presets(),
            &presets(&[("namespace", "XYZ"), ("version", "0.1.2")])
        );
    }

    #[test]
    fn test_initialize_redirects_override_keys() {
        let source = MapSource::new()
            .with("PASSION_INCLUDED_TAGS", "tag-4,tag-5")
            .with("PASSION_NEGATIVE_TAGS", "tag-5,tag-6")
            .with("PASSION_EXCLUDED_TAGS", "tag-6,tag-7");
        let mut manager = TagManager::with_source(Arc::new(source));
        manager.initialize(&presets(&[
            ("namespace", "Passion"),
            ("EXCLUDED_TAGS", "NEGATIVE_TAGS"),
            ("version", "1.2.3"),
        ]));
        assert_eq!(manager.presets().get("namespace").unwrap(), "PASSION");
        assert_eq!(manager.presets().get("version").unwrap(), "1.2.3");
        assert_eq!(manager.included_tags(), ["tag-4", "tag-5"]);
        assert_eq!(manager.excluded_tags(), ["tag-5", "tag-6"]);
    }

    #[test]
    fn test_overrides_loaded_on_construction() {
        let source = MapSource::new()
            .with("CODETAGS_INCLUDED_TAGS", "tag-1,tag-2")
            .with("CODETAGS_EXCLUDED_TAGS", "tag-2,tag-3");
        let manager = TagManager::with_source(Arc::new(source));
        assert_eq!(manager.included_tags(), ["tag-1", "tag-2"]);
        assert_eq!(manager.excluded_tags(), ["tag-2", "tag-3"]);
    }

    #[test]
    fn test_register_normal_descriptors() {
        let mut manager = TagManager::with_source(Arc::new(MapSource::new()));
        manager
            .register([
                Declaration::from("feature-1"),
                TagDescriptor::new("feature-2").into(),
                TagDescriptor::new("feature-3").with_enabled(false).into(),
                TagDescriptor::new("feature-4").with_enabled(true).into(),
                TagDescriptor::new("feature-5")
                    .with_plan(TagPlan::new(true))
                    .into(),
            ])
            .unwrap();
        assert_eq!(
            manager.declared_tags(),
            ["feature-1", "feature-2", "feature-4", "feature-5"]
        );
    }

    #[test]
    fn test_register_filtered_by_version() {
        let mut manager = TagManager::with_source(Arc::new(MapSource::new()));
        manager.initialize(&presets(&[("version", "0.1.7")]));
        manager
            .register([
                TagDescriptor::new("feature-11").with_plan(TagPlan::new(true)),
                TagDescriptor::new("feature-12")
                    .with_plan(TagPlan::new(true).with_min_bound("0.1.2")),
                TagDescriptor::new("feature-13").with_plan(
                    TagPlan::new(true)
                        .with_min_bound("0.1.2")
                        .with_max_bound("0.1.6"),
                ),
                TagDescriptor::new("feature-14").with_plan(
                    TagPlan::new(false)
                        .with_min_bound("0.1.2")
                        .with_max_bound("0.1.6"),
                ),
                TagDescriptor::new("feature-15")
                    .with_plan(TagPlan::new(true).with_min_bound("0.1.8")),
                TagDescriptor::new("feature-16")
                    .with_plan(TagPlan::new(false).with_min_bound("0.1.9")),
            ])
            .unwrap();
        assert_eq!(
            manager.declared_tags(),
            ["feature-11", "feature-12", "feature-14", "feature-16"]
        );
    }

    #[test]
    fn test_register_duplicates_commit_nothing() {
        let mut manager = TagManager::with_source(Arc::new(MapSource::new()));
        manager.initialize(&presets(&[("version", "0.1.7")]));
        let err = manager
            .register([
                Declaration::from("feature-11"),
                TagDescriptor::new("feature-11").with_plan(TagPlan::new(true)).into(),
                TagDescriptor::new("feature-13")
                    .with_plan(
                        TagPlan::new(true)
                            .with_min_bound("0.1.2")
                            .with_max_bound("0.1.6"),
                    )
                    .into(),
                "feature-13".into(),
                TagDescriptor::new("feature-14")
                    .with_plan(
                        TagPlan::new(false)
                            .with_min_bound("0.1.2")
                            .with_max_bound("0.1.6"),
                    )
                    .into(),
                "feature-14".into(),
            ])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tag [feature-11] is declared more than one time\n\
             Tag [feature-14] is declared more than one time"
        );
        assert!(manager.declared_tags().is_empty());
    }

    #[test]
    fn test_register_duplicate_across_calls() {
        let mut manager = TagManager::with_source(Arc::new(MapSource::new()));
        manager.register(["a"]).unwrap();
        let err = manager.register(["b", "a"]).unwrap_err();
        assert_eq!(
            err.registration_errors(),
            [RegistrationError::DuplicateTagDeclaration {
                name: "a".to_string()
            }]
        );
        assert_eq!(manager.declared_tags(), ["a"]);
    }

    #[test]
    fn test_register_invalid_items() {
        let mut manager = TagManager::with_source(Arc::new(MapSource::new()));
        let err = manager
            .register([
                Declaration::from("feature-1"),
                TagDescriptor::new("feature-2").into(),
                Declaration::Invalid(toml::Value::Integer(1024)),
                TagDescriptor::new("feature-4").with_enabled(true).into(),
                Declaration::Invalid(toml::Value::Boolean(true)),
            ])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "descriptor#2 [1024] has invalid type (integer), must be a string or TagDescriptor type\n\
             descriptor#4 [true] has invalid type (boolean), must be a string or TagDescriptor type"
        );
        assert!(manager.declared_tags().is_empty());
    }

    #[test]
    fn test_is_active_arguments_are_or() {
        let mut m = isactive_manager();
        assert_eq!(m.included_tags(), ["abc", "def", "xyz", "tag-4"]);
        assert_eq!(m.excluded_tags(), ["disabled", "tag-2"]);

        assert!(m.is_active(["abc"]));
        assert!(m.is_active(["xyz"]));
        assert!(m.is_active(["abc", "disabled"]));
        assert!(m.is_active(["disabled", "abc"]));
        assert!(m.is_active(["abc", "nil"]));
        assert!(m.is_active(["undefined", "abc", "nil"]));
        assert!(!m.is_active(Vec::<Expression>::new()));
        assert!(!m.is_active([None::<&str>]));
        assert!(!m.is_active(["disabled"]));
        assert!(!m.is_active(["nil"]));
        assert!(!m.is_active(["disabled", "nil"]));
    }

    #[test]
    fn test_is_active_sequences_are_and() {
        let mut m = isactive_manager();
        assert!(m.is_active([vec!["abc", "xyz"]]));
        assert!(m.is_active([Expression::sequence(["abc", "xyz"]), Expression::Unsupported]));
        assert!(!m.is_active([vec!["abc", "nil"]]));
        assert!(!m.is_active([vec!["abc", "def", "nil"]]));
        assert!(!m.is_active([vec!["abc", "def", "disabled"]]));
        assert!(!m.is_active([vec!["abc", "123"], vec!["def", "456"]]));
        assert!(!m.is_active([Expression::Sequence(vec![
            Expression::Unsupported,
            "tag-1".into()
        ])]));
    }

    #[test]
    fn test_is_active_overrides_beat_declarations() {
        let mut m = isactive_manager();
        assert!(m.is_active(["tag-1"]));
        assert!(m.is_active(["abc", "tag-1"]));
        assert!(m.is_active(["disabled", "tag-1"]));
        assert!(m.is_active(["tag-4"]));
        assert!(!m.is_active(["tag-2"]));
        assert!(!m.is_active(["tag-3"]));
        assert!(!m.is_active([vec!["nil", "tag-1"]]));
        assert!(!m.is_active(["nil", "tag-3"]));
        assert!(!m.is_active(["tag-3", "disabled"]));
    }

    #[test]
    fn test_evaluate_operator_maps() {
        let mut m = isactive_manager();
        let expr = Expression::all(["abc", "xyz"])
            .with(Operator::Not(Box::new("not-found".into())))
            .with(Operator::Any(vec!["tag-0".into(), "tag-4".into()]));
        assert!(m.evaluate_expression(&expr));

        let inner =
            Expression::not("tag-0").with(Operator::All(vec!["tag-1".into(), "tag-4".into()]));
        assert!(m.evaluate_expression(&inner));

        let nested = Expression::all([Expression::tag("abc"), Expression::tag("xyz"), inner])
            .with(Operator::Not(Box::new("not-found".into())));
        assert!(m.evaluate_expression(&nested));

        assert!(!m.evaluate_expression(&Expression::Unsupported));
        assert!(!m.evaluate_expression(&"nil".into()));
    }

    #[test]
    fn test_with_keeps_tag_receiver() {
        let mut m = TagManager::with_source(Arc::new(MapSource::new()));
        let expr = Expression::tag("missing").with(Operator::Not(Box::new("x".into())));
        assert!(!m.evaluate_expression(&expr));
        m.register(["missing"]).unwrap();
        m.clear_cache();
        assert!(m.evaluate_expression(&expr));
    }

    #[test]
    fn test_is_active_str() {
        let mut m = isactive_manager();
        assert!(m.is_active_str("abc AND xyz AND NOT not-found").unwrap());
        assert!(m.is_active_str("tag-0 OR tag-4").unwrap());
        assert!(!m.is_active_str("tag-2 OR (tag-1 AND nil)").unwrap());
        assert!(m.is_active_str("abc AND").is_err());
    }

    #[test]
    fn test_cache_holds_until_cleared() {
        let mut m = TagManager::with_source(Arc::new(MapSource::new()));
        assert!(!m.is_active(["late"]));
        m.register(["late"]).unwrap();
        assert!(!m.is_active(["late"]));
        m.clear_cache();
        assert!(m.is_active(["late"]));
    }

    #[test]
    fn test_reset_clears_everything() {
        let source = MapSource::new()
            .with("CODETAGS_INCLUDED_TAGS", "base")
            .with("OTHER_INCLUDED_TAGS", "other");
        let mut m = TagManager::with_source(Arc::new(source));
        m.initialize(&presets(&[("namespace", "other"), ("version", "1.0.0")]));
        m.register(["tag-1"]).unwrap();
        assert_eq!(m.included_tags(), ["other"]);
        assert!(m.is_active(["tag-1"]));

        m.reset();
        assert!(m.declared_tags().is_empty());
        assert!(m.presets().is_empty());
        assert_eq!(m.included_tags(), ["other"]);
        assert!(!m.is_active(["tag-1"]));

        m.clear_cache();
        assert_eq!(m.included_tags(), ["base"]);
    }

    #[test]
    fn test_apply_manifest() {
        let manifest = Manifest::from_toml_str(
            r#"
declarations = [
    "feature-1",
    { name = "feature-13", plan = { enabled = true, min_bound = "0.1.2", max_bound = "0.1.6" } },
]

[presets]
version = "0.1.7"
"#,
        )
        .unwrap();
        let mut m = TagManager::with_source(Arc::new(MapSource::new()));
        m.apply_manifest(&manifest).unwrap();
        assert_eq!(m.declared_tags(), ["feature-1"]);
        assert_eq!(m.presets().get("version").unwrap(), "0.1.7");
    }
}
