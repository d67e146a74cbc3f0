//! Tag declarations and version-gated enablement

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// A version-bounded enablement rule
///
/// `min_bound` is inclusive, `max_bound` is exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPlan {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub enabled: Option<bool>,
    pub min_bound: Option<String>,
    pub max_bound: Option<String>,
}

impl TagPlan {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn with_min_bound(mut self, bound: impl Into<String>) -> Self {
        self.min_bound = Some(bound.into());
        self
    }

    pub fn with_max_bound(mut self, bound: impl Into<String>) -> Self {
        self.max_bound = Some(bound.into());
        self
    }
}

/// A tag declaration with optional enablement rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDescriptor {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub enabled: Option<bool>,
    pub plan: Option<TagPlan>,
    pub note: Option<String>,
}

impl TagDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_plan(mut self, plan: TagPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Decide whether this descriptor ends up declared
    ///
    /// A plan only applies when it carries an `enabled` flag, a version is
    /// configured and every version string parses. Otherwise the direct
    /// `enabled` flag is used, defaulting to `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use codetags::domain::{TagDescriptor, TagPlan};
    ///
    /// let d = TagDescriptor::new("feature-13").with_plan(
    ///     TagPlan::new(true).with_min_bound("0.1.2").with_max_bound("0.1.6"),
    /// );
    /// assert!(!d.resolve_enabled(Some("0.1.7")));
    /// assert!(d.resolve_enabled(Some("0.1.5")));
    /// ```
    pub fn resolve_enabled(&self, version: Option<&str>) -> bool {
        if let (Some(plan), Some(version)) = (&self.plan, version) {
            if let Some(planned) = plan.enabled {
                if let Some(satisfied) = plan_satisfied(plan, version) {
                    if satisfied {
                        return planned;
                    }
                    return self.enabled.unwrap_or(!planned);
                }
            }
        }
        self.enabled.unwrap_or(true)
    }
}

/// Check the plan bounds against `version`
///
/// Returns `None` when any version string fails to parse.
fn plan_satisfied(plan: &TagPlan, version: &str) -> Option<bool> {
    let current = parse_version(version)?;
    let mut satisfied = true;
    if let Some(min) = &plan.min_bound {
        satisfied &= current >= parse_version(min)?;
    }
    if let Some(max) = &plan.max_bound {
        satisfied &= current < parse_version(max)?;
    }
    Some(satisfied)
}

fn parse_version(raw: &str) -> Option<Version> {
    match Version::parse(raw) {
        Ok(version) => Some(version),
        Err(e) => {
            warn!(version = raw, error = %e, "ignoring unparsable version");
            None
        }
    }
}

/// Decode an `enabled` flag, treating non-boolean values as absent
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match toml::Value::deserialize(deserializer)? {
        toml::Value::Boolean(flag) => Ok(Some(flag)),
        other => {
            warn!(value = %other, "ignoring non-boolean enabled flag");
            Ok(None)
        }
    }
}

/// One item handed to registration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Declaration {
    /// A bare tag name, always declared
    Name(String),
    Descriptor(TagDescriptor),
    /// Anything else found in untyped input (e.g. a manifest)
    Invalid(toml::Value),
}

impl Declaration {
    /// Runtime type name used in error reports
    pub fn type_name(&self) -> &'static str {
        match self {
            Declaration::Name(_) => "string",
            Declaration::Descriptor(_) => "TagDescriptor",
            Declaration::Invalid(value) => value.type_str(),
        }
    }
}

impl From<&str> for Declaration {
    fn from(name: &str) -> Self {
        Declaration::Name(name.to_string())
    }
}

impl From<String> for Declaration {
    fn from(name: String) -> Self {
        Declaration::Name(name)
    }
}

impl From<TagDescriptor> for Declaration {
    fn from(descriptor: TagDescriptor) -> Self {
        Declaration::Descriptor(descriptor)
    }
}
