//! codetags - Feature tag evaluation
//!
//! Tags are declared in code, optionally gated on a semantic version, and
//! overridden at runtime by included/excluded lists read from the
//! environment. Boolean expressions over tag names decide whether a feature
//! is active.
//!
//! ```
//! use codetags::{Expression, MapSource, TagManager};
//! use std::sync::Arc;
//!
//! let source = MapSource::new().with("CODETAGS_EXCLUDED_TAGS", "legacy");
//! let mut tags = TagManager::with_source(Arc::new(source));
//! tags.register(["new-ui", "legacy"]).unwrap();
//!
//! assert!(tags.is_active(["new-ui"]));
//! assert!(!tags.is_active(["legacy"]));
//! assert!(tags.is_active([Expression::not("legacy")]));
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{Registry, TagManager};
pub use domain::{Declaration, Expression, Operator, Presets, TagDescriptor, TagPlan};
pub use error::{CodetagsError, RegistrationError};
pub use infrastructure::{EnvSource, Manifest, MapSource, OverrideSource};
