//! Tag manifest files
//!
//! A manifest is a TOML document with the declarations to register and the
//! presets to initialize a manager with:
//!
//! ```toml
//! declarations = [
//!     "feature-1",
//!     { name = "feature-2", enabled = false },
//!     { name = "feature-3", plan = { enabled = true, min_bound = "0.1.2" } },
//! ]
//!
//! [presets]
//! namespace = "mission"
//! version = "0.1.7"
//! ```
//!
//! An `enabled` flag that is not a boolean (in a descriptor or its plan) is
//! treated as absent, so the descriptor falls back to the default rules.
//! A table without a string `name` is kept as an invalid declaration.

use crate::domain::{Declaration, Presets};
use crate::error::{CodetagsError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub presets: Presets,
}

impl Manifest {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a manifest from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CodetagsError::Manifest(format!("Manifest not found: {}", path.display()))
            } else {
                CodetagsError::Io(e)
            }
        })?;

        toml::from_str(&contents).map_err(|e| {
            CodetagsError::Manifest(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}
