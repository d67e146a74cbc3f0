//! Error types for codetags

use thiserror::Error;

/// A single problem found while registering tag declarations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(
        "descriptor#{index} [{value}] has invalid type ({type_name}), must be a string or TagDescriptor type"
    )]
    InvalidDescriptor {
        index: usize,
        value: String,
        type_name: String,
    },

    #[error("Tag [{name}] is declared more than one time")]
    DuplicateTagDeclaration { name: String },
}

/// Main error type for codetags
#[derive(Debug, Error)]
pub enum CodetagsError {
    #[error("Invalid instance name: {0}")]
    InvalidInstanceName(String),

    #[error("{}", render_lines(.0))]
    Registration(Vec<RegistrationError>),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

impl CodetagsError {
    /// Registration problems carried by this error, empty for other kinds
    pub fn registration_errors(&self) -> &[RegistrationError] {
        match self {
            CodetagsError::Registration(errors) => errors,
            _ => &[],
        }
    }
}

fn render_lines(errors: &[RegistrationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type using CodetagsError
pub type Result<T> = std::result::Result<T, CodetagsError>;
