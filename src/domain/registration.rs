//! Resolution of declaration lists into declared tag names

use super::descriptor::Declaration;
use crate::error::RegistrationError;
use std::collections::HashSet;

/// Resolve `declarations` against the tags that are already declared
///
/// Returns the new names to append, in first-seen order. Every invalid item
/// and every duplicate is collected: invalid items first in item order, then
/// duplicates in name order. Nothing is returned for commit when any error
/// exists.
pub fn resolve_declarations(
    declarations: &[Declaration],
    version: Option<&str>,
    declared: &[String],
) -> Result<Vec<String>, Vec<RegistrationError>> {
    let mut errors = Vec::new();
    let mut names = Vec::new();

    for (index, declaration) in declarations.iter().enumerate() {
        match declaration {
            Declaration::Name(name) => names.push(name.as_str()),
            Declaration::Descriptor(descriptor) => {
                if descriptor.resolve_enabled(version) {
                    names.push(descriptor.name.as_str());
                }
            }
            Declaration::Invalid(value) => errors.push(RegistrationError::InvalidDescriptor {
                index,
                value: value.to_string(),
                type_name: declaration.type_name().to_string(),
            }),
        }
    }

    let mut seen: HashSet<&str> = declared.iter().map(String::as_str).collect();
    let mut accepted = Vec::new();
    for name in names {
        if seen.insert(name) {
            accepted.push(name.to_string());
        } else {
            errors.push(RegistrationError::DuplicateTagDeclaration {
                name: name.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(accepted)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TagDescriptor, TagPlan};

    #[test]
    fn test_mixed_declarations_without_version() {
        let declarations = vec![
            Declaration::from("tag-1"),
            TagDescriptor::new("tag-2")
                .with_enabled(false)
                .with_plan(TagPlan::new(false))
                .into(),
            TagDescriptor::new("tag-3").into(),
        ];
        let names = resolve_declarations(&declarations, None, &[]).unwrap();
        assert_eq!(names, vec!["tag-1", "tag-3"]);
    }

    #[test]
    fn test_existing_names_are_duplicates() {
        let declared = vec!["tag-1".to_string()];
        let errors = resolve_declarations(&["tag-1".into()], None, &declared).unwrap_err();
        assert_eq!(
            errors,
            vec![RegistrationError::DuplicateTagDeclaration {
                name: "tag-1".to_string()
            }]
        );
    }

    #[test]
    fn test_disabled_descriptor_does_not_count_as_duplicate() {
        let declarations = vec![
            TagDescriptor::new("feature-13")
                .with_plan(
                    TagPlan::new(true)
                        .with_min_bound("0.1.2")
                        .with_max_bound("0.1.6"),
                )
                .into(),
            Declaration::from("feature-13"),
        ];
        let names = resolve_declarations(&declarations, Some("0.1.7"), &[]).unwrap();
        assert_eq!(names, vec!["feature-13"]);
    }

    #[test]
    fn test_invalid_items_reported_before_duplicates() {
        let declarations = vec![
            Declaration::from("a"),
            Declaration::Invalid(toml::Value::Integer(7)),
            Declaration::from("a"),
            Declaration::Invalid(toml::Value::Boolean(false)),
        ];
        let errors = resolve_declarations(&declarations, None, &[]).unwrap_err();
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "descriptor#1 [7] has invalid type (integer), must be a string or TagDescriptor type",
                "descriptor#3 [false] has invalid type (boolean), must be a string or TagDescriptor type",
                "Tag [a] is declared more than one time",
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(resolve_declarations(&[], Some("1.0.0"), &[]).unwrap(), Vec::<String>::new());
    }
}
