//! Label normalization for namespaces and override keys

use regex::Regex;
use std::sync::OnceLock;

/// Runs of characters outside `[0-9A-Za-z_]`
fn non_word_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[^0-9A-Za-z_]+").unwrap())
}

/// Normalize a label: trim, collapse non-word runs to `_`, uppercase
///
/// # Examples
///
/// ```
/// use codetags::domain::labelify;
///
/// assert_eq!(labelify("Hello  world"), "HELLO_WORLD");
/// assert_eq!(labelify("user@example.com"), "USER_EXAMPLE_COM");
/// ```
pub fn labelify(label: &str) -> String {
    non_word_regex()
        .replace_all(label.trim(), "_")
        .to_ascii_uppercase()
}
