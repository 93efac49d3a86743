//! Tag name validation and inline hashtag extraction.
//!
//! Tag names are case-sensitive: `Foo` and `foo` are two distinct tags.
//! The allowed charset is shared between validation and extraction so a
//! name that can be extracted can always be stored.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::MAX_TAG_NAME_CHARS;
use crate::error::{Error, ErrorCode, Result};
use crate::traits::TagExtractor;

/// Character class matching the tag charset, kept in sync with
/// [`is_tag_char`]: ASCII alphanumerics, hyphen, underscore, hiragana,
/// katakana, and CJK unified ideographs (incl. extension A).
const TAG_CHAR_CLASS: &str =
    r"0-9A-Za-z_\-\x{3040}-\x{30FF}\x{3400}-\x{4DBF}\x{4E00}-\x{9FFF}";

/// Whether a character is allowed in a tag name.
pub fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '-'
        || c == '_'
        || ('\u{3040}'..='\u{30FF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Validate a tag name.
///
/// Rules:
/// - 1 to 100 characters
/// - characters from the tag charset only; in particular, no whitespace
pub fn validate_tag_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation(
            ErrorCode::TagNameEmpty,
            "tag name cannot be empty",
        ));
    }
    if name.chars().count() > MAX_TAG_NAME_CHARS {
        return Err(Error::validation(
            ErrorCode::TagNameTooLong,
            format!("tag name must be {MAX_TAG_NAME_CHARS} characters or less"),
        ));
    }

    let invalid: Vec<char> = name.chars().filter(|c| !is_tag_char(*c)).collect();
    if !invalid.is_empty() {
        let display: String = invalid
            .iter()
            .take(5)
            .map(|c| format!("'{c}'"))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::validation(
            ErrorCode::TagNameInvalidChars,
            format!("tag name contains invalid characters: {display}"),
        ));
    }

    Ok(())
}

static HASHTAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "(?:^|[^{TAG_CHAR_CLASS}])#([{TAG_CHAR_CLASS}]+)"
    ))
    .expect("hashtag pattern is valid")
});

/// Production tag extractor: hashtags are `#` followed by one or more tag
/// charset characters.
///
/// Results are deduplicated case-sensitively (`#Foo #foo` yields two tags)
/// and sorted for deterministic output. Content without tags yields an
/// empty list, never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashtagExtractor;

impl HashtagExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TagExtractor for HashtagExtractor {
    fn extract(&self, text: &str) -> Result<Vec<String>> {
        let mut tags = HashSet::new();
        for cap in HASHTAG_PATTERN.captures_iter(text) {
            if let Some(tag) = cap.get(1) {
                tags.insert(tag.as_str().to_string());
            }
        }

        let mut result: Vec<String> = tags.into_iter().collect();
        result.sort();
        Ok(result)
    }
}

static HASHTAG_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("#[{TAG_CHAR_CLASS}]+")).expect("hashtag token is valid"));

/// Remove hashtag tokens from text, collapsing the whitespace they leave
/// behind. Used when deriving titles and export file names.
pub fn strip_hashtags(text: &str) -> String {
    let stripped = HASHTAG_TOKEN.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<String> {
        HashtagExtractor::new().extract(text).unwrap()
    }

    #[test]
    fn test_validate_accepts_basic_names() {
        for name in ["rust", "multi-word", "snake_case", "abc123", "日本語", "カタカナ"] {
            assert!(validate_tag_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = validate_tag_name("").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TagNameEmpty));
    }

    #[test]
    fn test_validate_rejects_too_long() {
        let name = "a".repeat(MAX_TAG_NAME_CHARS + 1);
        let err = validate_tag_name(&name).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TagNameTooLong));

        let name = "a".repeat(MAX_TAG_NAME_CHARS);
        assert!(validate_tag_name(&name).is_ok());
    }

    #[test]
    fn test_validate_rejects_whitespace_and_symbols() {
        for name in ["has space", "tab\there", "semi;colon", "slash/y", "hash#tag"] {
            let err = validate_tag_name(name).unwrap_err();
            assert_eq!(err.code(), Some(ErrorCode::TagNameInvalidChars), "{name}");
        }
    }

    #[test]
    fn test_extract_basic() {
        let tags = extract("notes on #rust and #async-io");
        assert_eq!(tags, vec!["async-io", "rust"]);
    }

    #[test]
    fn test_extract_is_case_sensitive() {
        let tags = extract("#Foo #foo #Foo");
        assert_eq!(tags, vec!["Foo", "foo"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "#b #a #b some text #c";
        assert_eq!(extract(text), extract(text));
        assert_eq!(extract(text), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_extract_cjk() {
        let tags = extract("メモ #日本語 と #かな");
        assert_eq!(tags, vec!["かな", "日本語"]);
    }

    #[test]
    fn test_extract_no_tags_is_empty_not_error() {
        assert!(extract("plain text, no tags here").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extract_stops_at_disallowed_chars() {
        let tags = extract("#semi;rest #dot.split");
        assert_eq!(tags, vec!["dot", "semi"]);
    }

    #[test]
    fn test_extract_requires_boundary_before_hash() {
        // An embedded hash inside a word is not a tag.
        assert!(extract("foo#bar").is_empty());
    }

    #[test]
    fn test_strip_hashtags() {
        assert_eq!(strip_hashtags("meeting notes #work #urgent"), "meeting notes");
        assert_eq!(strip_hashtags("#only-tags"), "");
        assert_eq!(strip_hashtags("no tags at all"), "no tags at all");
    }
}
