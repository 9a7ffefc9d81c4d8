//! Heading slugs and unique anchor ids.

use std::collections::HashSet;

/// Id used when a heading's text produces an empty slug.
pub const FALLBACK_ID: &str = "section";

/// Turns heading text into an anchor slug.
///
/// The text is transliterated to ASCII, lowercased, stripped of anything that
/// is not a word character, whitespace or `-`, and runs of whitespace and
/// dashes collapse into a single `-`. Leading and trailing separators are
/// dropped.
///
/// ```rust
/// use laminate_markdown::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("Blåbær  -- syltetøy"), "blabaer-syltetoy");
/// ```
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    slug
}

/// Hands out heading ids that are unique within one conversion.
///
/// A repeated id gets a numeric suffix: `intro`, `intro_1`, `intro_2`.
#[derive(Debug, Default)]
pub struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `candidate`, or the first free suffixed variant of it.
    pub fn unique(&mut self, candidate: &str) -> String {
        let base = if candidate.is_empty() {
            FALLBACK_ID
        } else {
            candidate
        };

        let mut id = base.to_string();
        let mut n = 1;
        while self.used.contains(&id) {
            id = format!("{}_{}", base, n);
            n += 1;
        }
        self.used.insert(id.clone());
        id
    }

    /// Marks an explicitly assigned id as taken without altering it.
    pub fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  padded  "), "padded");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn test_slugify_drops_punctuation() {
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_unique_appends_counter() {
        let mut ids = HeadingIds::new();
        assert_eq!(ids.unique("intro"), "intro");
        assert_eq!(ids.unique("intro"), "intro_1");
        assert_eq!(ids.unique("intro"), "intro_2");
        assert_eq!(ids.unique("other"), "other");
    }

    #[test]
    fn test_empty_candidate_uses_fallback() {
        let mut ids = HeadingIds::new();
        assert_eq!(ids.unique(""), "section");
        assert_eq!(ids.unique(""), "section_1");
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let mut ids = HeadingIds::new();
        ids.reserve("custom");
        assert_eq!(ids.unique("custom"), "custom_1");
    }

    proptest! {
        #[test]
        fn slug_uses_only_anchor_safe_chars(text in "\\PC{0,40}") {
            let slug = slugify(&text);
            prop_assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
        }

        #[test]
        fn unique_ids_never_repeat(names in proptest::collection::vec("[a-c_]{0,3}", 0..30)) {
            let mut ids = HeadingIds::new();
            let mut seen = HashSet::new();
            for name in &names {
                prop_assert!(seen.insert(ids.unique(name)));
            }
        }
    }
}
