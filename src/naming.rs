//! Slug generation for headings, categories, and filenames.
//!
//! Headings need ids that survive as URL fragments and are unique within a
//! single document. [`slugify`] turns display text into a fragment-safe
//! token; [`Slugger`] hands out unique ids, appending `-1`, `-2`, ... on
//! collision.
//!
//! ```text
//! "Getting Started"   → getting-started
//! "What's new?"       → whats-new
//! "Overview" (twice)  → overview, overview-1
//! ```

use std::collections::HashSet;
use std::path::Path;

/// Fallback id for headings whose text has no letters or digits.
const EMPTY_SLUG: &str = "section";

/// Fallback URL segment for category names without letters or digits.
const EMPTY_CATEGORY_SLUG: &str = "category";

/// Convert display text into a lowercase, dash-separated slug.
///
/// - Letters and digits (any script) are kept and lowercased
/// - Whitespace and dashes become a single dash
/// - Other punctuation is dropped
/// - Leading and trailing dashes never appear
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }
    slug
}

/// Display title for a slug: dashes become spaces.
///
/// `who-am-i` → `who am i`
pub fn display_title(slug: &str) -> String {
    slug.replace('-', " ")
}

/// Base URL segment for a category name, before uniqueness is applied.
pub fn category_slug(category: &str) -> String {
    let slug = slugify(category);
    if slug.is_empty() {
        EMPTY_CATEGORY_SLUG.to_string()
    } else {
        slug
    }
}

/// Slug for a content file: its filename stem, unchanged.
pub fn file_slug(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// Hands out ids that are unique within one document.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashSet<String>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `text` and make the result unique.
    pub fn slug(&mut self, text: &str) -> String {
        self.claim(&slugify(text))
    }

    /// Reserve `base` as-is, or the first free `base-N` if it is taken.
    pub fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() { EMPTY_SLUG } else { base };
        if self.seen.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}-{n}");
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes_spaces() {
        assert_eq!(slugify("Getting Started"), "getting-started");
    }

    #[test]
    fn slugify_drops_punctuation() {
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("C++ tips & tricks"), "c-tips-tricks");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("--edge--"), "edge");
    }

    #[test]
    fn slugify_keeps_unicode_letters() {
        assert_eq!(slugify("Café Olé"), "café-olé");
        assert_eq!(slugify("日本語"), "日本語");
    }

    #[test]
    fn slugify_keeps_underscores_and_digits() {
        assert_eq!(slugify("step_2 of 10"), "step_2-of-10");
    }

    #[test]
    fn slugify_empty_for_symbols_only() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugger_disambiguates_repeats() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Overview"), "overview");
        assert_eq!(slugger.slug("Overview"), "overview-1");
        assert_eq!(slugger.slug("Overview"), "overview-2");
    }

    #[test]
    fn slugger_skips_suffixes_already_taken() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Overview 1"), "overview-1");
        assert_eq!(slugger.slug("Overview"), "overview");
        assert_eq!(slugger.slug("Overview"), "overview-2");
    }

    #[test]
    fn slugger_names_empty_headings() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("???"), "section");
        assert_eq!(slugger.slug(""), "section-1");
    }

    #[test]
    fn category_slug_falls_back() {
        assert_eq!(category_slug("Open Source"), "open-source");
        assert_eq!(category_slug("???"), "category");
    }

    #[test]
    fn display_title_replaces_dashes() {
        assert_eq!(display_title("who-am-i"), "who am i");
    }

    #[test]
    fn file_slug_is_stem() {
        assert_eq!(
            file_slug(Path::new("posts/2024/hello-world.md")),
            Some("hello-world".to_string())
        );
        assert_eq!(file_slug(Path::new("")), None);
    }
}
