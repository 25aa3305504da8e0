//! Shared types used across the content pipeline.
//!
//! A [`Post`] is produced by the [`store`](crate::store), ordered by the
//! [`index`](crate::index), rendered by [`render`](crate::render), and the
//! resulting [`Heading`]s feed the [`toc`](crate::toc) navigator.

use crate::naming::display_title;
use serde::{Deserialize, Serialize};

/// Category assigned to posts whose front matter names none.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// One markdown file with front matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// URL slug: the filename stem. Unique within a collection.
    pub slug: String,
    /// Decoded front matter with defaults applied.
    pub meta: PostMeta,
    /// Raw markdown body, front matter removed. Parsed lazily by the renderer.
    pub markdown: String,
    /// Source path relative to the content root (for display only).
    pub source: String,
}

/// Structured front matter.
///
/// `date` is kept as written; the index parses it when ordering so a bad
/// date never fails the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub category: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub image_fit: ImageFit,
    pub thumbnail_fit: ImageFit,
}

impl PostMeta {
    /// Metadata for a post whose front matter is absent or unreadable.
    ///
    /// The title falls back to the slug with dashes turned into spaces.
    pub fn defaults_for(slug: &str) -> Self {
        Self {
            title: display_title(slug),
            date: String::new(),
            excerpt: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            image: None,
            thumbnail: None,
            image_fit: ImageFit::default(),
            thumbnail_fit: ImageFit::default(),
        }
    }
}

/// How a cover image fills its frame (maps to CSS `object-fit`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    #[default]
    Cover,
    Contain,
}

impl ImageFit {
    pub fn as_css(self) -> &'static str {
        match self {
            ImageFit::Cover => "cover",
            ImageFit::Contain => "contain",
        }
    }
}

/// A heading extracted from rendered content, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Unique within one rendered document; used as the URL fragment.
    pub id: String,
    pub text: String,
    pub level: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_title_from_slug() {
        let meta = PostMeta::defaults_for("hello-rust-world");
        assert_eq!(meta.title, "hello rust world");
        assert_eq!(meta.category, "Uncategorized");
        assert!(meta.tags.is_empty());
        assert_eq!(meta.image_fit, ImageFit::Cover);
        assert_eq!(meta.thumbnail_fit, ImageFit::Cover);
    }

    #[test]
    fn image_fit_css_values() {
        assert_eq!(ImageFit::Cover.as_css(), "cover");
        assert_eq!(ImageFit::Contain.as_css(), "contain");
    }
}
