//! Front matter splitting and decoding.
//!
//! A content file starts with an optional metadata block fenced by `---`
//! (YAML) or `+++` (TOML), followed by the markdown body:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-03-01
//! tags: [rust, web]
//! ---
//! Body text...
//! ```
//!
//! Decoding is lenient. Each field is read on its own, so one mistyped value
//! only loses that value. A block that does not parse at all (or is not a
//! key/value mapping) yields defaults for every field; the problem is
//! returned alongside so the caller can log it with the file path.

use crate::types::{ImageFit, PostMeta};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("front matter is not a key/value mapping")]
    NotAMapping,
}

/// A fenced metadata block, still unparsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    Yaml(&'a str),
    Toml(&'a str),
}

/// Result of reading one content file.
#[derive(Debug)]
pub struct ParsedSource {
    pub meta: PostMeta,
    pub body: String,
    /// Set when a metadata block was present but could not be decoded.
    pub problem: Option<FrontMatterError>,
}

/// Split `source` into its metadata block and body.
///
/// The opening fence must be the first line. Without a matching closing
/// fence the whole input is treated as body.
pub fn split(source: &str) -> (Option<Block<'_>>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some((first, rest)) = source.split_once('\n') else {
        return (None, source);
    };
    let fence = first.trim_end();
    let is_toml = match fence {
        "---" => false,
        "+++" => true,
        _ => return (None, source),
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == fence {
            let text = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let block = if is_toml {
                Block::Toml(text)
            } else {
                Block::Yaml(text)
            };
            return (Some(block), body.trim_start_matches(['\r', '\n']));
        }
        offset += line.len();
    }
    (None, source)
}

/// Decode a content file into metadata and body for the post `slug`.
pub fn parse(slug: &str, source: &str) -> ParsedSource {
    let (block, body) = split(source);
    let (fields, problem) = match block.map(decode_block) {
        Some(Ok(fields)) => (fields, None),
        Some(Err(err)) => (Map::new(), Some(err)),
        None => (Map::new(), None),
    };
    ParsedSource {
        meta: meta_from_fields(slug, &fields),
        body: body.to_string(),
        problem,
    }
}

fn decode_block(block: Block<'_>) -> Result<Map<String, Value>, FrontMatterError> {
    let value = match block {
        Block::Yaml(text) if text.trim().is_empty() => return Ok(Map::new()),
        Block::Yaml(text) => serde_yaml::from_str::<Value>(text)?,
        Block::Toml(text) => toml_to_json(toml::from_str::<toml::Value>(text)?),
    };
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(FrontMatterError::NotAMapping),
    }
}

/// TOML datetimes become their string form so `date` reads the same way
/// regardless of front matter flavour.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn meta_from_fields(slug: &str, fields: &Map<String, Value>) -> PostMeta {
    let defaults = PostMeta::defaults_for(slug);
    PostMeta {
        title: text_field(fields, &["title"])
            .filter(|t| !t.is_empty())
            .unwrap_or(defaults.title),
        date: text_field(fields, &["date"]).unwrap_or(defaults.date),
        excerpt: text_field(fields, &["excerpt"]).unwrap_or(defaults.excerpt),
        category: text_field(fields, &["category"])
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.category),
        tags: tags_field(fields).unwrap_or(defaults.tags),
        image: text_field(fields, &["image"]).filter(|s| !s.is_empty()),
        thumbnail: text_field(fields, &["thumbnail"]).filter(|s| !s.is_empty()),
        image_fit: fit_field(fields, &["imageFit", "image_fit"]).unwrap_or(defaults.image_fit),
        thumbnail_fit: fit_field(fields, &["thumbnailFit", "thumbnail_fit"])
            .unwrap_or(defaults.thumbnail_fit),
    }
}

fn lookup<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| fields.get(*k))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    lookup(fields, keys).and_then(scalar_text)
}

/// Tags accept a list or a single string (one tag).
fn tags_field(fields: &Map<String, Value>) -> Option<Vec<String>> {
    match lookup(fields, &["tags"])? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .filter(|t| !t.is_empty())
                .collect(),
        ),
        Value::Null => Some(Vec::new()),
        other => scalar_text(other).map(|t| vec![t]),
    }
}

fn fit_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<ImageFit> {
    let raw = text_field(fields, keys)?;
    match raw.to_ascii_lowercase().as_str() {
        "cover" => Some(ImageFit::Cover),
        "contain" => Some(ImageFit::Contain),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // split()
    // =========================================================================

    #[test]
    fn split_yaml_block() {
        let (block, body) = split("---\ntitle: Hi\n---\nBody\n");
        assert_eq!(block, Some(Block::Yaml("title: Hi\n")));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn split_toml_block() {
        let (block, body) = split("+++\ntitle = \"Hi\"\n+++\n\nBody");
        assert_eq!(block, Some(Block::Toml("title = \"Hi\"\n")));
        assert_eq!(body, "Body");
    }

    #[test]
    fn split_without_front_matter() {
        let (block, body) = split("# Just markdown\n");
        assert_eq!(block, None);
        assert_eq!(body, "# Just markdown\n");
    }

    #[test]
    fn split_unclosed_fence_is_all_body() {
        let source = "---\ntitle: Hi\nno closing fence\n";
        let (block, body) = split(source);
        assert_eq!(block, None);
        assert_eq!(body, source);
    }

    #[test]
    fn split_handles_crlf_and_bom() {
        let (block, body) = split("\u{feff}---\r\ntitle: Hi\r\n---\r\nBody");
        assert_eq!(block, Some(Block::Yaml("title: Hi\r\n")));
        assert_eq!(body, "Body");
    }

    #[test]
    fn split_ignores_horizontal_rule_later_in_body() {
        let (block, body) = split("Intro\n\n---\n\nMore");
        assert_eq!(block, None);
        assert!(body.starts_with("Intro"));
    }

    // =========================================================================
    // parse()
    // =========================================================================

    #[test]
    fn parse_full_yaml_meta() {
        let src = "---\n\
title: Hello World\n\
date: 2024-03-01\n\
excerpt: A short intro\n\
category: Rust\n\
tags: [async, tokio]\n\
image: /img/cover.png\n\
imageFit: contain\n\
---\n\
Body";
        let parsed = parse("hello-world", src);
        assert!(parsed.problem.is_none());
        let meta = parsed.meta;
        assert_eq!(meta.title, "Hello World");
        assert_eq!(meta.date, "2024-03-01");
        assert_eq!(meta.excerpt, "A short intro");
        assert_eq!(meta.category, "Rust");
        assert_eq!(meta.tags, vec!["async", "tokio"]);
        assert_eq!(meta.image.as_deref(), Some("/img/cover.png"));
        assert_eq!(meta.image_fit, ImageFit::Contain);
        assert_eq!(meta.thumbnail_fit, ImageFit::Cover);
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn missing_category_defaults_to_uncategorized() {
        let parsed = parse("p", "---\ntitle: T\n---\nBody");
        assert_eq!(parsed.meta.category, "Uncategorized");
        assert!(parsed.meta.tags.is_empty());
    }

    #[test]
    fn toml_dates_become_strings() {
        let src = "+++\ntitle = \"T\"\ndate = 2023-12-24\ntags = [\"a\"]\n+++\nBody";
        let parsed = parse("p", src);
        assert!(parsed.problem.is_none());
        assert_eq!(parsed.meta.date, "2023-12-24");
        assert_eq!(parsed.meta.tags, vec!["a"]);
    }

    #[test]
    fn malformed_yaml_falls_back_to_defaults() {
        let parsed = parse("broken-post", "---\ntitle: [unclosed\n---\nBody");
        assert!(matches!(parsed.problem, Some(FrontMatterError::Yaml(_))));
        assert_eq!(parsed.meta, PostMeta::defaults_for("broken-post"));
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn non_mapping_block_falls_back_to_defaults() {
        let parsed = parse("p", "---\n- just\n- a list\n---\nBody");
        assert!(matches!(parsed.problem, Some(FrontMatterError::NotAMapping)));
        assert_eq!(parsed.meta.title, "p");
    }

    #[test]
    fn mistyped_field_only_loses_that_field() {
        let parsed = parse("p", "---\ntitle: Kept\ncategory: {nested: map}\n---\n");
        assert!(parsed.problem.is_none());
        assert_eq!(parsed.meta.title, "Kept");
        assert_eq!(parsed.meta.category, "Uncategorized");
    }

    #[test]
    fn single_string_tag_becomes_list() {
        let parsed = parse("p", "---\ntags: rust\n---\n");
        assert_eq!(parsed.meta.tags, vec!["rust"]);
    }

    #[test]
    fn snake_case_fit_keys_accepted() {
        let parsed = parse("p", "---\nthumbnail_fit: Contain\n---\n");
        assert_eq!(parsed.meta.thumbnail_fit, ImageFit::Contain);
    }

    #[test]
    fn unknown_fit_value_uses_default() {
        let parsed = parse("p", "---\nimageFit: stretch\n---\n");
        assert_eq!(parsed.meta.image_fit, ImageFit::Cover);
    }

    #[test]
    fn empty_block_is_not_a_problem() {
        let parsed = parse("p", "---\n---\nBody");
        assert!(parsed.problem.is_none());
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn numeric_values_read_as_text() {
        let parsed = parse("p", "---\ntitle: 1999\n---\n");
        assert_eq!(parsed.meta.title, "1999");
    }
}
