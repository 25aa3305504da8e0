//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (collection, post, page) is its semantic identity:
//! title and positional index. Filesystem paths are secondary context on
//! indented `Source:` lines, so the output reads as a content inventory
//! while still tracing back to specific files.
//!
//! # Entity Display Contract
//!
//! 1. **Header line**: positional index + title (+ optional count)
//! 2. **Context lines**: indented `Source:`, dates, categories, etc.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Writing (6 posts)
//! 001 Inside the Rendering Pipeline
//!     2024-05-10 · Engineering · 1 min
//!     Source: rendering-pipeline.md
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Writing → writing/index.html
//!     001 Inside the Rendering Pipeline → writing/rendering-pipeline/index.html
//!     Category Notes → writing/category/notes/index.html
//!
//! Generated 2 collections, 9 posts, 5 category pages
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::check::{CheckReport, Severity};
use crate::config::CollectionConfig;
use crate::generate::{BuildSummary, Collection, PageKind, display_date, post_url};
use crate::index::{NavigationContext, NavigationPolicy, post_date};
use crate::render::{reading_time_from_body, reading_time_from_excerpt};
use crate::toc::TocEntry;
use crate::types::Post;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 post`, `3 posts`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 001 Writing (6 posts)
/// 001 Hello, World
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "post")),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Short date for listings: `2024-05-10`, or `undated`.
fn short_date(post: &Post) -> String {
    post_date(post)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "undated".to_string())
}

// ============================================================================
// list
// ============================================================================

/// Format every collection's posts in date order.
pub fn format_list(collections: &[Collection]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, collection) in collections.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!(
            "{} ({})",
            collection.config.display_title(),
            plural(collection.index.len(), "post")
        ));
        for (pos, post) in collection.index.posts().iter().enumerate() {
            lines.push(entity_header(pos + 1, &post.meta.title, None));
            lines.push(format!(
                "{}{} · {} · {} min",
                indent(1),
                short_date(post),
                post.meta.category,
                reading_time_from_excerpt(&post.meta.excerpt)
            ));
            if !post.meta.excerpt.is_empty() {
                lines.push(format!("{}{}", indent(1), truncate(&post.meta.excerpt, 60)));
            }
            lines.push(format!("{}Source: {}", indent(1), post.source));
        }
    }
    lines
}

pub fn print_list(collections: &[Collection]) {
    for line in format_list(collections) {
        println!("{}", line);
    }
}

// ============================================================================
// show
// ============================================================================

/// Format one post: metadata, reading time, neighbours, and TOC.
pub fn format_show(
    collection: &CollectionConfig,
    post: &Post,
    nav: Option<&NavigationContext>,
    toc: &[TocEntry],
) -> Vec<String> {
    let meta = &post.meta;
    let mut lines = vec![meta.title.clone()];
    lines.push(format!("{}Slug: {}", indent(1), post.slug));
    lines.push(format!("{}Collection: {}", indent(1), collection.name));
    lines.push(format!(
        "{}Date: {}",
        indent(1),
        display_date(post).unwrap_or_else(|| "undated".to_string())
    ));
    lines.push(format!("{}Category: {}", indent(1), meta.category));
    if !meta.tags.is_empty() {
        lines.push(format!("{}Tags: {}", indent(1), meta.tags.join(", ")));
    }
    if !meta.excerpt.is_empty() {
        lines.push(format!("{}Excerpt: {}", indent(1), meta.excerpt));
    }
    lines.push(format!(
        "{}Reading time: {} min (listing estimate {} min)",
        indent(1),
        reading_time_from_body(&post.markdown),
        reading_time_from_excerpt(&meta.excerpt)
    ));
    if let Some(image) = &meta.image {
        lines.push(format!("{}Image: {} ({})", indent(1), image, meta.image_fit.as_css()));
    }
    if let Some(thumbnail) = &meta.thumbnail {
        lines.push(format!(
            "{}Thumbnail: {} ({})",
            indent(1),
            thumbnail,
            meta.thumbnail_fit.as_css()
        ));
    }
    lines.push(format!("{}URL: {}", indent(1), post_url(&collection.name, &post.slug)));
    lines.push(format!("{}Source: {}", indent(1), post.source));

    if let Some(nav) = nav {
        lines.push(String::new());
        lines.push(format!(
            "Navigation ({})",
            match collection.navigation {
                NavigationPolicy::Clamping => "clamping",
                NavigationPolicy::Wrapping => "wrapping",
            }
        ));
        for (label, neighbour) in [("Previous", nav.previous), ("Next", nav.next)] {
            match neighbour {
                Some(p) => lines.push(format!(
                    "{}{}: {} \u{2192} {}",
                    indent(1),
                    label,
                    p.meta.title,
                    post_url(&collection.name, &p.slug)
                )),
                None => lines.push(format!("{}{}: none", indent(1), label)),
            }
        }
    }

    if !toc.is_empty() {
        lines.push(String::new());
        lines.push("Contents".to_string());
        for (i, entry) in toc.iter().enumerate() {
            lines.push(format!(
                "{}{} (#{})",
                indent(1),
                entity_header(i + 1, &entry.text, None),
                entry.id
            ));
        }
    }
    lines
}

pub fn print_show(
    collection: &CollectionConfig,
    post: &Post,
    nav: Option<&NavigationContext>,
    toc: &[TocEntry],
) {
    for line in format_show(collection, post, nav, toc) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// Format the pages written by a build.
///
/// Information-first: each page leads with its title, followed by `→` and
/// the output path. Pages of a collection are indented under it.
pub fn format_build(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let mut collection_pos = 0;
    let mut post_pos = 0;

    for page in &summary.pages {
        match page.kind {
            PageKind::Home => lines.push(format!("Home \u{2192} {}", page.path)),
            PageKind::Collection => {
                collection_pos += 1;
                post_pos = 0;
                lines.push(format!(
                    "{} \u{2192} {}",
                    entity_header(collection_pos, &page.title, None),
                    page.path
                ));
            }
            PageKind::Data => {
                lines.push(format!("{}Data \u{2192} {}", indent(1), page.path));
            }
            PageKind::Category => {
                lines.push(format!(
                    "{}Category {} \u{2192} {}",
                    indent(1),
                    page.title,
                    page.path
                ));
            }
            PageKind::Post => {
                post_pos += 1;
                lines.push(format!(
                    "{}{} \u{2192} {}",
                    indent(1),
                    entity_header(post_pos, &page.title, None),
                    page.path
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(summary.count(PageKind::Collection), "collection"),
        plural(summary.count(PageKind::Post), "post"),
        plural(summary.count(PageKind::Category), "category page")
    ));
    lines.push(format!("Site written to {}", summary.output.display()));
    lines
}

pub fn print_build(summary: &BuildSummary) {
    for line in format_build(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Format the content inventory and any problems found.
pub fn format_check(report: &CheckReport) -> Vec<String> {
    let mut lines = vec!["Collections".to_string()];
    for (i, collection) in report.collections.iter().enumerate() {
        let mut header = entity_header(i + 1, &collection.title, Some(collection.posts));
        if collection.undated > 0 {
            header.pop();
            header.push_str(&format!(", {} undated)", collection.undated));
        }
        lines.push(header);
        lines.push(format!("{}Directory: {}/", indent(1), collection.dir));
        if !collection.categories.is_empty() {
            let categories: Vec<String> = collection
                .categories
                .iter()
                .map(|c| format!("{} ({})", c.name, c.count))
                .collect();
            lines.push(format!("{}Categories: {}", indent(1), categories.join(", ")));
        }
    }

    if !report.problems.is_empty() {
        lines.push(String::new());
        lines.push("Problems".to_string());
        for problem in &report.problems {
            let label = match problem.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            lines.push(format!(
                "{}{} {}/{}: {}",
                indent(1),
                label,
                problem.collection,
                problem.source,
                problem.message
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Checked {}: {}, {}",
        plural(report.post_count(), "post"),
        plural(report.count(Severity::Error), "error"),
        plural(report.count(Severity::Warning), "warning")
    ));
    lines
}

pub fn print_check(report: &CheckReport) {
    for line in format_check(report) {
        println!("{}", line);
    }
}
