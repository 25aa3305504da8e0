//! Content checks behind `folio check`.
//!
//! Loads and renders every post the way `build` does, without writing
//! anything, and collects what a reader of the generated site would trip
//! over. Hard failures (unreadable files, duplicate slugs) are errors from
//! the store; everything else becomes a [`Problem`].

use crate::config::SiteConfig;
use crate::generate::load_collections;
use crate::index::{CategoryCount, parse_date};
use crate::render::{ContentBlock, Renderer};
use crate::store::{ContentStore, StoreError};
use crate::types::Post;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// Something wrong with one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub severity: Severity,
    pub collection: String,
    /// Source path relative to the collection directory.
    pub source: String,
    pub message: String,
}

/// Inventory of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionReport {
    pub name: String,
    pub title: String,
    pub dir: String,
    pub posts: usize,
    pub undated: usize,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub collections: Vec<CollectionReport>,
    pub problems: Vec<Problem>,
}

impl CheckReport {
    pub fn post_count(&self) -> usize {
        self.collections.iter().map(|c| c.posts).sum()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.problems.iter().filter(|p| p.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

/// Load and render everything under `source`.
pub fn check(source: &Path, config: &SiteConfig) -> Result<CheckReport, StoreError> {
    let collections = load_collections(source, config)?;
    let renderer = Renderer::from_config(&config.render);
    let mut reports = Vec::new();
    let mut problems = Vec::new();

    for collection in &collections {
        let name = collection.name().to_string();
        let store = ContentStore::for_collection(source, &collection.config, &config.content);
        for (file, message) in store.front_matter_problems()? {
            problems.push(Problem {
                severity: Severity::Error,
                collection: name.clone(),
                source: file,
                message,
            });
        }

        let mut undated = 0;
        for post in collection.index.posts() {
            if parse_date(&post.meta.date).is_none() {
                undated += 1;
            }
            for message in post_problems(post, &renderer, config) {
                problems.push(Problem {
                    severity: Severity::Warning,
                    collection: name.clone(),
                    source: post.source.clone(),
                    message,
                });
            }
        }

        reports.push(CollectionReport {
            name: name.clone(),
            title: collection.config.display_title().to_string(),
            dir: collection.config.dir.clone(),
            posts: collection.index.len(),
            undated,
            categories: collection.index.categories(),
        });
        debug!(collection = %name, posts = collection.index.len(), "Checked collection");
    }

    problems.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.collection.cmp(&b.collection))
            .then_with(|| a.source.cmp(&b.source))
    });
    Ok(CheckReport {
        collections: reports,
        problems,
    })
}

fn post_problems(post: &Post, renderer: &Renderer, config: &SiteConfig) -> Vec<String> {
    let mut messages = Vec::new();
    let date = post.meta.date.trim();
    if !date.is_empty() && parse_date(date).is_none() {
        messages.push(format!("unrecognized date '{date}'; listed as undated"));
    }

    let rendered = renderer.render(&post.markdown);
    let is_diagram = |language: &str| {
        config
            .render
            .diagram_languages
            .iter()
            .any(|d| d.eq_ignore_ascii_case(language))
    };
    visit_blocks(&rendered.blocks, &mut |block| {
        if let ContentBlock::Code {
            language: Some(language),
            highlighted: None,
            ..
        } = block
        {
            if is_diagram(language) {
                messages.push(format!("{language} diagram failed to render; shown as code"));
            } else if config.render.highlight {
                messages.push(format!("no syntax highlighting for '{language}'"));
            }
        }
    });
    messages
}

fn visit_blocks(blocks: &[ContentBlock], f: &mut impl FnMut(&ContentBlock)) {
    for block in blocks {
        f(block);
        match block {
            ContentBlock::Quote(inner) => visit_blocks(inner, f),
            ContentBlock::List { items, .. } => {
                for item in items {
                    visit_blocks(&item.blocks, f);
                }
            }
            ContentBlock::Notes(notes) => {
                for note in notes {
                    visit_blocks(&note.blocks, f);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn fixtures_report_broken_front_matter() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        let report = check(tmp.path(), &config).unwrap();

        assert_eq!(report.post_count(), 9);
        assert!(report.has_errors());
        let first = &report.problems[0];
        assert_eq!(first.severity, Severity::Error);
        assert_eq!(first.collection, "writing");
        assert_eq!(first.source, "broken-front-matter.md");
    }

    #[test]
    fn counts_undated_posts() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        let report = check(tmp.path(), &config).unwrap();
        let writing = &report.collections[0];
        assert_eq!(writing.name, "writing");
        // undated-thoughts plus the post whose front matter is unreadable
        assert_eq!(writing.undated, 2);
        assert_eq!(report.collections[1].undated, 0);
    }

    #[test]
    fn bad_date_is_warning() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        std::fs::create_dir_all(&posts).unwrap();
        write_post(&posts, "odd.md", "title: Odd\ndate: sometime in May", "Body");

        let report = check(tmp.path(), &SiteConfig::default()).unwrap();
        assert!(!report.has_errors());
        assert_eq!(report.count(Severity::Warning), 1);
        assert!(report.problems[0].message.contains("sometime in May"));
    }

    #[test]
    fn unknown_highlight_language_is_warning() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        std::fs::create_dir_all(&posts).unwrap();
        write_post(
            &posts,
            "code.md",
            "title: Code\ndate: 2024-01-01",
            "```no-such-language-xyz\nbody\n```\n",
        );

        let report = check(tmp.path(), &SiteConfig::default()).unwrap();
        assert_eq!(report.problems.len(), 1);
        assert!(report.problems[0].message.contains("no-such-language-xyz"));
    }

    #[test]
    fn clean_content_has_no_problems() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        std::fs::create_dir_all(&posts).unwrap();
        write_post(&posts, "fine.md", "title: Fine\ndate: 2024-01-01", "## Hello\n\nText.");

        let report = check(tmp.path(), &SiteConfig::default()).unwrap();
        assert!(report.problems.is_empty());
        assert_eq!(report.post_count(), 1);
    }
}
