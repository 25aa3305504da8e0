//! Shared test utilities for the folio test suite.
//!
//! Provides fixture setup, post builders, and lookup helpers that panic with
//! the available names on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let posts = ContentStore::new(tmp.path().join("posts")).list_posts().unwrap();
//!
//! let hello = find_post(&posts, "hello-world");
//! assert_eq!(hello.meta.category, "Notes");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::types::{Post, PostMeta};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a post file with a YAML front matter block.
///
/// `front` is the text between the fences, without them.
pub fn write_post(dir: &Path, filename: &str, front: &str, body: &str) {
    let content = format!("---\n{front}\n---\n{body}");
    std::fs::write(dir.join(filename), content).unwrap();
}

// =========================================================================
// Post builders
// =========================================================================

/// In-memory post with defaults and the given date string.
pub fn post_dated(slug: &str, date: &str) -> Post {
    let mut meta = PostMeta::defaults_for(slug);
    meta.date = date.to_string();
    Post {
        slug: slug.to_string(),
        meta,
        markdown: String::new(),
        source: format!("{slug}.md"),
    }
}

// =========================================================================
// Lookups, panicking with a clear message on miss
// =========================================================================

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(posts: &'a [Post], slug: &str) -> &'a Post {
    posts.iter().find(|p| p.slug == slug).unwrap_or_else(|| {
        let available = slugs(posts);
        panic!("post '{slug}' not found. Available: {available:?}")
    })
}

/// All slugs in order.
pub fn slugs(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.slug.as_str()).collect()
}
