//! Content store: markdown files on disk → [`Post`] records.
//!
//! Each collection (`writing`, `projects`, ...) is a directory under the
//! content root. Every file with a recognized extension becomes one post;
//! its filename stem is the slug.
//!
//! ```text
//! content/
//! ├── config.toml
//! ├── posts/                     # collection "writing"
//! │   ├── hello-world.md         # slug: hello-world
//! │   ├── 2023/
//! │   │   └── year-in-review.md  # subdirectories are walked; slug: year-in-review
//! │   └── .draft.md              # hidden: ignored
//! └── projects/                  # collection "projects"
//!     └── folio.md
//! ```
//!
//! ## Guarantees
//!
//! - Every call re-reads the source directory. With the parse cache enabled
//!   the bytes are still read and hashed; only decoding is skipped when they
//!   are unchanged, so edits on disk are visible on the next call.
//! - Slugs are unique. Two files that would share a slug (same stem under
//!   different subdirectories or extensions) fail the load with
//!   [`StoreError::DuplicateSlug`].
//! - [`ContentStore::list_posts`] returns posts in path order. Date ordering
//!   belongs to the [`index`](crate::index).
//! - A missing collection directory is an empty collection.

use crate::cache::{CacheStats, PostCache, hash_bytes};
use crate::config::{CollectionConfig, ContentConfig};
use crate::frontmatter;
use crate::naming::file_slug;
use crate::types::Post;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("post not found: {0}")]
    NotFound(String),
    #[error("duplicate slug '{slug}': {} and {}", .first.display(), .second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// File extensions treated as posts when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "markdown", "mdx"];

/// Reads one collection directory.
#[derive(Debug)]
pub struct ContentStore {
    root: PathBuf,
    extensions: Vec<String>,
    cache: Option<Mutex<PostCache>>,
}

impl ContentStore {
    /// Store over `root` with the default extensions and no cache.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            cache: None,
        }
    }

    /// Store for one configured collection under `content_root`.
    pub fn for_collection(
        content_root: &Path,
        collection: &CollectionConfig,
        content: &ContentConfig,
    ) -> Self {
        let store = Self::new(content_root.join(&collection.dir))
            .with_extensions(content.extensions.iter().cloned());
        if content.cache {
            store.with_cache()
        } else {
            store
        }
    }

    /// Replace the recognized extensions (compared case-insensitively).
    pub fn with_extensions(mut self, extensions: impl IntoIterator<Item = String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Reuse parses of unchanged files across calls.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(Mutex::new(PostCache::new()));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache totals so far, if the cache is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        let cache = self.cache.as_ref()?;
        cache.lock().ok().map(|c| *c.stats())
    }

    /// Load every post in the collection, in path order.
    pub fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let entries = self.indexed_files()?;
        let posts = entries
            .par_iter()
            .map(|(path, slug)| self.load(path, slug))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(cache) = &self.cache
            && let Ok(mut cache) = cache.lock()
        {
            let live: HashSet<PathBuf> = entries.into_iter().map(|(p, _)| p).collect();
            cache.retain(&live);
        }

        debug!(
            root = %self.root.display(),
            count = posts.len(),
            "Loaded posts"
        );
        Ok(posts)
    }

    /// Load the post whose slug is `slug`.
    ///
    /// Fails with [`StoreError::NotFound`] when no file has that slug; the
    /// caller decides how absence is presented.
    pub fn get_post(&self, slug: &str) -> Result<Post, StoreError> {
        let entries = self.indexed_files()?;
        let (path, slug) = entries
            .into_iter()
            .find(|(_, s)| s == slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        self.load(&path, &slug)
    }

    /// Files whose front matter block could not be decoded, as
    /// `(source, message)` pairs. Those posts still load with defaults.
    pub fn front_matter_problems(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut problems = Vec::new();
        for (path, slug) in self.indexed_files()? {
            let text = read_text(&path)?;
            if let Some(problem) = frontmatter::parse(&slug, &text).problem {
                problems.push((self.relative(&path), problem.to_string()));
            }
        }
        Ok(problems)
    }

    /// Content files paired with their slugs, checked for uniqueness.
    fn indexed_files(&self) -> Result<Vec<(PathBuf, String)>, StoreError> {
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut entries = Vec::new();
        for path in self.content_files()? {
            let Some(slug) = file_slug(&path) else {
                continue;
            };
            if let Some(first) = seen.get(&slug) {
                return Err(StoreError::DuplicateSlug {
                    slug,
                    first: first.clone(),
                    second: path,
                });
            }
            seen.insert(slug.clone(), path.clone());
            entries.push((path, slug));
        }
        Ok(entries)
    }

    fn content_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && self.is_content_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|known| *known == ext))
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn load(&self, path: &Path, slug: &str) -> Result<Post, StoreError> {
        let bytes = fs::read(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let source_hash = self.cache.as_ref().map(|_| hash_bytes(&bytes));
        if let (Some(cache), Some(hash)) = (&self.cache, &source_hash)
            && let Ok(mut cache) = cache.lock()
            && let Some(post) = cache.find(path, hash)
        {
            return Ok(post);
        }

        let text = String::from_utf8_lossy(&bytes);
        let parsed = frontmatter::parse(slug, &text);
        if let Some(problem) = &parsed.problem {
            warn!(
                path = %path.display(),
                error = %problem,
                "Malformed front matter; using defaults"
            );
        }

        let post = Post {
            slug: slug.to_string(),
            meta: parsed.meta,
            markdown: parsed.body,
            source: self.relative(path),
        };

        if let (Some(cache), Some(hash)) = (&self.cache, source_hash)
            && let Ok(mut cache) = cache.lock()
        {
            cache.insert(path.to_path_buf(), hash, post.clone());
        }
        Ok(post)
    }
}

fn read_text(path: &Path) -> Result<String, StoreError> {
    let bytes = fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn lists_fixture_posts() {
        let tmp = setup_fixtures();
        let store = ContentStore::new(tmp.path().join("posts"));
        let posts = store.list_posts().unwrap();
        assert!(posts.len() >= 5);
        let hello = find_post(&posts, "hello-world");
        assert_eq!(hello.meta.title, "Hello, World");
        assert_eq!(hello.meta.category, "Notes");
    }

    #[test]
    fn slug_is_filename_stem() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "my-first-post.md", "title: First", "Body");
        let posts = ContentStore::new(tmp.path()).list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["my-first-post"]);
    }

    #[test]
    fn ignores_unrecognized_extensions() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "title: A", "");
        write_post(tmp.path(), "b.markdown", "title: B", "");
        write_post(tmp.path(), "c.MDX", "title: C", "");
        std::fs::write(tmp.path().join("notes.txt"), "not a post").unwrap();
        std::fs::write(tmp.path().join("cover.png"), "binary").unwrap();

        let posts = ContentStore::new(tmp.path()).list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["a", "b", "c"]);
    }

    #[test]
    fn configured_extensions_replace_defaults() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "title: A", "");
        write_post(tmp.path(), "b.txt", "title: B", "");
        let store = ContentStore::new(tmp.path()).with_extensions(vec![".TXT".to_string()]);
        let posts = store.list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["b"]);
    }

    #[test]
    fn skips_hidden_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "visible.md", "title: V", "");
        write_post(tmp.path(), ".draft.md", "title: D", "");
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        write_post(&tmp.path().join(".git"), "inside.md", "title: G", "");

        let posts = ContentStore::new(tmp.path()).list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["visible"]);
    }

    #[test]
    fn walks_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let year = tmp.path().join("2023");
        std::fs::create_dir_all(&year).unwrap();
        write_post(&year, "review.md", "title: Review", "");
        let posts = ContentStore::new(tmp.path()).list_posts().unwrap();
        assert_eq!(posts[0].slug, "review");
        assert_eq!(posts[0].source, "2023/review.md");
    }

    #[test]
    fn duplicate_slug_is_error() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "same.md", "title: One", "");
        write_post(tmp.path(), "same.markdown", "title: Two", "");
        let result = ContentStore::new(tmp.path()).list_posts();
        assert!(matches!(
            result,
            Err(StoreError::DuplicateSlug { ref slug, .. }) if slug == "same"
        ));
    }

    #[test]
    fn duplicate_slug_across_directories_is_error() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("old");
        std::fs::create_dir_all(&sub).unwrap();
        write_post(tmp.path(), "intro.md", "title: New", "");
        write_post(&sub, "intro.md", "title: Old", "");
        let result = ContentStore::new(tmp.path()).get_post("intro");
        assert!(matches!(result, Err(StoreError::DuplicateSlug { .. })));
    }

    #[test]
    fn missing_directory_is_empty_collection() {
        let tmp = TempDir::new().unwrap();
        let store = ContentStore::new(tmp.path().join("does-not-exist"));
        assert!(store.list_posts().unwrap().is_empty());
    }

    #[test]
    fn get_post_finds_by_slug() {
        let tmp = setup_fixtures();
        let store = ContentStore::new(tmp.path().join("posts"));
        let post = store.get_post("hello-world").unwrap();
        assert_eq!(post.meta.title, "Hello, World");
        assert!(!post.markdown.starts_with("---"));
    }

    #[test]
    fn get_post_unknown_slug_is_not_found() {
        let tmp = setup_fixtures();
        let store = ContentStore::new(tmp.path().join("posts"));
        let err = store.get_post("nonexistent-slug").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref s) if s == "nonexistent-slug"));
        assert_eq!(err.to_string(), "post not found: nonexistent-slug");
    }

    #[test]
    fn list_posts_is_idempotent() {
        let tmp = setup_fixtures();
        let store = ContentStore::new(tmp.path().join("posts"));
        let first = store.list_posts().unwrap();
        let second = store.list_posts().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_category_defaults_to_uncategorized() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "plain.md", "title: Plain", "Body");
        let post = ContentStore::new(tmp.path()).get_post("plain").unwrap();
        assert_eq!(post.meta.category, "Uncategorized");
    }

    #[test]
    fn malformed_front_matter_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("broken.md"),
            "---\ntitle: [oops\n---\nStill readable.",
        )
        .unwrap();
        let post = ContentStore::new(tmp.path()).get_post("broken").unwrap();
        assert_eq!(post.meta.title, "broken");
        assert_eq!(post.meta.category, "Uncategorized");
        assert_eq!(post.markdown, "Still readable.");
    }

    #[test]
    fn front_matter_problems_name_the_file() {
        let tmp = setup_fixtures();
        let store = ContentStore::new(tmp.path().join("posts"));
        let problems = store.front_matter_problems().unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].0, "broken-front-matter.md");
        assert!(problems[0].1.contains("YAML"));
    }

    #[test]
    fn edits_visible_on_next_call() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "live.md", "title: Before", "");
        let store = ContentStore::new(tmp.path());
        assert_eq!(store.get_post("live").unwrap().meta.title, "Before");

        write_post(tmp.path(), "live.md", "title: After", "");
        assert_eq!(store.get_post("live").unwrap().meta.title, "After");
    }

    #[test]
    fn cached_store_reuses_unchanged_parses() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "title: A", "");
        write_post(tmp.path(), "b.md", "title: B", "");
        let store = ContentStore::new(tmp.path()).with_cache();

        store.list_posts().unwrap();
        store.list_posts().unwrap();
        let stats = store.cache_stats().unwrap();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn cached_store_sees_edits() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "live.md", "title: Before", "");
        let store = ContentStore::new(tmp.path()).with_cache();
        assert_eq!(store.list_posts().unwrap()[0].meta.title, "Before");

        write_post(tmp.path(), "live.md", "title: After", "");
        assert_eq!(store.list_posts().unwrap()[0].meta.title, "After");

        std::fs::remove_file(tmp.path().join("live.md")).unwrap();
        assert!(store.list_posts().unwrap().is_empty());
    }

    #[test]
    fn uncached_store_has_no_stats() {
        let tmp = TempDir::new().unwrap();
        assert!(ContentStore::new(tmp.path()).cache_stats().is_none());
    }

    #[test]
    fn for_collection_uses_config() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("notes");
        std::fs::create_dir_all(&dir).unwrap();
        write_post(&dir, "n.md", "title: N", "");
        let collection = CollectionConfig {
            name: "notes".into(),
            title: "Notes".into(),
            dir: "notes".into(),
            navigation: crate::index::NavigationPolicy::Clamping,
        };
        let content = ContentConfig {
            extensions: vec!["md".into()],
            cache: true,
        };
        let store = ContentStore::for_collection(tmp.path(), &collection, &content);
        assert_eq!(store.root(), dir.as_path());
        assert_eq!(slugs(&store.list_posts().unwrap()), vec!["n"]);
        assert!(store.cache_stats().is_some());
    }
}
