//! Parse cache for the content store.
//!
//! Parsing front matter is cheap, but a long-running process (a preview
//! server, a watch loop) lists the same posts over and over. This cache lets
//! the store skip decoding a file whose bytes have not changed.
//!
//! # Design
//!
//! The cache is **content-addressed**: an entry is keyed by source path and
//! stores the SHA-256 of the bytes it was parsed from. The store still reads
//! every file on every call; it only skips the decode step when the hash
//! matches. Content-based rather than mtime-based so it survives
//! `git checkout` (which resets modification times), and so an edit is
//! always visible on the very next call.
//!
//! A hit requires:
//! 1. An entry exists for the path
//! 2. Its `source_hash` equals the hash of the bytes just read
//!
//! Entries for files that disappear are dropped by [`PostCache::retain`].

use crate::types::Post;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// A parsed post and the hash of the bytes it came from.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub source_hash: String,
    pub post: Post,
}

/// In-memory map from source path to its last parse.
#[derive(Debug, Default)]
pub struct PostCache {
    entries: HashMap<PathBuf, CacheEntry>,
    stats: CacheStats,
}

impl PostCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached post for `path` if it was parsed from identical bytes.
    pub fn find(&mut self, path: &Path, source_hash: &str) -> Option<Post> {
        match self.entries.get(path) {
            Some(entry) if entry.source_hash == source_hash => {
                self.stats.hit();
                Some(entry.post.clone())
            }
            _ => {
                self.stats.miss();
                None
            }
        }
    }

    /// Record the parse of `path`, replacing any previous entry.
    pub fn insert(&mut self, path: PathBuf, source_hash: String, post: Post) {
        self.entries.insert(path, CacheEntry { source_hash, post });
    }

    /// Drop entries whose path is not in `live`.
    pub fn retain(&mut self, live: &HashSet<PathBuf>) {
        self.entries.retain(|path, _| live.contains(path));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// SHA-256 of a byte slice, returned as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Running totals of cache lookups.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} parsed ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} parsed", self.misses)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostMeta;

    fn post(slug: &str) -> Post {
        Post {
            slug: slug.to_string(),
            meta: PostMeta::defaults_for(slug),
            markdown: String::new(),
            source: format!("{slug}.md"),
        }
    }

    #[test]
    fn empty_cache_misses() {
        let mut cache = PostCache::new();
        assert!(cache.find(Path::new("a.md"), "abc").is_none());
        assert_eq!(cache.stats().misses, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn matching_hash_hits() {
        let mut cache = PostCache::new();
        cache.insert(PathBuf::from("a.md"), "h1".into(), post("a"));
        let found = cache.find(Path::new("a.md"), "h1").unwrap();
        assert_eq!(found.slug, "a");
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn changed_hash_misses() {
        let mut cache = PostCache::new();
        cache.insert(PathBuf::from("a.md"), "h1".into(), post("a"));
        assert!(cache.find(Path::new("a.md"), "h2").is_none());
    }

    #[test]
    fn insert_replaces_entry() {
        let mut cache = PostCache::new();
        cache.insert(PathBuf::from("a.md"), "h1".into(), post("a"));
        cache.insert(PathBuf::from("a.md"), "h2".into(), post("a2"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.find(Path::new("a.md"), "h2").unwrap().slug, "a2");
    }

    #[test]
    fn retain_drops_deleted_paths() {
        let mut cache = PostCache::new();
        cache.insert(PathBuf::from("a.md"), "h".into(), post("a"));
        cache.insert(PathBuf::from("b.md"), "h".into(), post("b"));
        let live: HashSet<PathBuf> = [PathBuf::from("b.md")].into_iter().collect();
        cache.retain(&live);
        assert_eq!(cache.len(), 1);
        assert!(cache.find(Path::new("a.md"), "h").is_none());
    }

    #[test]
    fn hash_bytes_deterministic_and_content_sensitive() {
        assert_eq!(hash_bytes(b"post"), hash_bytes(b"post"));
        assert_ne!(hash_bytes(b"post"), hash_bytes(b"post!"));
        assert_eq!(hash_bytes(b"").len(), 64);
    }

    #[test]
    fn stats_display_with_hits() {
        let stats = CacheStats { hits: 3, misses: 1 };
        assert_eq!(stats.to_string(), "3 cached, 1 parsed (4 total)");
    }

    #[test]
    fn stats_display_no_hits() {
        let stats = CacheStats { hits: 0, misses: 5 };
        assert_eq!(stats.to_string(), "5 parsed");
    }
}
