//! Reading-time estimates.
//!
//! List views only have the excerpt, so there are two estimators. The
//! excerpt one scales the excerpt up tenfold as a stand-in for the full body
//! and never reports less than a minute.

/// Assumed reading speed.
pub const WORDS_PER_MINUTE: usize = 200;

/// Excerpt word counts are multiplied by this to approximate a full post.
const EXCERPT_SCALE: usize = 10;

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes to read a full post body, rounded up. An empty body is 0.
pub fn reading_time_from_body(body: &str) -> usize {
    word_count(body).div_ceil(WORDS_PER_MINUTE)
}

/// Minutes estimated from an excerpt alone, at least 1.
pub fn reading_time_from_excerpt(excerpt: &str) -> usize {
    (word_count(excerpt) * EXCERPT_SCALE)
        .div_ceil(WORDS_PER_MINUTE)
        .max(1)
}
