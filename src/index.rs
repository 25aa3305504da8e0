//! Collection-level views over posts.
//!
//! Everything here is derived, never stored: the store hands over posts in
//! path order and these functions produce the orderings and groupings pages
//! need.
//!
//! ## Ordering
//!
//! Posts sort by `meta.date` newest first. Dates that do not parse sort
//! after every dated post. Ties (same instant, or both undated) break on
//! slug ascending so the order never depends on the sort algorithm.
//!
//! ## Dates and time zones
//!
//! Accepted formats: `2024-03-01`, `2024-03-01T09:30:00`,
//! `2024-03-01 09:30:00`, `2024-03-01 09:30`, and RFC 3339 with an offset
//! (`2024-03-01T09:30:00+02:00`). Offsets are converted to UTC; dates
//! without one are taken as UTC. Year grouping uses the UTC year throughout.
//!
//! ## Navigation policies
//!
//! Two prev/next rules coexist, each used by a different page type:
//!
//! ```text
//! index:      [P0 newest, P1, P2 oldest]
//!
//! clamping:   P0 → prev P1, next none   P2 → prev none, next P1
//! wrapping:   P0 → prev P2, next P1     P2 → prev P1, next P0
//! ```
//!
//! See [`clamping_nav`] and [`wrapping_nav`].

use crate::naming::{Slugger, category_slug};
use crate::types::Post;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Category filter value meaning "no filtering".
pub const ALL_CATEGORIES: &str = "All";

/// Which prev/next rule a collection's pages use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationPolicy {
    /// Absent neighbours at the ends of the collection.
    #[default]
    Clamping,
    /// Neighbours cycle to the opposite end.
    Wrapping,
}

/// Neighbours of one post within a date-descending index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationContext<'a> {
    pub previous: Option<&'a Post>,
    pub next: Option<&'a Post>,
}

/// Posts of one calendar year, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup<'a> {
    /// `None` collects posts whose date does not parse.
    pub year: Option<i32>,
    pub posts: Vec<&'a Post>,
}

/// A category and how many posts carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    /// URL segment, unique among the categories of one listing.
    pub slug: String,
    pub count: usize,
}

/// Parse a front matter date into a UTC instant.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parsed date of a post, `None` when undated or unparsable.
pub fn post_date(post: &Post) -> Option<DateTime<Utc>> {
    parse_date(&post.meta.date)
}

/// UTC calendar year of a post's date.
pub fn post_year(post: &Post) -> Option<i32> {
    post_date(post).map(|d| d.year())
}

fn compare_newest_first(a: &Post, b: &Post) -> Ordering {
    let by_date = match (post_date(a), post_date(b)) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.slug.cmp(&b.slug))
}

/// Order posts newest first; undated posts last; ties by slug.
pub fn sorted_by_date_desc(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(compare_newest_first);
    posts
}

/// Group date-ordered posts by UTC year, newest year first.
///
/// Input order is preserved within each group, so pass an already sorted
/// slice. Undated posts form a final group with `year: None`.
pub fn group_by_year(posts: &[Post]) -> Vec<YearGroup<'_>> {
    let mut dated: Vec<YearGroup<'_>> = Vec::new();
    let mut undated: Vec<&Post> = Vec::new();
    for post in posts {
        match post_year(post) {
            Some(year) => match dated.iter_mut().find(|g| g.year == Some(year)) {
                Some(group) => group.posts.push(post),
                None => dated.push(YearGroup {
                    year: Some(year),
                    posts: vec![post],
                }),
            },
            None => undated.push(post),
        }
    }
    dated.sort_by(|a, b| b.year.cmp(&a.year));
    if !undated.is_empty() {
        dated.push(YearGroup {
            year: None,
            posts: undated,
        });
    }
    dated
}

/// Posts whose category matches exactly (case-sensitive).
///
/// [`ALL_CATEGORIES`] returns every post.
pub fn filter_by_category<'a>(posts: &'a [Post], category: &str) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|p| category == ALL_CATEGORIES || p.meta.category == category)
        .collect()
}

/// Distinct categories in order of first appearance, with counts.
///
/// Names that slugify alike (`Rust` and `rust`) get distinct slugs, the
/// later one suffixed.
pub fn categories(posts: &[Post]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut slugger = Slugger::new();
    for post in posts {
        match counts.iter_mut().find(|c| c.name == post.meta.category) {
            Some(c) => c.count += 1,
            None => counts.push(CategoryCount {
                name: post.meta.category.clone(),
                slug: slugger.claim(&category_slug(&post.meta.category)),
                count: 1,
            }),
        }
    }
    counts
}

fn position_of(posts: &[Post], slug: &str) -> Option<usize> {
    posts.iter().position(|p| p.slug == slug)
}

/// Prev/next without wraparound.
///
/// `previous` is the next-older post, `next` the next-newer one. At the
/// newest post `next` is absent; at the oldest `previous` is absent.
/// Returns `None` if `slug` is not in `posts`.
pub fn clamping_nav<'a>(posts: &'a [Post], slug: &str) -> Option<NavigationContext<'a>> {
    let index = position_of(posts, slug)?;
    let len = posts.len();
    Some(NavigationContext {
        previous: (index + 1 < len).then(|| &posts[index + 1]),
        next: (index > 0).then(|| &posts[index - 1]),
    })
}

/// Prev/next that cycles at the ends.
///
/// `previous` is the entry before this one in index order (wrapping to the
/// last), `next` the entry after (wrapping to the first). With a single post
/// both neighbours are the post itself. Returns `None` if `slug` is not in
/// `posts`.
pub fn wrapping_nav<'a>(posts: &'a [Post], slug: &str) -> Option<NavigationContext<'a>> {
    let index = position_of(posts, slug)?;
    let len = posts.len();
    let previous = if index > 0 { index - 1 } else { len - 1 };
    let next = if index + 1 < len { index + 1 } else { 0 };
    Some(NavigationContext {
        previous: Some(&posts[previous]),
        next: Some(&posts[next]),
    })
}

/// Dispatch to the navigation rule a collection declares.
pub fn navigation_for<'a>(
    policy: NavigationPolicy,
    posts: &'a [Post],
    slug: &str,
) -> Option<NavigationContext<'a>> {
    match policy {
        NavigationPolicy::Clamping => clamping_nav(posts, slug),
        NavigationPolicy::Wrapping => wrapping_nav(posts, slug),
    }
}

/// Date-descending posts of one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostIndex {
    posts: Vec<Post>,
}

impl PostIndex {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: sorted_by_date_desc(posts),
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn clamping_nav(&self, slug: &str) -> Option<NavigationContext<'_>> {
        clamping_nav(&self.posts, slug)
    }

    pub fn wrapping_nav(&self, slug: &str) -> Option<NavigationContext<'_>> {
        wrapping_nav(&self.posts, slug)
    }

    pub fn group_by_year(&self) -> Vec<YearGroup<'_>> {
        group_by_year(&self.posts)
    }

    pub fn filter_by_category(&self, category: &str) -> Vec<&Post> {
        filter_by_category(&self.posts, category)
    }

    pub fn categories(&self) -> Vec<CategoryCount> {
        categories(&self.posts)
    }
}
