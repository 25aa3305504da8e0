//! # folio
//!
//! A markdown blog engine for personal portfolio sites. Markdown files with
//! front matter are the data source: each file is a post, each configured
//! directory is a collection, and the output is a static site.
//!
//! # Architecture: Content Pipeline
//!
//! ```text
//! 1. Store     content/posts/*.md  →  Vec<Post>          (files → records)
//! 2. Index     Vec<Post>           →  PostIndex          (date order, groups, nav)
//! 3. Render    post.markdown       →  Rendered           (typed blocks + headings)
//! 4. Generate  PostIndex + Rendered →  dist/              (HTML via Maud)
//! ```
//!
//! The generated post pages carry a scroll-synchronized table of contents and
//! a theme switch. Their browser scripts follow the same rules as the
//! [`toc`] and [`theme`] state machines, which are tested here.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Walks a collection directory and loads posts, optionally through the parse cache |
//! | [`frontmatter`] | Splits and decodes YAML (`---`) or TOML (`+++`) front matter leniently |
//! | [`cache`] | Content-hash parse cache used by the store |
//! | [`index`] | Date ordering, year grouping, category filters, clamping and wrapping navigation |
//! | [`render`] | Markdown → `ContentBlock`s, heading ids, footnotes, widgets, reading time |
//! | [`toc`] | Active-heading rule, throttle, and the scroll-sync state machine |
//! | [`theme`] | Light/dark/system theme state with a single persisting controller |
//! | [`generate`] | Renders the HTML site using Maud |
//! | [`check`] | Loads and renders everything, collecting problems |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`telemetry`] | `tracing` subscriber setup |
//! | [`types`] | Shared types (`Post`, `PostMeta`, `Heading`) |
//! | [`naming`] | Slugs for headings, categories, and filenames |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Typed Blocks Over HTML Strings
//!
//! The renderer produces a closed [`render::ContentBlock`] enum rather than
//! an HTML string. Pages match on block kinds, so diagrams, widgets, and
//! code blocks each get their own markup, and tests assert on structure
//! instead of string fragments.
//!
//! ## Lenient Content, Strict Config
//!
//! A post with broken front matter still loads with defaults and a logged
//! warning; a bad date makes a post undated. `config.toml` is the opposite:
//! unknown keys and invalid values are errors, so typos surface immediately.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Malformed templates are build errors, interpolation is
//! escaped by default, and there is no template directory to ship.

pub mod cache;
pub mod check;
pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod index;
pub mod naming;
pub mod output;
pub mod render;
pub mod store;
pub mod telemetry;
pub mod theme;
pub mod toc;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
