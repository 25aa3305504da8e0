//! HTML site generation.
//!
//! Loads every configured collection, renders each post through the
//! [`Renderer`], and writes a static site with maud templates.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): the most recent posts of each collection
//! - **Collection** (`/{collection}/index.html`): all posts grouped by year,
//!   with a category bar
//! - **Category** (`/{collection}/category/{category}/index.html`): the same
//!   listing filtered to one category
//! - **Post** (`/{collection}/{slug}/index.html`): rendered body, table of
//!   contents, and prev/next links following the collection's
//!   [`NavigationPolicy`](crate::index::NavigationPolicy)
//! - **Listing data** (`/{collection}/index.json`): post summaries for
//!   client-side use
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── writing/
//! │   ├── index.html
//! │   ├── index.json
//! │   ├── category/notes/index.html
//! │   └── hello-world/index.html
//! └── projects/
//!     ├── index.html
//!     └── folio/index.html
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: base styles (colors injected from config)
//! - `static/theme.js`: theme switch, inlined in `<head>`
//! - `static/toc.js`: scroll-synchronized TOC, on post pages with a TOC
//! - `static/copy.js`: copy buttons, on post pages with code
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{self, CollectionConfig, SiteConfig};
use crate::index::{
    ALL_CATEGORIES, CategoryCount, NavigationContext, PostIndex, group_by_year, navigation_for,
    post_date,
};
use crate::render::{
    Alignment, ContentBlock, Inline, ListItem, Note, Renderer, reading_time_from_body,
    reading_time_from_excerpt,
};
use crate::store::{ContentStore, StoreError};
use crate::toc::{TocEntry, collect_toc_entries};
use crate::types::Post;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content error: {0}")]
    Store(#[from] StoreError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const THEME_JS: &str = include_str!("../static/theme.js");
const TOC_JS: &str = include_str!("../static/toc.js");
const COPY_JS: &str = include_str!("../static/copy.js");

/// One configured collection with its posts in date order.
#[derive(Debug)]
pub struct Collection {
    pub config: CollectionConfig,
    pub index: PostIndex,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// Load every configured collection under `source`.
pub fn load_collections(source: &Path, config: &SiteConfig) -> Result<Vec<Collection>, StoreError> {
    config
        .collections
        .iter()
        .map(|collection| {
            let store = ContentStore::for_collection(source, collection, &config.content);
            let posts = store.list_posts()?;
            Ok(Collection {
                config: collection.clone(),
                index: PostIndex::new(posts),
            })
        })
        .collect()
}

/// Look up `slug` through each candidate collection's store, in config order.
///
/// `only` restricts the search to one collection. The first collection whose
/// store has the slug is loaded in full so navigation can be derived.
pub fn locate_post(
    source: &Path,
    config: &SiteConfig,
    slug: &str,
    only: Option<&str>,
) -> Result<(Collection, Post), StoreError> {
    let candidates = config
        .collections
        .iter()
        .filter(|c| only.is_none_or(|name| c.name == name));
    for collection in candidates {
        let store = ContentStore::for_collection(source, collection, &config.content);
        match store.get_post(slug) {
            Ok(post) => {
                let index = PostIndex::new(store.list_posts()?);
                return Ok((
                    Collection {
                        config: collection.clone(),
                        index,
                    },
                    post,
                ));
            }
            Err(StoreError::NotFound(_)) => continue,
            Err(err) => return Err(err),
        }
    }
    Err(StoreError::NotFound(slug.to_string()))
}

/// What a generated file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Collection,
    Category,
    Post,
    Data,
}

/// One file written by [`generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub kind: PageKind,
    pub title: String,
    /// Path relative to the output directory.
    pub path: String,
}

/// Everything [`generate`] wrote, in write order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub pages: Vec<GeneratedPage>,
}

impl BuildSummary {
    pub fn count(&self, kind: PageKind) -> usize {
        self.pages.iter().filter(|p| p.kind == kind).count()
    }
}

/// Load content from `source` and write the site into `output`.
pub fn generate(
    source: &Path,
    output: &Path,
    config: &SiteConfig,
) -> Result<BuildSummary, GenerateError> {
    let started_at = Instant::now();
    let collections = load_collections(source, config)?;
    let renderer = Renderer::from_config(&config.render);
    let css = format!("{}\n\n{}", config::generate_color_css(&config.colors), CSS_STATIC);
    let shell = Shell {
        config,
        css: &css,
        collections: &collections,
    };

    fs::create_dir_all(output)?;
    let mut pages = Vec::new();

    let home = render_home(&shell);
    write_page(output, "index.html", &home.into_string())?;
    pages.push(GeneratedPage {
        kind: PageKind::Home,
        title: config.site.title.clone(),
        path: "index.html".to_string(),
    });

    for collection in &collections {
        let name = collection.name();
        let title = collection.config.display_title();

        let listing = render_collection_page(&shell, collection, None);
        let path = format!("{name}/index.html");
        write_page(output, &path, &listing.into_string())?;
        pages.push(GeneratedPage {
            kind: PageKind::Collection,
            title: title.to_string(),
            path,
        });

        let data = serde_json::to_string_pretty(&listing_data(collection))?;
        let path = format!("{name}/index.json");
        write_page(output, &path, &data)?;
        pages.push(GeneratedPage {
            kind: PageKind::Data,
            title: title.to_string(),
            path,
        });

        for category in collection.index.categories() {
            let page = render_collection_page(&shell, collection, Some(&category.name));
            let path = format!("{name}/category/{}/index.html", category.slug);
            write_page(output, &path, &page.into_string())?;
            pages.push(GeneratedPage {
                kind: PageKind::Category,
                title: category.name,
                path,
            });
        }

        // Rendering is the expensive part; writes stay sequential.
        let rendered: Vec<(GeneratedPage, String)> = collection
            .index
            .posts()
            .par_iter()
            .map(|post| {
                let html = render_post_page(&shell, &renderer, collection, post);
                let page = GeneratedPage {
                    kind: PageKind::Post,
                    title: post.meta.title.clone(),
                    path: format!("{name}/{}/index.html", post.slug),
                };
                (page, html.into_string())
            })
            .collect();
        for (page, html) in rendered {
            write_page(output, &page.path, &html)?;
            pages.push(page);
        }
        debug!(collection = %name, posts = collection.index.len(), "Generated collection");
    }

    info!(
        output = %output.display(),
        pages = pages.len(),
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "Site generated"
    );
    Ok(BuildSummary {
        output: output.to_path_buf(),
        pages,
    })
}

fn write_page(output: &Path, relative: &str, contents: &str) -> std::io::Result<()> {
    let path = output.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

// ============================================================================
// URLs and listing data
// ============================================================================

pub fn post_url(collection: &str, slug: &str) -> String {
    format!("/{collection}/{slug}/")
}

pub fn category_url(collection: &str, category: &CategoryCount) -> String {
    format!("/{collection}/category/{}/", category.slug)
}

/// Human date, e.g. `March 1, 2024`. `None` for undated posts.
pub fn display_date(post: &Post) -> Option<String> {
    post_date(post).map(|d| d.format("%B %-d, %Y").to_string())
}

#[derive(Debug, Serialize)]
struct PostSummary<'a> {
    slug: &'a str,
    url: String,
    title: &'a str,
    date: &'a str,
    excerpt: &'a str,
    category: &'a str,
    tags: &'a [String],
    reading_minutes: usize,
}

fn listing_data(collection: &Collection) -> Vec<PostSummary<'_>> {
    collection
        .index
        .posts()
        .iter()
        .map(|post| PostSummary {
            slug: &post.slug,
            url: post_url(collection.name(), &post.slug),
            title: &post.meta.title,
            date: &post.meta.date,
            excerpt: &post.meta.excerpt,
            category: &post.meta.category,
            tags: &post.meta.tags,
            reading_minutes: reading_time_from_excerpt(&post.meta.excerpt),
        })
        .collect()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Site-wide context shared by every page.
struct Shell<'a> {
    config: &'a SiteConfig,
    css: &'a str,
    collections: &'a [Collection],
}

/// Renders the base HTML document structure
fn base_document(shell: &Shell, title: &str, current: &str, content: Markup) -> Markup {
    let site = &shell.config.site;
    let full_title = if title == site.title {
        title.to_string()
    } else {
        format!("{} · {}", title, site.title)
    };
    html! {
        (DOCTYPE)
        html lang="en" data-theme=(site.default_theme.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if !site.description.is_empty() {
                    meta name="description" content=(site.description);
                }
                @if !site.author.is_empty() {
                    meta name="author" content=(site.author);
                }
                title { (full_title) }
                style { (PreEscaped(shell.css)) }
                script { (PreEscaped(THEME_JS)) }
            }
            body {
                (site_header(shell, current))
                (content)
            }
        }
    }
}

/// Renders the site header with collection links and the theme toggle
fn site_header(shell: &Shell, current: &str) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (shell.config.site.title) }
            nav.site-nav {
                ul {
                    @for collection in shell.collections {
                        li class=[(collection.name() == current).then_some("current")] {
                            a href={ "/" (collection.name()) "/" } {
                                (collection.config.display_title())
                            }
                        }
                    }
                }
            }
            button.theme-toggle type="button" data-theme-toggle aria-label="Switch theme" {
                (shell.config.site.default_theme.as_str())
            }
        }
    }
}

/// Renders one post in a listing
fn post_card(collection: &str, post: &Post) -> Markup {
    let thumbnail = post.meta.thumbnail.as_ref().or(post.meta.image.as_ref());
    html! {
        li.post-card {
            @if let Some(src) = thumbnail {
                img.thumbnail src=(src) alt="" loading="lazy"
                    style={ "object-fit: " (post.meta.thumbnail_fit.as_css()) };
            }
            h3 { a href=(post_url(collection, &post.slug)) { (post.meta.title) } }
            (post_meta_line(post, reading_time_from_excerpt(&post.meta.excerpt)))
            @if !post.meta.excerpt.is_empty() {
                p.excerpt { (post.meta.excerpt) }
            }
        }
    }
}

/// Date, category, and reading time
fn post_meta_line(post: &Post, minutes: usize) -> Markup {
    html! {
        div.meta {
            @if let Some(date) = display_date(post) {
                time datetime=(post.meta.date) { (date) }
            }
            span.category { (post.meta.category) }
            span.reading-time { (minutes) " min read" }
        }
    }
}

/// Renders the category filter bar; `current` is `None` on the full listing
fn category_bar(collection: &Collection, current: Option<&str>) -> Markup {
    let categories = collection.index.categories();
    html! {
        nav.category-bar aria-label="Categories" {
            ul {
                li class=[current.is_none().then_some("current")] {
                    a href={ "/" (collection.name()) "/" } {
                        (ALL_CATEGORIES) " (" (collection.index.len()) ")"
                    }
                }
                @for category in &categories {
                    li class=[(current == Some(category.name.as_str())).then_some("current")] {
                        a href=(category_url(collection.name(), category)) {
                            (category.name) " (" (category.count) ")"
                        }
                    }
                }
            }
        }
    }
}

/// Renders prev/next links
fn post_nav(collection: &str, nav: &NavigationContext) -> Markup {
    html! {
        nav.post-nav aria-label="More posts" {
            @if let Some(previous) = nav.previous {
                a.previous href=(post_url(collection, &previous.slug)) {
                    span { "Previous" }
                    (previous.meta.title)
                }
            }
            @if let Some(next) = nav.next {
                a.next href=(post_url(collection, &next.slug)) {
                    span { "Next" }
                    (next.meta.title)
                }
            }
        }
    }
}

/// Renders the table of contents aside
fn toc_aside(entries: &[TocEntry], shell: &Shell) -> Markup {
    let toc = &shell.config.toc;
    html! {
        aside.toc data-toc data-offset=(toc.offset) data-bottom=(toc.bottom_threshold)
            data-throttle=(toc.throttle_ms) {
            p.toc-title { "On this page" }
            ul.toc-list {
                span.toc-indicator aria-hidden="true" {}
                @for (i, entry) in entries.iter().enumerate() {
                    li {
                        a.active[i == 0] href={ "#" (entry.id) } data-toc-id=(entry.id) {
                            (entry.text)
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page with recent posts from each collection
fn render_home(shell: &Shell) -> Markup {
    let site = &shell.config.site;
    let content = html! {
        main.home {
            section.intro {
                h1 { (site.title) }
                @if !site.description.is_empty() {
                    p { (site.description) }
                }
            }
            @for collection in shell.collections {
                @if !collection.index.is_empty() {
                    section.collection-preview {
                        h2 { (collection.config.display_title()) }
                        ul.post-list {
                            @for post in collection.index.posts().iter().take(site.home_recent) {
                                (post_card(collection.name(), post))
                            }
                        }
                        a.more href={ "/" (collection.name()) "/" } {
                            "All " (collection.config.display_title().to_lowercase()) " →"
                        }
                    }
                }
            }
        }
    };
    base_document(shell, &site.title, "", content)
}

/// Renders a collection listing, optionally filtered to one category
fn render_collection_page(shell: &Shell, collection: &Collection, category: Option<&str>) -> Markup {
    let filtered: Vec<Post> = collection
        .index
        .filter_by_category(category.unwrap_or(ALL_CATEGORIES))
        .into_iter()
        .cloned()
        .collect();
    let groups = group_by_year(&filtered);
    let heading = match category {
        Some(name) => format!("{} · {}", collection.config.display_title(), name),
        None => collection.config.display_title().to_string(),
    };

    let content = html! {
        main.collection-page {
            h1 { (heading) }
            (category_bar(collection, category))
            @for group in &groups {
                section.year-group {
                    h2 {
                        @match group.year {
                            Some(year) => { (year) },
                            None => { "Undated" },
                        }
                    }
                    ul.post-list {
                        @for post in &group.posts {
                            (post_card(collection.name(), post))
                        }
                    }
                }
            }
        }
    };
    base_document(shell, &heading, collection.name(), content)
}

/// Renders a single post with its TOC and prev/next navigation
fn render_post_page(
    shell: &Shell,
    renderer: &Renderer,
    collection: &Collection,
    post: &Post,
) -> Markup {
    let rendered = renderer.render(&post.markdown);
    let entries = collect_toc_entries(&rendered.headings, &shell.config.toc.reserved_titles);
    let has_code = rendered.blocks.iter().any(contains_code);
    let nav = navigation_for(
        collection.config.navigation,
        collection.index.posts(),
        &post.slug,
    );

    let content = html! {
        main.post-layout.no-toc[entries.is_empty()] {
            article.post {
                header.post-header {
                    h1 { (post.meta.title) }
                    (post_meta_line(post, reading_time_from_body(&post.markdown)))
                    @if !post.meta.tags.is_empty() {
                        ul.tags {
                            @for tag in &post.meta.tags {
                                li { (tag) }
                            }
                        }
                    }
                }
                @if let Some(src) = &post.meta.image {
                    img.cover src=(src) alt=""
                        style={ "object-fit: " (post.meta.image_fit.as_css()) };
                }
                div.post-body {
                    (render_blocks(&rendered.blocks))
                }
                @if let Some(nav) = &nav {
                    (post_nav(collection.name(), nav))
                }
            }
            @if !entries.is_empty() {
                (toc_aside(&entries, shell))
            }
        }
        @if !entries.is_empty() {
            script { (PreEscaped(TOC_JS)) }
        }
        @if has_code {
            script { (PreEscaped(COPY_JS)) }
        }
    };
    base_document(shell, &post.meta.title, collection.name(), content)
}

// ============================================================================
// Content blocks
// ============================================================================

fn contains_code(block: &ContentBlock) -> bool {
    match block {
        ContentBlock::Code { .. } => true,
        ContentBlock::Quote(blocks) => blocks.iter().any(contains_code),
        ContentBlock::List { items, .. } => {
            items.iter().any(|item| item.blocks.iter().any(contains_code))
        }
        ContentBlock::Notes(notes) => notes.iter().any(|n| n.blocks.iter().any(contains_code)),
        _ => false,
    }
}

pub fn render_blocks(blocks: &[ContentBlock]) -> Markup {
    html! {
        @for block in blocks {
            (render_block(block))
        }
    }
}

fn render_block(block: &ContentBlock) -> Markup {
    match block {
        ContentBlock::Heading { level, id, content } => render_heading(*level, id, content),
        ContentBlock::Paragraph(inlines) => html! { p { (render_inlines(inlines)) } },
        ContentBlock::Code {
            language,
            code,
            highlighted,
        } => render_code(language.as_deref(), code, highlighted.as_deref()),
        ContentBlock::Diagram {
            language,
            source,
            svg,
        } => html! {
            @match svg {
                Some(svg) => figure.diagram data-language=(language) { (PreEscaped(svg)) },
                None => pre class={ "diagram " (language) } { (source) },
            }
        },
        ContentBlock::Widget { name, props } => render_widget(name, props),
        ContentBlock::Image { url, alt, title } => html! {
            figure.image {
                img src=(url) alt=(alt) title=[(!title.is_empty()).then_some(title)] loading="lazy";
                @if !title.is_empty() {
                    figcaption { (title) }
                }
            }
        },
        ContentBlock::Table {
            alignments,
            head,
            rows,
        } => render_table(alignments, head, rows),
        ContentBlock::List { start, items } => render_list(*start, items),
        ContentBlock::Quote(blocks) => html! { blockquote { (render_blocks(blocks)) } },
        ContentBlock::Rule => html! { hr; },
        ContentBlock::Html(raw) => PreEscaped(raw.clone()),
        ContentBlock::Notes(notes) => render_notes(notes),
    }
}

fn render_heading(level: u8, id: &str, content: &[Inline]) -> Markup {
    let inner = render_inlines(content);
    match level {
        1 => html! { h1 id=(id) { (inner) } },
        2 => html! { h2 id=(id) { (inner) } },
        3 => html! { h3 id=(id) { (inner) } },
        4 => html! { h4 id=(id) { (inner) } },
        5 => html! { h5 id=(id) { (inner) } },
        _ => html! { h6 id=(id) { (inner) } },
    }
}

/// Code block with a copy button carrying the raw text
fn render_code(language: Option<&str>, code: &str, highlighted: Option<&str>) -> Markup {
    let class = language.map(|l| format!("language-{l}"));
    html! {
        div.code-block {
            button.copy-button type="button" data-code=(code) { "Copy" }
            pre {
                code class=[class] {
                    @match highlighted {
                        Some(html) => (PreEscaped(html)),
                        None => (code),
                    }
                }
            }
        }
    }
}

fn prop<'a>(props: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    props.get(key).and_then(Value::as_str)
}

/// Registered widgets get markup of their own; all carry their props as JSON
fn render_widget(name: &str, props: &Map<String, Value>) -> Markup {
    let data = Value::Object(props.clone()).to_string();
    let body = match name {
        "Callout" => {
            let kind = prop(props, "kind").unwrap_or("note");
            html! {
                aside class={ "callout " (kind) } role="note" {
                    @if let Some(title) = prop(props, "title") {
                        strong.callout-title { (title) }
                    }
                    @if let Some(text) = prop(props, "children") {
                        p { (text) }
                    }
                }
            }
        }
        "Figure" => html! {
            figure.image {
                @if let Some(src) = prop(props, "src") {
                    img src=(src) alt=(prop(props, "alt").unwrap_or("")) loading="lazy";
                }
                @if let Some(caption) = prop(props, "caption").or(prop(props, "children")) {
                    figcaption { (caption) }
                }
            }
        },
        "YouTube" => html! {
            @if let Some(id) = prop(props, "id") {
                div.video {
                    iframe src={ "https://www.youtube-nocookie.com/embed/" (id) }
                        title=(prop(props, "title").unwrap_or("Video"))
                        loading="lazy" allowfullscreen {}
                }
            }
        },
        _ => html! {},
    };
    html! {
        div.widget data-widget=(name) data-props=(data) {
            (body)
        }
    }
}

fn alignment_style(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("text-align: left"),
        Alignment::Center => Some("text-align: center"),
        Alignment::Right => Some("text-align: right"),
    }
}

fn render_table(alignments: &[Alignment], head: &[Vec<Inline>], rows: &[Vec<Vec<Inline>>]) -> Markup {
    let style = |i: usize| alignments.get(i).copied().and_then(alignment_style);
    html! {
        table {
            @if !head.is_empty() {
                thead {
                    tr {
                        @for (i, cell) in head.iter().enumerate() {
                            th style=[style(i)] { (render_inlines(cell)) }
                        }
                    }
                }
            }
            tbody {
                @for row in rows {
                    tr {
                        @for (i, cell) in row.iter().enumerate() {
                            td style=[style(i)] { (render_inlines(cell)) }
                        }
                    }
                }
            }
        }
    }
}

fn render_list(start: Option<u64>, items: &[ListItem]) -> Markup {
    let items = html! {
        @for item in items {
            li {
                @if let Some(checked) = item.checked {
                    input type="checkbox" disabled checked[checked];
                    " "
                }
                (render_blocks(&item.blocks))
            }
        }
    };
    match start {
        Some(start) => html! { ol start=[(start != 1).then_some(start)] { (items) } },
        None => html! { ul { (items) } },
    }
}

fn render_notes(notes: &[Note]) -> Markup {
    html! {
        section.footnotes aria-label="Notes" {
            ol {
                @for note in notes {
                    li id=(note.id) value=(note.number) {
                        (render_blocks(&note.blocks))
                        @if let Some(back_ref) = &note.back_ref {
                            a.footnote-back href={ "#" (back_ref) }
                                aria-label="Back to text" { "↩" }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_inlines(inlines: &[Inline]) -> Markup {
    html! {
        @for inline in inlines {
            (render_inline(inline))
        }
    }
}

fn render_inline(inline: &Inline) -> Markup {
    match inline {
        Inline::Text(text) => html! { (text) },
        Inline::Code(code) => html! { code { (code) } },
        Inline::Emphasis(children) => html! { em { (render_inlines(children)) } },
        Inline::Strong(children) => html! { strong { (render_inlines(children)) } },
        Inline::Strikethrough(children) => html! { del { (render_inlines(children)) } },
        Inline::Link {
            url,
            title,
            children,
        } => html! {
            a href=(url) title=[(!title.is_empty()).then_some(title)] { (render_inlines(children)) }
        },
        Inline::Image { url, title, alt } => html! {
            img src=(url) alt=(alt) title=[(!title.is_empty()).then_some(title)] loading="lazy";
        },
        Inline::FootnoteRef {
            number, id, target, ..
        } => html! {
            sup.footnote-ref id=(id) {
                a href={ "#" (target) } { (number) }
            }
        },
        Inline::SoftBreak => html! { "\n" },
        Inline::HardBreak => html! { br; },
        Inline::Html(raw) => PreEscaped(raw.clone()),
    }
}

// ============================================================================
// Tests
// ============================================================================
