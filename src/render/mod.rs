//! Markdown → typed content blocks.
//!
//! [`Renderer::render`] turns a post body into a closed set of
//! [`ContentBlock`]s plus a side-table of [`Heading`]s for the table of
//! contents. HTML is produced later by the page shell; this module only
//! decides *what* each part of the document is.
//!
//! ## Heading ids
//!
//! Every heading gets an id that is unique within the document. An explicit
//! `{#id}` attribute is used as written; otherwise the text is slugified.
//! Repeats get `-1`, `-2`, ... (see [`naming::Slugger`](crate::naming::Slugger)).
//!
//! ## Footnotes
//!
//! References are numbered in order of first appearance. Definitions are
//! pulled out of the flow and collected into one trailing
//! [`ContentBlock::Notes`]. Headings inside notes still get ids but never
//! enter [`Rendered::headings`], so they stay out of the TOC.
//!
//! ## Collaborators
//!
//! Syntax highlighting and diagram rendering are delegated through the
//! [`Highlighter`] and [`DiagramRenderer`] traits. A failing collaborator
//! never fails the render:
//!
//! | Failure | Result |
//! |---------|--------|
//! | highlight | [`ContentBlock::Code`] with `highlighted: None` |
//! | diagram | [`ContentBlock::Code`] holding the diagram source |

mod blocks;
mod diagram;
mod highlight;
mod reading;
mod widget;

pub use diagram::CommandDiagramRenderer;
pub use highlight::SyntectHighlighter;
pub use reading::{WORDS_PER_MINUTE, reading_time_from_body, reading_time_from_excerpt, word_count};
pub use widget::parse_widget;

use crate::config::RenderConfig;
use crate::types::Heading;
use pulldown_cmark::Options;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io;
use thiserror::Error;

/// Errors reported by highlighting and diagram collaborators.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("no syntax definition for language '{0}'")]
    UnknownLanguage(String),
    #[error("highlighting {language} failed: {message}")]
    Highlight { language: String, message: String },
    #[error("diagram command is empty")]
    EmptyCommand,
    #[error("failed to run diagram command: {0}")]
    Spawn(#[source] io::Error),
    #[error("diagram command failed (exit {exit_code:?}): {stderr}")]
    Command {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("diagram command produced no SVG")]
    NoSvg,
}

/// Produces highlighted HTML for a code block.
pub trait Highlighter: Send + Sync {
    /// Return the inner HTML of a `<code>` element for `code` in `language`.
    fn highlight(&self, code: &str, language: &str) -> Result<String, CollaboratorError>;
}

/// Produces an SVG for a diagram description.
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, language: &str, source: &str) -> Result<String, CollaboratorError>;
}

/// Inline content of paragraphs, headings, list items, and table cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        url: String,
        title: String,
        children: Vec<Inline>,
    },
    Image {
        url: String,
        title: String,
        alt: String,
    },
    /// Marker pointing at a footnote in the trailing notes.
    ///
    /// `id` is this occurrence's own anchor; `target` is the note's.
    FootnoteRef {
        label: String,
        number: usize,
        id: String,
        target: String,
    },
    SoftBreak,
    HardBreak,
    Html(String),
}

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// `Some` for task list items.
    pub checked: Option<bool>,
    pub blocks: Vec<ContentBlock>,
}

/// One footnote definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub label: String,
    pub number: usize,
    /// Anchor id, unique among the document's heading and note ids.
    pub id: String,
    /// Anchor of the first reference; `None` when the note is never cited.
    pub back_ref: Option<String>,
    pub blocks: Vec<ContentBlock>,
}

/// A block of rendered content. Each variant carries only what its kind needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Heading {
        level: u8,
        id: String,
        content: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    /// Fenced or indented code. `code` is the raw text (for copy buttons);
    /// `highlighted` is set when a highlighter succeeded.
    Code {
        language: Option<String>,
        code: String,
        highlighted: Option<String>,
    },
    /// A fenced block in a diagram language. `svg` is set when rendered at
    /// build time; otherwise the page renders `source` client-side.
    Diagram {
        language: String,
        source: String,
        svg: Option<String>,
    },
    /// A registered custom tag such as `<Callout kind="note" />`.
    Widget {
        name: String,
        props: Map<String, Value>,
    },
    /// A paragraph holding nothing but an image.
    Image {
        url: String,
        alt: String,
        title: String,
    },
    Table {
        alignments: Vec<Alignment>,
        head: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    List {
        /// Start number for ordered lists.
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Quote(Vec<ContentBlock>),
    Rule,
    Html(String),
    /// Footnote definitions, ordered by number. Always last when present.
    Notes(Vec<Note>),
}

/// Output of [`Renderer::render`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub blocks: Vec<ContentBlock>,
    /// Headings outside the notes, in document order.
    pub headings: Vec<Heading>,
}

/// Markdown renderer with its configured collaborators.
pub struct Renderer {
    diagram_languages: HashSet<String>,
    widgets: HashSet<String>,
    highlighter: Option<Box<dyn Highlighter>>,
    diagrams: Option<Box<dyn DiagramRenderer>>,
}

impl Default for Renderer {
    /// Default diagram languages and widgets, no collaborators.
    fn default() -> Self {
        Self::with_render_settings(&RenderConfig::default())
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("diagram_languages", &self.diagram_languages)
            .field("widgets", &self.widgets)
            .field("highlighter", &self.highlighter.is_some())
            .field("diagrams", &self.diagrams.is_some())
            .finish()
    }
}

impl Renderer {
    /// Renderer for `config`, with the syntect highlighter when
    /// `highlight` is on and a command diagram renderer when
    /// `diagram_command` is set.
    pub fn from_config(config: &RenderConfig) -> Self {
        let mut renderer = Self::with_render_settings(config);
        if config.highlight {
            renderer.highlighter = Some(Box::new(SyntectHighlighter::new()));
        }
        if let Some(command) = config.diagram_command.as_deref().filter(|c| !c.trim().is_empty()) {
            renderer.diagrams = Some(Box::new(CommandDiagramRenderer::new(command)));
        }
        renderer
    }

    fn with_render_settings(config: &RenderConfig) -> Self {
        Self {
            diagram_languages: config
                .diagram_languages
                .iter()
                .map(|l| l.to_ascii_lowercase())
                .collect(),
            widgets: config.widgets.iter().cloned().collect(),
            highlighter: None,
            diagrams: None,
        }
    }

    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    pub fn with_diagram_renderer(mut self, diagrams: impl DiagramRenderer + 'static) -> Self {
        self.diagrams = Some(Box::new(diagrams));
        self
    }

    /// Convert `markdown` into blocks and the heading side-table.
    pub fn render(&self, markdown: &str) -> Rendered {
        blocks::build(self, markdown)
    }

    fn is_diagram_language(&self, language: &str) -> bool {
        self.diagram_languages
            .contains(&language.to_ascii_lowercase())
    }

    fn is_widget(&self, name: &str) -> bool {
        self.widgets.contains(name)
    }
}

/// Render with the default renderer (no collaborators).
pub fn render(markdown: &str) -> Rendered {
    Renderer::default().render(markdown)
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Concatenated text of inline content, without markup.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children)
            | Inline::Link { children, .. } => push_plain_text(children, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::FootnoteRef { .. } | Inline::Html(_) => {}
        }
    }
}
