//! Event stream → block tree.
//!
//! pulldown-cmark yields a flat stream of start/end events. The builder
//! walks it with a cursor: block parsers consume their own `End` event,
//! inline parsers stop *before* any `End` or block-level `Start` so the
//! enclosing block can close itself. Tight list items put inline events
//! directly inside `Item`; those are grouped into an implicit paragraph.

use super::{
    Alignment, ContentBlock, Inline, ListItem, Note, Rendered, Renderer, markdown_options,
    plain_text, widget,
};
use crate::naming::{Slugger, slugify};
use crate::types::Heading;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use tracing::{debug, warn};

use super::CollaboratorError;

pub(super) fn build(renderer: &Renderer, markdown: &str) -> Rendered {
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, markdown_options()).collect();
    let mut builder = Builder {
        renderer,
        events,
        pos: 0,
        slugger: Slugger::new(),
        headings: Vec::new(),
        footnotes: Vec::new(),
        notes: Vec::new(),
        in_notes: false,
    };

    let mut blocks = Vec::new();
    while builder.pos < builder.events.len() {
        blocks.extend(builder.blocks());
        // A stray End at top level cannot close anything; skip it.
        if builder.pos < builder.events.len() {
            builder.pos += 1;
        }
    }

    if let Some(notes) = builder.finish_notes() {
        blocks.push(notes);
    }
    Rendered {
        blocks,
        headings: builder.headings,
    }
}

struct Builder<'r, 'a> {
    renderer: &'r Renderer,
    events: Vec<Event<'a>>,
    pos: usize,
    slugger: Slugger,
    headings: Vec<Heading>,
    /// Footnote labels in order of first reference.
    footnotes: Vec<FootnoteSlot>,
    notes: Vec<(String, Vec<ContentBlock>)>,
    in_notes: bool,
}

/// Anchors claimed for one footnote label.
struct FootnoteSlot {
    label: String,
    anchor: String,
    first_ref: Option<String>,
}

impl<'a> Builder<'_, 'a> {
    fn peek(&self) -> Option<&Event<'a>> {
        self.events.get(self.pos)
    }

    fn advance(&mut self) -> Option<Event<'a>> {
        let event = self.events.get(self.pos).cloned();
        if event.is_some() {
            self.pos += 1;
        }
        event
    }

    /// Consume the `End` event that closes the current element, if present.
    fn close(&mut self) {
        if matches!(self.peek(), Some(Event::End(_))) {
            self.pos += 1;
        }
    }

    /// Parse blocks until an `End` event (left unconsumed) or end of input.
    fn blocks(&mut self) -> Vec<ContentBlock> {
        let mut out = Vec::new();
        while let Some(event) = self.peek() {
            if matches!(event, Event::End(_)) {
                break;
            }
            if is_inline(event) {
                let inlines = self.inlines();
                if !inlines.is_empty() {
                    out.push(paragraph_or_image(inlines));
                }
                continue;
            }
            if let Some(block) = self.block() {
                out.push(block);
            }
        }
        out
    }

    fn block(&mut self) -> Option<ContentBlock> {
        let event = self.advance()?;
        match event {
            Event::Start(Tag::Paragraph) => {
                let inlines = self.inlines();
                self.close();
                (!inlines.is_empty()).then(|| paragraph_or_image(inlines))
            }
            Event::Start(Tag::Heading { level, id, .. }) => {
                let content = self.inlines();
                self.close();
                let explicit = id.map(|i| i.to_string()).filter(|i| !i.is_empty());
                Some(self.heading(heading_level(level), explicit, content))
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|token| token.to_string()),
                    CodeBlockKind::Indented => None,
                };
                let code = self.raw_text();
                self.close();
                Some(self.code_block(language, code))
            }
            Event::Start(Tag::HtmlBlock) => {
                let html = self.raw_text();
                self.close();
                Some(self.html_block(html))
            }
            Event::Start(Tag::List(start)) => {
                let items = self.list_items();
                self.close();
                Some(ContentBlock::List { start, items })
            }
            Event::Start(Tag::BlockQuote(_)) => {
                let inner = self.blocks();
                self.close();
                Some(ContentBlock::Quote(inner))
            }
            Event::Start(Tag::Table(aligns)) => {
                let alignments = aligns.into_iter().map(alignment).collect();
                let (head, rows) = self.table();
                self.close();
                Some(ContentBlock::Table {
                    alignments,
                    head,
                    rows,
                })
            }
            Event::Start(Tag::FootnoteDefinition(label)) => {
                let was_in_notes = std::mem::replace(&mut self.in_notes, true);
                let inner = self.blocks();
                self.close();
                self.in_notes = was_in_notes;
                self.notes.push((label.to_string(), inner));
                None
            }
            Event::Rule => Some(ContentBlock::Rule),
            Event::Html(html) => Some(self.html_block(html.to_string())),
            Event::Start(_) => {
                self.skip_element();
                None
            }
            _ => None,
        }
    }

    fn heading(&mut self, level: u8, explicit: Option<String>, content: Vec<Inline>) -> ContentBlock {
        let text = plain_text(&content).trim().to_string();
        let id = match explicit {
            Some(id) => self.slugger.claim(&id),
            None => self.slugger.slug(&text),
        };
        if !self.in_notes {
            self.headings.push(Heading {
                id: id.clone(),
                text,
                level,
            });
        }
        ContentBlock::Heading { level, id, content }
    }

    fn code_block(&self, language: Option<String>, code: String) -> ContentBlock {
        if let Some(lang) = &language
            && self.renderer.is_diagram_language(lang)
        {
            return self.diagram_block(lang.clone(), code);
        }

        let highlighted = match (&self.renderer.highlighter, &language) {
            (Some(highlighter), Some(lang)) => match highlighter.highlight(&code, lang) {
                Ok(html) => Some(html),
                Err(CollaboratorError::UnknownLanguage(lang)) => {
                    debug!(language = %lang, "No syntax for language; leaving code plain");
                    None
                }
                Err(err) => {
                    warn!(language = %lang, error = %err, "Highlighting failed; leaving code plain");
                    None
                }
            },
            _ => None,
        };
        ContentBlock::Code {
            language,
            code,
            highlighted,
        }
    }

    fn diagram_block(&self, language: String, source: String) -> ContentBlock {
        let Some(diagrams) = &self.renderer.diagrams else {
            return ContentBlock::Diagram {
                language,
                source,
                svg: None,
            };
        };
        match diagrams.render(&language, &source) {
            Ok(svg) => ContentBlock::Diagram {
                language,
                source,
                svg: Some(svg),
            },
            Err(err) => {
                warn!(
                    language = %language,
                    error = %err,
                    "Diagram rendering failed; showing source"
                );
                ContentBlock::Code {
                    language: Some(language),
                    code: source,
                    highlighted: None,
                }
            }
        }
    }

    fn html_block(&self, html: String) -> ContentBlock {
        match widget::parse_widget(&html) {
            Some((name, props)) if self.renderer.is_widget(&name) => {
                ContentBlock::Widget { name, props }
            }
            _ => ContentBlock::Html(html),
        }
    }

    /// Text and HTML content up to the closing `End`, concatenated.
    fn raw_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Text(t) | Event::Html(t) | Event::InlineHtml(t) => {
                    text.push_str(t);
                    self.pos += 1;
                }
                Event::End(_) => break,
                _ => self.pos += 1,
            }
        }
        text
    }

    fn list_items(&mut self) -> Vec<ListItem> {
        let mut items = Vec::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Start(Tag::Item) => {
                    self.pos += 1;
                    let checked = match self.peek() {
                        Some(Event::TaskListMarker(done)) => {
                            let done = *done;
                            self.pos += 1;
                            Some(done)
                        }
                        _ => None,
                    };
                    let blocks = self.blocks();
                    self.close();
                    items.push(ListItem { checked, blocks });
                }
                Event::End(_) => break,
                _ => self.pos += 1,
            }
        }
        items
    }

    fn table(&mut self) -> (Vec<Vec<Inline>>, Vec<Vec<Vec<Inline>>>) {
        let mut head = Vec::new();
        let mut rows = Vec::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Start(Tag::TableHead) => {
                    self.pos += 1;
                    head = self.table_cells();
                    self.close();
                }
                Event::Start(Tag::TableRow) => {
                    self.pos += 1;
                    rows.push(self.table_cells());
                    self.close();
                }
                Event::End(TagEnd::Table) => break,
                Event::End(_) => self.pos += 1,
                _ => self.pos += 1,
            }
        }
        (head, rows)
    }

    fn table_cells(&mut self) -> Vec<Vec<Inline>> {
        let mut cells = Vec::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Start(Tag::TableCell) => {
                    self.pos += 1;
                    cells.push(self.inlines());
                    self.close();
                }
                Event::End(_) => break,
                _ => self.pos += 1,
            }
        }
        cells
    }

    /// Parse inline content, stopping before any `End` or block-level event.
    fn inlines(&mut self) -> Vec<Inline> {
        let mut out: Vec<Inline> = Vec::new();
        while let Some(event) = self.peek() {
            if !is_inline(event) {
                break;
            }
            let Some(event) = self.advance() else {
                break;
            };
            match event {
                Event::Text(text) => push_text(&mut out, &text),
                Event::Code(code) => out.push(Inline::Code(code.to_string())),
                Event::InlineMath(math) | Event::DisplayMath(math) => {
                    out.push(Inline::Code(math.to_string()))
                }
                Event::InlineHtml(html) => out.push(Inline::Html(html.to_string())),
                Event::SoftBreak => out.push(Inline::SoftBreak),
                Event::HardBreak => out.push(Inline::HardBreak),
                Event::FootnoteReference(label) => {
                    let index = self.footnote_slot(&label);
                    let id = self.slugger.claim(&format!("fnref-{}", slugify(&label)));
                    let slot = &mut self.footnotes[index];
                    slot.first_ref.get_or_insert_with(|| id.clone());
                    out.push(Inline::FootnoteRef {
                        label: label.to_string(),
                        number: index + 1,
                        id,
                        target: slot.anchor.clone(),
                    });
                }
                Event::Start(Tag::Emphasis) => {
                    let children = self.inlines();
                    self.close();
                    out.push(Inline::Emphasis(children));
                }
                Event::Start(Tag::Strong) => {
                    let children = self.inlines();
                    self.close();
                    out.push(Inline::Strong(children));
                }
                Event::Start(Tag::Strikethrough) => {
                    let children = self.inlines();
                    self.close();
                    out.push(Inline::Strikethrough(children));
                }
                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) => {
                    let children = self.inlines();
                    self.close();
                    out.push(Inline::Link {
                        url: dest_url.to_string(),
                        title: title.to_string(),
                        children,
                    });
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    let alt = plain_text(&self.inlines());
                    self.close();
                    out.push(Inline::Image {
                        url: dest_url.to_string(),
                        title: title.to_string(),
                        alt,
                    });
                }
                Event::Start(_) => {
                    let children = self.inlines();
                    self.close();
                    out.extend(children);
                }
                _ => {}
            }
        }
        out
    }

    /// Index of `label` in first-reference order, claiming its note anchor
    /// on first sight.
    fn footnote_slot(&mut self, label: &str) -> usize {
        if let Some(index) = self.footnotes.iter().position(|s| s.label == label) {
            return index;
        }
        let anchor = self.slugger.claim(&format!("fn-{}", slugify(label)));
        self.footnotes.push(FootnoteSlot {
            label: label.to_string(),
            anchor,
            first_ref: None,
        });
        self.footnotes.len() - 1
    }

    /// Skip an unsupported element and everything nested inside it.
    fn skip_element(&mut self) {
        let mut depth = 1usize;
        while let Some(event) = self.advance() {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    /// Number definitions (unreferenced ones after referenced ones, in
    /// definition order) and wrap them in a single notes block.
    fn finish_notes(&mut self) -> Option<ContentBlock> {
        if self.notes.is_empty() {
            return None;
        }
        let notes = std::mem::take(&mut self.notes);
        let mut numbered: Vec<Note> = notes
            .into_iter()
            .map(|(label, blocks)| {
                let index = self.footnote_slot(&label);
                let slot = &self.footnotes[index];
                Note {
                    id: slot.anchor.clone(),
                    back_ref: slot.first_ref.clone(),
                    label,
                    number: index + 1,
                    blocks,
                }
            })
            .collect();
        numbered.sort_by_key(|n| n.number);
        Some(ContentBlock::Notes(numbered))
    }
}

fn is_inline(event: &Event<'_>) -> bool {
    matches!(
        event,
        Event::Text(_)
            | Event::Code(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_)
            | Event::InlineHtml(_)
            | Event::SoftBreak
            | Event::HardBreak
            | Event::FootnoteReference(_)
            | Event::Start(
                Tag::Emphasis
                    | Tag::Strong
                    | Tag::Strikethrough
                    | Tag::Link { .. }
                    | Tag::Image { .. }
            )
    )
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

fn paragraph_or_image(inlines: Vec<Inline>) -> ContentBlock {
    if let [Inline::Image { url, alt, title }] = inlines.as_slice() {
        return ContentBlock::Image {
            url: url.clone(),
            alt: alt.clone(),
            title: title.clone(),
        };
    }
    ContentBlock::Paragraph(inlines)
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn alignment(align: pulldown_cmark::Alignment) -> Alignment {
    match align {
        pulldown_cmark::Alignment::None => Alignment::None,
        pulldown_cmark::Alignment::Left => Alignment::Left,
        pulldown_cmark::Alignment::Center => Alignment::Center,
        pulldown_cmark::Alignment::Right => Alignment::Right,
    }
}
