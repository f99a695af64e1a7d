//! Document model builder.
//!
//! Walks the FB2 body and produces one [`Chapter`] per top-level section.
//! The walk is a pure recursion: every call receives the style context of
//! its ancestors by value and returns the blocks and runs it produced, so a
//! tag's formatting can never outlive the element that set it.

use log::debug;

use crate::error::{Error, Result};
use crate::model::{Chapter, ChapterBody, Document, Flow, InlineRun, StyledBlock};
use crate::style::{self, BlockRole, BlockStyle, CharFormat, InlineToggle, TagClass};

use super::metadata::parse_metadata;
use super::tree::{Element, Node};

/// Title of the chapter synthesized for bodies without sections.
pub const START_OF_BOOK: &str = "Start of book";

/// Title used when a section has neither a title nor a paragraph.
pub const UNTITLED: &str = "Untitled";

/// Fallback titles taken from a paragraph are cut to this many characters.
const MAX_FALLBACK_TITLE_CHARS: usize = 80;

/// How `title` elements of nested sections are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedTitles {
    /// Walked like any other container: text only, no heading style.
    #[default]
    Inline,
    /// Rendered as a heading block, like a chapter title.
    Heading,
}

/// Configuration for the document builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub nested_titles: NestedTitles,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nested_titles(mut self, nested_titles: NestedTitles) -> Self {
        self.nested_titles = nested_titles;
        self
    }
}

/// Build an unpaginated document from a parsed FB2 tree.
pub fn build(root: &Element, options: &BuildOptions) -> Result<Document> {
    if !root.is("FictionBook") {
        return Err(Error::Format(format!(
            "root element <{}> is not an FB2 FictionBook",
            root.name
        )));
    }
    let body = root
        .child("body")
        .ok_or_else(|| Error::Format("FictionBook has no <body>".into()))?;

    let walker = Walker { options };
    let mut chapters: Vec<Chapter> = body
        .children_named("section")
        .map(|section| walker.chapter(section))
        .collect();

    if chapters.is_empty() && body.child("p").is_some() {
        let content = walker.children(body, StyleContext::default(), false);
        chapters.push(Chapter::new(START_OF_BOOK, ChapterBody::new(content)));
    }

    if chapters.is_empty() {
        return Err(Error::EmptyDocument);
    }

    Ok(Document::new(parse_metadata(root), chapters))
}

/// Chapter title for a top-level section.
///
/// An empty title element counts as absent, and the fallback paragraph is
/// looked up outside it.
pub fn resolve_title(section: &Element) -> String {
    if let Some(title) = section.child("title").map(flatten)
        && !title.is_empty()
    {
        return title;
    }
    let first_paragraph = section
        .elements()
        .filter(|element| !element.is("title"))
        .find_map(|element| {
            if element.is("p") {
                Some(element)
            } else {
                element.descendant("p")
            }
        });
    match first_paragraph.map(flatten) {
        Some(text) if !text.is_empty() => truncate_title(text),
        _ => UNTITLED.to_string(),
    }
}

fn truncate_title(text: String) -> String {
    if text.chars().count() <= MAX_FALLBACK_TITLE_CHARS {
        return text;
    }
    let mut title: String = text.chars().take(MAX_FALLBACK_TITLE_CHARS).collect();
    title.push_str("...");
    title
}

/// Plain text of an element for titles.
///
/// Each child element is flattened and trimmed on its own; a `p` that
/// follows earlier text is separated from it by one space.
pub fn flatten(element: &Element) -> String {
    let mut out = String::new();
    for node in &element.children {
        match node {
            Node::Element(child) => {
                if child.name == "p" && !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&flatten(child));
            }
            Node::Text(text) => out.push_str(text),
        }
    }
    out.replace('\n', " ").replace('\r', "").trim().to_string()
}

/// Formatting inherited from ancestors.
#[derive(Debug, Clone, Copy, Default)]
struct StyleContext {
    block: BlockStyle,
    format: CharFormat,
}

impl StyleContext {
    fn enter_block(self, role: BlockRole) -> Self {
        Self {
            block: self.block.overlay(style::block_directive(role)),
            format: self.format,
        }
    }

    fn toggle(self, toggle: InlineToggle) -> Self {
        Self {
            block: self.block,
            format: self.format.with(toggle),
        }
    }
}

struct Walker<'a> {
    options: &'a BuildOptions,
}

impl Walker<'_> {
    fn chapter(&self, section: &Element) -> Chapter {
        let title = resolve_title(section);

        let mut content = Vec::new();
        if let Some(heading) = section.child("title") {
            content.push(self.block(heading, BlockRole::Title, StyleContext::default()));
        }
        content.extend(self.children(section, StyleContext::default(), true));

        let body = ChapterBody::new(content);
        debug!("chapter {title:?}: {} blocks", body.blocks().count());
        Chapter::new(title, body)
    }

    /// Walk the children of `parent`. With `skip_title` set, `title`
    /// children are left out because they were rendered as the heading.
    fn children(&self, parent: &Element, context: StyleContext, skip_title: bool) -> Vec<Flow> {
        let mut out = Vec::new();
        for node in &parent.children {
            match node {
                Node::Text(text) => out.extend(text_flow(text, context.format)),
                Node::Element(element) if skip_title && element.name == "title" => {}
                Node::Element(element) => out.extend(self.element(element, context)),
            }
        }
        out
    }

    fn element(&self, element: &Element, context: StyleContext) -> Vec<Flow> {
        match style::classify(&element.name) {
            TagClass::Block(role) => vec![self.block(element, role, context)],
            TagClass::Inline(toggle) => self.children(element, context.toggle(toggle), false),
            TagClass::Title if self.options.nested_titles == NestedTitles::Heading => {
                vec![self.block(element, BlockRole::Title, context)]
            }
            TagClass::Section | TagClass::Title | TagClass::Transparent => {
                self.children(element, context, false)
            }
        }
    }

    fn block(&self, element: &Element, role: BlockRole, context: StyleContext) -> Flow {
        let context = context.enter_block(role);
        Flow::Block(StyledBlock {
            role,
            style: context.block,
            content: self.children(element, context, false),
        })
    }
}

/// Runs and line breaks for one text node.
fn text_flow(text: &str, format: CharFormat) -> Vec<Flow> {
    let mut out = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Flow::LineBreak);
        }
        let line: String = line.chars().filter(|&c| c != '\r').collect();
        if !line.is_empty() {
            out.push(Flow::Run(InlineRun { text: line, format }));
        }
    }
    out
}
