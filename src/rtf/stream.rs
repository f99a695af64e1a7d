//! Linear view of a chapter's block tree.
//!
//! Pagination works on character offsets, so the tree is flattened into one
//! run of characters (paragraph and line breaks count as one `'\n'` each)
//! with the formatting of every span recorded alongside. Any offset range
//! can then be rendered back into a self-contained RTF document.

use std::ops::Range;

use crate::model::{ChapterBody, Flow};
use crate::style::{BlockStyle, CharFormat};

use super::writer::RtfWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Text,
    LineBreak,
    /// Ends the previous paragraph; `style` belongs to the next one.
    ParagraphBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    start: usize,
    end: usize,
    style: BlockStyle,
    format: CharFormat,
    kind: SegmentKind,
}

/// A chapter's characters plus the paragraph and character formatting of
/// every span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    chars: Vec<char>,
    segments: Vec<Segment>,
}

impl StyledText {
    pub fn from_body(body: &ChapterBody) -> Self {
        let mut flattener = Flattener::default();
        flattener.flows(&body.content, BlockStyle::default());
        StyledText {
            chars: flattener.chars,
            segments: flattener.segments,
        }
    }

    /// Number of characters in the plain-text view.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// True if there is nothing but whitespace to show.
    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    /// The plain-text view, indexed by character offset.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn plain_string(&self) -> String {
        self.chars.iter().collect()
    }

    /// Render the whole text as one RTF document.
    pub fn render_all(&self) -> String {
        self.render(0..self.len())
    }

    /// Render the characters in `range` as a self-contained RTF document.
    ///
    /// The first paragraph's formatting is re-established at the start of
    /// the slice, so a slice never depends on directives emitted before it.
    pub fn render(&self, range: Range<usize>) -> String {
        let range = range.start.min(self.len())..range.end.min(self.len());
        let mut writer = RtfWriter::with_capacity(range.len() + range.len() / 4);
        let first = self.segments.partition_point(|seg| seg.end <= range.start);

        for seg in &self.segments[first..] {
            if seg.start >= range.end {
                break;
            }
            if !writer.in_paragraph() {
                writer.begin_paragraph(&seg.style);
            }
            match seg.kind {
                SegmentKind::ParagraphBreak => writer.paragraph_break(),
                SegmentKind::LineBreak => writer.line_break(),
                SegmentKind::Text => {
                    let lo = seg.start.max(range.start);
                    let hi = seg.end.min(range.end);
                    writer.set_format(seg.format);
                    writer.text(self.chars[lo..hi].iter().copied());
                }
            }
        }

        writer.finish()
    }
}

#[derive(Default)]
struct Flattener {
    chars: Vec<char>,
    segments: Vec<Segment>,
    needs_break: bool,
}

impl Flattener {
    fn flows(&mut self, flows: &[Flow], style: BlockStyle) {
        for flow in flows {
            match flow {
                Flow::Run(run) => self.run(&run.text, run.format.union(style.char_format()), style),
                Flow::LineBreak => self.push(SegmentKind::LineBreak, '\n', style, style.char_format()),
                Flow::Block(block) => {
                    self.needs_break = true;
                    self.flows(&block.content, block.style);
                    self.needs_break = true;
                }
            }
        }
    }

    fn run(&mut self, text: &str, format: CharFormat, style: BlockStyle) {
        // whitespace between blocks belongs to no paragraph
        let between_blocks = self.needs_break || self.chars.is_empty();
        if between_blocks && text.chars().all(char::is_whitespace) {
            return;
        }
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.push(SegmentKind::LineBreak, '\n', style, format);
            }
            let mut start = None;
            for c in line.chars().filter(|c| *c == '\t' || !c.is_control()) {
                if start.is_none() {
                    self.open_paragraph(style);
                    start = Some(self.chars.len());
                }
                self.chars.push(c);
            }
            if let Some(start) = start {
                self.segments.push(Segment {
                    start,
                    end: self.chars.len(),
                    style,
                    format,
                    kind: SegmentKind::Text,
                });
            }
        }
    }

    fn push(&mut self, kind: SegmentKind, c: char, style: BlockStyle, format: CharFormat) {
        self.open_paragraph(style);
        let start = self.chars.len();
        self.chars.push(c);
        self.segments.push(Segment {
            start,
            end: start + 1,
            style,
            format,
            kind,
        });
    }

    /// Emit the paragraph break owed by a block boundary, unless nothing has
    /// been written yet. Empty blocks therefore never produce blank lines.
    fn open_paragraph(&mut self, style: BlockStyle) {
        if !self.needs_break {
            return;
        }
        self.needs_break = false;
        if self.chars.is_empty() {
            return;
        }
        let start = self.chars.len();
        self.chars.push('\n');
        self.segments.push(Segment {
            start,
            end: start + 1,
            style,
            format: style.char_format(),
            kind: SegmentKind::ParagraphBreak,
        });
    }
}
