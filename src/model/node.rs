//! Styled block tree produced by the document builder.

use crate::style::{BlockRole, BlockStyle, CharFormat};

/// A span of literal text with the character formatting of its inline
/// ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRun {
    pub text: String,
    pub format: CharFormat,
}

/// One item of a block's content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Run(InlineRun),
    /// Explicit line break inside a paragraph.
    LineBreak,
    Block(StyledBlock),
}

/// A paragraph-like unit with resolved formatting.
///
/// Nested blocks (verses inside a stanza, paragraphs inside an epigraph)
/// already carry the style they inherited, so rendering never needs to
/// look at ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledBlock {
    pub role: BlockRole,
    pub style: BlockStyle,
    pub content: Vec<Flow>,
}

/// Everything that goes into one chapter, heading first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterBody {
    pub content: Vec<Flow>,
}

impl ChapterBody {
    pub fn new(content: Vec<Flow>) -> Self {
        Self { content }
    }

    /// True if no run in the tree carries any text.
    pub fn is_empty(&self) -> bool {
        fn has_text(flows: &[Flow]) -> bool {
            flows.iter().any(|flow| match flow {
                Flow::Run(run) => !run.text.is_empty(),
                Flow::LineBreak => false,
                Flow::Block(block) => has_text(&block.content),
            })
        }
        !has_text(&self.content)
    }

    /// Iterate over every block in the tree, parents before children.
    pub fn blocks(&self) -> impl Iterator<Item = &StyledBlock> {
        let mut stack: Vec<&Flow> = self.content.iter().rev().collect();
        std::iter::from_fn(move || {
            while let Some(flow) = stack.pop() {
                if let Flow::Block(block) = flow {
                    stack.extend(block.content.iter().rev());
                    return Some(block);
                }
            }
            None
        })
    }
}
