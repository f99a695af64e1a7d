//! Style catalog.
//!
//! Maps FB2 element names to paragraph-level directives and character-level
//! toggles. Both the document builder and the RTF writer read formatting
//! from here, so a tag's look is defined in exactly one place.

/// Body text size in RTF half-points (14pt).
pub const BODY_FONT_SIZE: u16 = 28;

/// Chapter heading size in RTF half-points (16pt).
pub const HEADING_FONT_SIZE: u16 = 32;

/// Subtitle size in RTF half-points (14pt).
pub const SUBTITLE_FONT_SIZE: u16 = 28;

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// The RTF control word selecting this alignment.
    pub fn control_word(self) -> &'static str {
        match self {
            Alignment::Left => "ql",
            Alignment::Center => "qc",
            Alignment::Right => "qr",
        }
    }
}

/// Character formatting carried by an inline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharFormat {
    pub bold: bool,
    pub italic: bool,
}

impl CharFormat {
    pub const PLAIN: CharFormat = CharFormat {
        bold: false,
        italic: false,
    };

    /// Apply an inline toggle on top of this format.
    pub fn with(self, toggle: InlineToggle) -> Self {
        match toggle {
            InlineToggle::Bold => CharFormat { bold: true, ..self },
            InlineToggle::Italic => CharFormat {
                italic: true,
                ..self
            },
        }
    }

    pub fn union(self, other: CharFormat) -> Self {
        CharFormat {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
        }
    }
}

/// Fully resolved paragraph formatting.
///
/// Indents are in twips (1/20 pt), font size in half-points, as RTF expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockStyle {
    pub alignment: Alignment,
    pub left_indent: u32,
    pub right_indent: u32,
    pub font_size: u16,
    /// Headings and subtitles set the whole paragraph bold.
    pub bold: bool,
    pub italic: bool,
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            left_indent: 0,
            right_indent: 0,
            font_size: BODY_FONT_SIZE,
            bold: false,
            italic: false,
        }
    }
}

impl BlockStyle {
    /// Character formatting every run inside this paragraph starts from.
    pub fn char_format(&self) -> CharFormat {
        CharFormat {
            bold: self.bold,
            italic: self.italic,
        }
    }

    /// Resolve a child paragraph's style: properties the directive sets win,
    /// everything else is inherited.
    pub fn overlay(self, directive: BlockDirective) -> Self {
        Self {
            alignment: directive.alignment.unwrap_or(self.alignment),
            left_indent: directive.left_indent.unwrap_or(self.left_indent),
            right_indent: directive.right_indent.unwrap_or(self.right_indent),
            font_size: directive.font_size.unwrap_or(self.font_size),
            bold: self.bold || directive.bold,
            italic: self.italic || directive.italic,
        }
    }
}

/// Structural role of a block-level element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRole {
    Paragraph,
    Title,
    Subtitle,
    Epigraph,
    TextAuthor,
    Poem,
    Stanza,
    Verse,
}

/// Paragraph properties a tag sets; `None` means inherit from the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockDirective {
    pub alignment: Option<Alignment>,
    pub left_indent: Option<u32>,
    pub right_indent: Option<u32>,
    pub font_size: Option<u16>,
    pub bold: bool,
    pub italic: bool,
}

/// Character-level toggle switched on by an inline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineToggle {
    Bold,
    Italic,
}

/// How the builder treats an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Block(BlockRole),
    Inline(InlineToggle),
    Section,
    Title,
    /// Unknown or purely structural: children are walked transparently.
    Transparent,
}

const BLOCK_TAGS: &[(&str, BlockRole)] = &[
    ("p", BlockRole::Paragraph),
    ("subtitle", BlockRole::Subtitle),
    ("epigraph", BlockRole::Epigraph),
    ("text-author", BlockRole::TextAuthor),
    ("poem", BlockRole::Poem),
    ("stanza", BlockRole::Stanza),
    ("v", BlockRole::Verse),
];

const INLINE_TAGS: &[(&str, InlineToggle)] = &[
    ("strong", InlineToggle::Bold),
    ("b", InlineToggle::Bold),
    ("emphasis", InlineToggle::Italic),
    ("i", InlineToggle::Italic),
];

/// Classify an element by its local name.
pub fn classify(local_name: &str) -> TagClass {
    match local_name {
        "section" => return TagClass::Section,
        "title" => return TagClass::Title,
        _ => {}
    }
    if let Some((_, role)) = BLOCK_TAGS.iter().find(|(tag, _)| *tag == local_name) {
        return TagClass::Block(*role);
    }
    if let Some((_, toggle)) = INLINE_TAGS.iter().find(|(tag, _)| *tag == local_name) {
        return TagClass::Inline(*toggle);
    }
    TagClass::Transparent
}

/// Paragraph directive for a block role.
pub fn block_directive(role: BlockRole) -> BlockDirective {
    match role {
        BlockRole::Title => BlockDirective {
            alignment: Some(Alignment::Center),
            font_size: Some(HEADING_FONT_SIZE),
            bold: true,
            ..Default::default()
        },
        BlockRole::Subtitle => BlockDirective {
            alignment: Some(Alignment::Center),
            font_size: Some(SUBTITLE_FONT_SIZE),
            bold: true,
            ..Default::default()
        },
        BlockRole::Epigraph => BlockDirective {
            left_indent: Some(720),
            right_indent: Some(720),
            italic: true,
            ..Default::default()
        },
        BlockRole::TextAuthor => BlockDirective {
            alignment: Some(Alignment::Right),
            italic: true,
            ..Default::default()
        },
        BlockRole::Poem => BlockDirective {
            left_indent: Some(360),
            ..Default::default()
        },
        BlockRole::Paragraph | BlockRole::Stanza | BlockRole::Verse => BlockDirective::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tags() {
        assert_eq!(classify("p"), TagClass::Block(BlockRole::Paragraph));
        assert_eq!(classify("text-author"), TagClass::Block(BlockRole::TextAuthor));
        assert_eq!(classify("v"), TagClass::Block(BlockRole::Verse));
        assert_eq!(classify("strong"), TagClass::Inline(InlineToggle::Bold));
        assert_eq!(classify("i"), TagClass::Inline(InlineToggle::Italic));
        assert_eq!(classify("section"), TagClass::Section);
        assert_eq!(classify("title"), TagClass::Title);
        assert_eq!(classify("image"), TagClass::Transparent);
    }

    #[test]
    fn test_overlay_inherits_unset_properties() {
        let epigraph = BlockStyle::default().overlay(block_directive(BlockRole::Epigraph));
        let author = epigraph.overlay(block_directive(BlockRole::TextAuthor));

        assert_eq!(author.alignment, Alignment::Right);
        assert_eq!(author.left_indent, 720);
        assert_eq!(author.right_indent, 720);
        assert!(author.italic);
        assert!(!author.bold);
        assert_eq!(author.font_size, BODY_FONT_SIZE);
    }

    #[test]
    fn test_heading_style() {
        let title = BlockStyle::default().overlay(block_directive(BlockRole::Title));
        assert_eq!(title.alignment, Alignment::Center);
        assert_eq!(title.font_size, HEADING_FONT_SIZE);
        assert_eq!(title.char_format(), CharFormat { bold: true, italic: false });
    }

    #[test]
    fn test_char_format_toggles() {
        let f = CharFormat::PLAIN.with(InlineToggle::Bold).with(InlineToggle::Italic);
        assert!(f.bold && f.italic);
        assert_eq!(CharFormat::PLAIN.union(f), f);
    }
}
