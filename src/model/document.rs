use crate::error::Result;
use crate::layout::{LayoutError, LayoutOracle};
use crate::page_index::{PageIndex, PageLocation};
use crate::paginate::{self, CancelToken, NeverCancel, PaginationConfig};
use crate::rtf::StyledText;

use super::{ChapterBody, Metadata};

/// Viewport size pages are fitted to, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageDimensions {
    pub width: u32,
    pub height: u32,
}

impl PageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::new(860, 580)
    }
}

/// One top-level section of the book.
#[derive(Debug, Clone)]
pub struct Chapter {
    title: String,
    body: ChapterBody,
    text: StyledText,
    content: String,
    pages: Vec<String>,
    layout_error: Option<LayoutError>,
}

impl Chapter {
    /// Create an unpaginated chapter. `content` is rendered immediately.
    pub fn new(title: impl Into<String>, body: ChapterBody) -> Self {
        let text = StyledText::from_body(&body);
        let content = text.render_all();
        Self {
            title: title.into(),
            body,
            text,
            content,
            pages: Vec::new(),
            layout_error: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The block tree the chapter was rendered from.
    pub fn body(&self) -> &ChapterBody {
        &self.body
    }

    /// Full RTF document for the whole chapter.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Paginated RTF slices; empty until the chapter is paginated.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The chapter text as the pagination engine sees it.
    pub fn plain_text(&self) -> String {
        self.text.plain_string()
    }

    pub(crate) fn styled_text(&self) -> &StyledText {
        &self.text
    }

    /// The oracle failure that forced the single-page fallback, if any.
    pub fn layout_error(&self) -> Option<&LayoutError> {
        self.layout_error.as_ref()
    }

    pub(crate) fn set_pages(&mut self, pages: Vec<String>, layout_error: Option<LayoutError>) {
        self.pages = pages;
        self.layout_error = layout_error;
    }
}

/// A loaded book: ordered chapters plus the viewport they were paginated for.
#[derive(Debug, Clone)]
pub struct Document {
    metadata: Metadata,
    chapters: Vec<Chapter>,
    dimensions: PageDimensions,
}

impl Document {
    /// Wrap built chapters; call [`Document::repaginate`] before reading pages.
    pub fn new(metadata: Metadata, chapters: Vec<Chapter>) -> Self {
        Self {
            metadata,
            chapters,
            dimensions: PageDimensions::default(),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Dimensions used by the last successful pagination.
    pub fn dimensions(&self) -> PageDimensions {
        self.dimensions
    }

    pub fn total_pages(&self) -> usize {
        self.chapters.iter().map(Chapter::page_count).sum()
    }

    /// RTF markup of one page.
    pub fn page(&self, location: PageLocation) -> Option<&str> {
        self.chapters
            .get(location.chapter)?
            .pages
            .get(location.page)
            .map(String::as_str)
    }

    /// Global page number lookups over this document.
    pub fn page_index(&self) -> PageIndex<'_> {
        PageIndex::new(self)
    }

    /// Re-fit every chapter to new dimensions.
    ///
    /// All chapters are paginated before any page list is replaced, so on
    /// error the document keeps its previous pages and dimensions.
    pub fn repaginate(
        &mut self,
        dimensions: PageDimensions,
        oracle: &dyn LayoutOracle,
        config: &PaginationConfig,
    ) -> Result<()> {
        self.repaginate_with_cancel(dimensions, oracle, config, &NeverCancel)
    }

    /// [`Document::repaginate`] with a cancellation check before each chapter.
    pub fn repaginate_with_cancel(
        &mut self,
        dimensions: PageDimensions,
        oracle: &dyn LayoutOracle,
        config: &PaginationConfig,
        cancel: &dyn CancelToken,
    ) -> Result<()> {
        let results = paginate::paginate_chapters(&self.chapters, dimensions, oracle, config, cancel)?;
        for (chapter, outcome) in self.chapters.iter_mut().zip(results) {
            chapter.set_pages(outcome.pages, outcome.layout_error);
        }
        self.dimensions = dimensions;
        Ok(())
    }
}
