//! Global page numbering.
//!
//! Readers show one running page number across the whole book, while pages
//! are stored per chapter. [`PageIndex`] converts between the two using the
//! chapters' page counts. Global numbers are 1-based; locations are 0-based.

use crate::model::{Chapter, Document};

/// A page addressed by chapter and page within that chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PageLocation {
    pub chapter: usize,
    pub page: usize,
}

impl PageLocation {
    pub fn new(chapter: usize, page: usize) -> Self {
        Self { chapter, page }
    }
}

/// Read-only page numbering over a paginated document.
#[derive(Debug, Clone, Copy)]
pub struct PageIndex<'a> {
    chapters: &'a [Chapter],
}

impl<'a> PageIndex<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            chapters: document.chapters(),
        }
    }

    pub fn total_pages(&self) -> usize {
        self.chapters.iter().map(Chapter::page_count).sum()
    }

    /// Location of global page `n`.
    ///
    /// `n` is clamped to `1..=total_pages()`; a document without pages
    /// always locates to `(0, 0)`. Chapters without pages are skipped.
    pub fn locate(&self, n: i64) -> PageLocation {
        let total = self.total_pages();
        if total == 0 {
            return PageLocation::default();
        }
        let n = usize::try_from(n.max(1)).unwrap_or(usize::MAX).min(total);

        let mut traversed = 0;
        for (index, chapter) in self.chapters.iter().enumerate() {
            let count = chapter.page_count();
            if count == 0 {
                continue;
            }
            if n <= traversed + count {
                return PageLocation::new(index, n - traversed - 1);
            }
            traversed += count;
        }

        let last = self.chapters.len().saturating_sub(1);
        let page = self
            .chapters
            .last()
            .map_or(0, |chapter| chapter.page_count().saturating_sub(1));
        PageLocation::new(last, page)
    }

    /// Global number of page `page` in chapter `chapter`.
    ///
    /// A document without pages resolves everything to 1.
    pub fn resolve(&self, chapter: usize, page: usize) -> usize {
        if self.total_pages() == 0 {
            return 1;
        }
        let preceding: usize = self
            .chapters
            .iter()
            .take(chapter)
            .map(Chapter::page_count)
            .sum();
        preceding + page + 1
    }

    pub fn first(&self) -> Option<PageLocation> {
        (self.total_pages() > 0).then(|| self.locate(1))
    }

    pub fn last(&self) -> Option<PageLocation> {
        let total = self.total_pages();
        (total > 0).then(|| self.locate(total as i64))
    }

    /// The page after `location`, or `None` on the last page.
    pub fn next(&self, location: PageLocation) -> Option<PageLocation> {
        let n = self.resolve(location.chapter, location.page);
        (n < self.total_pages()).then(|| self.locate(n as i64 + 1))
    }

    /// The page before `location`, or `None` on the first page.
    pub fn previous(&self, location: PageLocation) -> Option<PageLocation> {
        let n = self.resolve(location.chapter, location.page);
        (n > 1 && self.total_pages() > 0).then(|| self.locate(n as i64 - 1))
    }

    /// First page of chapter `chapter`, for table-of-contents jumps.
    pub fn chapter_start(&self, chapter: usize) -> Option<PageLocation> {
        self.chapters
            .get(chapter)
            .filter(|c| c.page_count() > 0)
            .map(|_| PageLocation::new(chapter, 0))
    }
}

/// Location of global page `n` in `document`. See [`PageIndex::locate`].
pub fn locate(document: &Document, n: i64) -> PageLocation {
    document.page_index().locate(n)
}

/// Global number of a page in `document`. See [`PageIndex::resolve`].
pub fn resolve(document: &Document, chapter: usize, page: usize) -> usize {
    document.page_index().resolve(chapter, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterBody, Metadata};
    use proptest::prelude::*;

    fn document(counts: &[usize]) -> Document {
        let chapters = counts
            .iter()
            .map(|&count| {
                let mut chapter = Chapter::new("c", ChapterBody::default());
                chapter.set_pages(vec![String::new(); count], None);
                chapter
            })
            .collect();
        Document::new(Metadata::default(), chapters)
    }

    #[test]
    fn test_locate_walks_chapters() {
        let doc = document(&[2, 3, 1]);
        let index = doc.page_index();
        assert_eq!(index.total_pages(), 6);
        assert_eq!(index.locate(1), PageLocation::new(0, 0));
        assert_eq!(index.locate(2), PageLocation::new(0, 1));
        assert_eq!(index.locate(3), PageLocation::new(1, 0));
        assert_eq!(index.locate(5), PageLocation::new(1, 2));
        assert_eq!(index.locate(6), PageLocation::new(2, 0));
    }

    #[test]
    fn test_locate_clamps() {
        let doc = document(&[2, 3]);
        assert_eq!(locate(&doc, 0), PageLocation::new(0, 0));
        assert_eq!(locate(&doc, -7), PageLocation::new(0, 0));
        assert_eq!(locate(&doc, 99), PageLocation::new(1, 2));
        assert_eq!(locate(&doc, i64::MAX), PageLocation::new(1, 2));
    }

    #[test]
    fn test_empty_documents() {
        let doc = document(&[0]);
        assert_eq!(locate(&doc, 5), PageLocation::new(0, 0));
        assert_eq!(resolve(&doc, 0, 0), 1);
        assert_eq!(doc.page_index().first(), None);
        assert_eq!(doc.page_index().last(), None);

        let doc = document(&[]);
        assert_eq!(locate(&doc, 1), PageLocation::new(0, 0));
    }

    #[test]
    fn test_zero_page_chapters_are_skipped() {
        let doc = document(&[0, 2, 0, 1]);
        let index = doc.page_index();
        assert_eq!(index.locate(1), PageLocation::new(1, 0));
        assert_eq!(index.locate(3), PageLocation::new(3, 0));
        assert_eq!(index.resolve(3, 0), 3);
        assert_eq!(index.chapter_start(2), None);
        assert_eq!(index.chapter_start(3), Some(PageLocation::new(3, 0)));
    }

    #[test]
    fn test_resolve_counts_preceding_chapters() {
        let doc = document(&[2, 3, 1]);
        assert_eq!(resolve(&doc, 0, 0), 1);
        assert_eq!(resolve(&doc, 1, 2), 5);
        assert_eq!(resolve(&doc, 2, 0), 6);
    }

    #[test]
    fn test_navigation() {
        let doc = document(&[2, 1]);
        let index = doc.page_index();
        let first = index.first().unwrap();
        assert_eq!(first, PageLocation::new(0, 0));
        assert_eq!(index.previous(first), None);

        let second = index.next(first).unwrap();
        assert_eq!(second, PageLocation::new(0, 1));
        let third = index.next(second).unwrap();
        assert_eq!(third, PageLocation::new(1, 0));
        assert_eq!(index.next(third), None);
        assert_eq!(index.last(), Some(third));
        assert_eq!(index.previous(third), Some(second));
    }

    proptest! {
        #[test]
        fn locate_inverts_resolve(counts in prop::collection::vec(0usize..5, 1..8)) {
            let doc = document(&counts);
            let index = doc.page_index();
            for (chapter, &count) in counts.iter().enumerate() {
                for page in 0..count {
                    let n = index.resolve(chapter, page);
                    prop_assert_eq!(index.locate(n as i64), PageLocation::new(chapter, page));
                }
            }
        }

        #[test]
        fn resolve_inverts_locate(counts in prop::collection::vec(0usize..5, 1..8), n in -3i64..40) {
            let doc = document(&counts);
            let index = doc.page_index();
            let total = index.total_pages();
            prop_assume!(total > 0);
            let location = index.locate(n);
            let expected = n.clamp(1, total as i64) as usize;
            prop_assert_eq!(index.resolve(location.chapter, location.page), expected);
        }
    }
}
