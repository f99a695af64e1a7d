//! Pagination engine.
//!
//! Splits a chapter's styled text into RTF slices that fit the viewport.
//! For each page the engine finds the first character at which the slice
//! overflows `fill_threshold * height`, then backs up to the nearest
//! whitespace or hyphen so words stay whole. When the overflowing range has
//! no break character at all the page is cut at the overflow point.

mod config;

pub use config::{PaginationConfig, PaginationStrategy};

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::layout::{LayoutError, LayoutOracle};
use crate::model::{Chapter, PageDimensions};
use crate::rtf::{StyledText, placeholder_page};

/// Cooperative cancellation hook, polled between chapters.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

/// Token that never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelToken for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Slice length tried first on a chapter's opening page; later pages start
/// from the length of the page before.
const INITIAL_PAGE_GUESS: usize = 256;

/// Fits styled text to one viewport.
pub struct Paginator<'a> {
    oracle: &'a dyn LayoutOracle,
    dimensions: PageDimensions,
    config: &'a PaginationConfig,
}

impl<'a> Paginator<'a> {
    pub fn new(
        oracle: &'a dyn LayoutOracle,
        dimensions: PageDimensions,
        config: &'a PaginationConfig,
    ) -> Self {
        Self {
            oracle,
            dimensions,
            config,
        }
    }

    /// Height a page may reach before it is considered full.
    pub fn threshold(&self) -> f32 {
        self.config.fill_threshold * self.dimensions.height as f32
    }

    /// Split `text` into page-sized RTF documents.
    ///
    /// Text without any visible character yields a single placeholder page.
    pub fn paginate(&self, text: &StyledText) -> std::result::Result<Vec<String>, LayoutError> {
        if text.is_blank() {
            return Ok(vec![placeholder_page()]);
        }

        let mut pages = Vec::new();
        let mut start = 0;
        let mut guess = INITIAL_PAGE_GUESS;
        while start < text.len() {
            let end = self.next_page_end(text, start, guess)?;
            trace!("page {} covers characters {start}..{end}", pages.len() + 1);
            pages.push(text.render(start..end));
            guess = end - start;
            start = end;
        }
        Ok(pages)
    }

    fn next_page_end(
        &self,
        text: &StyledText,
        start: usize,
        guess: usize,
    ) -> std::result::Result<usize, LayoutError> {
        let overflow = match self.config.strategy {
            PaginationStrategy::Bisect => self.first_overflow_bisect(text, start, guess)?,
            PaginationStrategy::Linear => self.first_overflow_linear(text, start)?,
        };
        Ok(match overflow {
            Some(end) => break_point(text.chars(), start, end),
            None => text.len(),
        })
    }

    /// Smallest `end` such that `start..end` overflows, by unit growth.
    fn first_overflow_linear(
        &self,
        text: &StyledText,
        start: usize,
    ) -> std::result::Result<Option<usize>, LayoutError> {
        for end in start + 1..=text.len() {
            if self.height(text, start, end)? > self.threshold() {
                return Ok(Some(end));
            }
        }
        Ok(None)
    }

    /// Smallest `end` such that `start..end` overflows.
    ///
    /// Gallops from `start + guess`, doubling the step until a slice
    /// overflows, then bisects between the last fitting end and that one.
    /// Each page therefore costs a logarithmic number of measurements of
    /// roughly page-sized slices. The heights taken along the way are
    /// checked to grow with the slice.
    fn first_overflow_bisect(
        &self,
        text: &StyledText,
        start: usize,
        guess: usize,
    ) -> std::result::Result<Option<usize>, LayoutError> {
        let len = text.len();
        let mut measured = Vec::new();

        let mut fits = start;
        let mut step = guess.max(1);
        let overflow = loop {
            let end = start.saturating_add(step).min(len);
            if self.overflows_at(text, start, end, &mut measured)? {
                break end;
            }
            if end == len {
                check_monotonic(&mut measured)?;
                return Ok(None);
            }
            fits = end;
            step = step.saturating_mul(2);
        };

        // every end up to `fits` fits and `start..overflow` overflows
        let (mut lo, mut hi) = (fits + 1, overflow);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.overflows_at(text, start, mid, &mut measured)? {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        check_monotonic(&mut measured)?;
        Ok(Some(hi))
    }

    fn overflows_at(
        &self,
        text: &StyledText,
        start: usize,
        end: usize,
        measured: &mut Vec<(usize, f32)>,
    ) -> std::result::Result<bool, LayoutError> {
        let height = self.height(text, start, end)?;
        measured.push((end, height));
        Ok(height > self.threshold())
    }

    fn height(&self, text: &StyledText, start: usize, end: usize) -> std::result::Result<f32, LayoutError> {
        let height = self
            .oracle
            .measure(&text.render(start..end), self.dimensions.width)?;
        if !height.is_finite() || height < 0.0 {
            return Err(LayoutError::InvalidMeasurement(height));
        }
        Ok(height)
    }
}

/// Fail if the heights measured from one page start ever shrink as the
/// slice grows.
fn check_monotonic(measured: &mut [(usize, f32)]) -> std::result::Result<(), LayoutError> {
    measured.sort_unstable_by_key(|&(end, _)| end);
    match measured.windows(2).find(|pair| pair[1].1 < pair[0].1) {
        Some(pair) => Err(LayoutError::NotMonotonic { end: pair[1].0 }),
        None => Ok(()),
    }
}

/// Where to end a page whose slice first overflows at `overflow_end`.
///
/// Breaks after the last whitespace or hyphen in `start..overflow_end`;
/// without one the page is cut at `overflow_end` itself. The result is
/// always greater than `start`, so pagination makes progress.
pub fn break_point(chars: &[char], start: usize, overflow_end: usize) -> usize {
    chars[start..overflow_end]
        .iter()
        .rposition(|c| c.is_whitespace() || *c == '-')
        .map(|i| start + i + 1)
        .unwrap_or(overflow_end)
}

/// Paginate one chapter.
pub fn paginate_chapter(
    chapter: &Chapter,
    oracle: &dyn LayoutOracle,
    dimensions: PageDimensions,
    config: &PaginationConfig,
) -> std::result::Result<Vec<String>, LayoutError> {
    Paginator::new(oracle, dimensions, config).paginate(chapter.styled_text())
}

/// Pages computed for one chapter, not yet installed.
#[derive(Debug)]
pub(crate) struct ChapterPages {
    pub pages: Vec<String>,
    pub layout_error: Option<LayoutError>,
}

/// Paginate every chapter in order without touching them.
///
/// A chapter the oracle cannot measure becomes one page holding its whole
/// content, unless `config.strict_layout` is set.
pub(crate) fn paginate_chapters(
    chapters: &[Chapter],
    dimensions: PageDimensions,
    oracle: &dyn LayoutOracle,
    config: &PaginationConfig,
    cancel: &dyn CancelToken,
) -> Result<Vec<ChapterPages>> {
    if !dimensions.is_valid() {
        return Err(Error::InvalidViewport {
            width: dimensions.width,
            height: dimensions.height,
        });
    }
    config.validate()?;

    let paginator = Paginator::new(oracle, dimensions, config);
    chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            match paginator.paginate(chapter.styled_text()) {
                Ok(pages) => {
                    debug!("chapter {index} {:?}: {} pages", chapter.title(), pages.len());
                    Ok(ChapterPages {
                        pages,
                        layout_error: None,
                    })
                }
                Err(source) if config.strict_layout => Err(Error::LayoutFailure {
                    chapter: index,
                    source,
                }),
                Err(source) => {
                    warn!(
                        "chapter {index} {:?} could not be laid out ({source}); keeping it as one page",
                        chapter.title()
                    );
                    Ok(ChapterPages {
                        pages: vec![chapter.content().to_string()],
                        layout_error: Some(source),
                    })
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::layout::MonospaceOracle;
    use crate::model::{ChapterBody, Flow, InlineRun, StyledBlock};
    use crate::rtf::plain_text;
    use crate::style::{BlockRole, BlockStyle, CharFormat};

    fn chapter(paragraphs: &[&str]) -> Chapter {
        let content = paragraphs
            .iter()
            .map(|text| {
                Flow::Block(StyledBlock {
                    role: BlockRole::Paragraph,
                    style: BlockStyle::default(),
                    content: vec![Flow::Run(InlineRun {
                        text: text.to_string(),
                        format: CharFormat::PLAIN,
                    })],
                })
            })
            .collect();
        Chapter::new("Test", ChapterBody::new(content))
    }

    /// One unit of height per visible character.
    struct CharCountOracle;

    impl LayoutOracle for CharCountOracle {
        fn measure(&self, markup: &str, _width: u32) -> std::result::Result<f32, LayoutError> {
            Ok(plain_text(markup).chars().count() as f32)
        }
    }

    struct FailingOracle;

    impl LayoutOracle for FailingOracle {
        fn measure(&self, _markup: &str, _width: u32) -> std::result::Result<f32, LayoutError> {
            Err(LayoutError::Unsupported)
        }
    }

    struct NanOracle;

    impl LayoutOracle for NanOracle {
        fn measure(&self, _markup: &str, _width: u32) -> std::result::Result<f32, LayoutError> {
            Ok(f32::NAN)
        }
    }

    /// Height falls as the slice grows, until ten characters overflow.
    struct ShrinkingOracle;

    impl LayoutOracle for ShrinkingOracle {
        fn measure(&self, markup: &str, _width: u32) -> std::result::Result<f32, LayoutError> {
            let n = plain_text(markup).chars().count();
            Ok(if n >= 10 { 100.0 } else { (10 - n) as f32 })
        }
    }

    /// Monospace layout that totals the markup it is handed.
    #[derive(Default)]
    struct CountingOracle {
        bytes: AtomicUsize,
    }

    impl LayoutOracle for CountingOracle {
        fn measure(&self, markup: &str, width: u32) -> std::result::Result<f32, LayoutError> {
            self.bytes.fetch_add(markup.len(), Ordering::Relaxed);
            MonospaceOracle::default().measure(markup, width)
        }
    }

    fn measured_bytes(words: usize, strategy: PaginationStrategy) -> usize {
        let text = vec!["lorem"; words].join(" ");
        let oracle = CountingOracle::default();
        let config = PaginationConfig::default().with_strategy(strategy);
        paginate_chapter(&chapter(&[text.as_str()]), &oracle, PageDimensions::new(400, 200), &config).unwrap();
        oracle.bytes.load(Ordering::Relaxed)
    }

    fn page_texts(pages: &[String]) -> Vec<String> {
        pages.iter().map(|p| plain_text(p)).collect()
    }

    #[test]
    fn test_break_point_prefers_whitespace_and_hyphens() {
        let chars: Vec<char> = "hello world".chars().collect();
        assert_eq!(break_point(&chars, 0, 8), 6);

        let chars: Vec<char> = "well-known".chars().collect();
        assert_eq!(break_point(&chars, 0, 7), 5);

        let chars: Vec<char> = "abcdefgh".chars().collect();
        assert_eq!(break_point(&chars, 0, 5), 5);
        assert_eq!(break_point(&chars, 3, 4), 4);
    }

    #[test]
    fn test_pages_break_after_whitespace() {
        // threshold 8 characters
        let config = PaginationConfig::default();
        let dims = PageDimensions::new(100, 10);
        let chapter = chapter(&["aaa bbb ccc ddd"]);

        let pages = paginate_chapter(&chapter, &CharCountOracle, dims, &config).unwrap();
        assert_eq!(page_texts(&pages), vec!["aaa bbb ", "ccc ddd"]);
    }

    #[test]
    fn test_unbreakable_token_is_cut() {
        let config = PaginationConfig::default();
        let dims = PageDimensions::new(100, 10);
        let chapter = chapter(&["abcdefghijklmnopqrst"]);

        let pages = paginate_chapter(&chapter, &CharCountOracle, dims, &config).unwrap();
        assert_eq!(page_texts(&pages), vec!["abcdefghi", "jklmnopqr", "st"]);
    }

    #[test]
    fn test_blank_chapter_gets_placeholder_page() {
        let config = PaginationConfig::default();
        let pages =
            paginate_chapter(&chapter(&[]), &FailingOracle, PageDimensions::default(), &config)
                .unwrap();
        assert_eq!(pages, vec![placeholder_page()]);
    }

    #[test]
    fn test_strategies_agree() {
        let text = "The quick brown fox jumps over the lazy dog. Pack my box with \
                    five dozen liquor jugs; sphinx-of-black-quartz judge my vow.";
        let chapter = chapter(&[text, text, "tiny", text]);
        let oracle = MonospaceOracle::new(7.0, 13.0);
        let dims = PageDimensions::new(150, 90);

        let bisect = PaginationConfig::default();
        let linear = PaginationConfig::default().with_strategy(PaginationStrategy::Linear);

        let a = paginate_chapter(&chapter, &oracle, dims, &bisect).unwrap();
        let b = paginate_chapter(&chapter, &oracle, dims, &linear).unwrap();
        assert!(a.len() > 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_pages_stay_under_threshold() {
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do \
                    eiusmod tempor incididunt ut labore et dolore magna aliqua";
        let chapter = chapter(&[text]);
        let oracle = MonospaceOracle::new(10.0, 10.0);
        let dims = PageDimensions::new(120, 50);
        let config = PaginationConfig::default();
        let threshold = config.fill_threshold * dims.height as f32;

        for page in paginate_chapter(&chapter, &oracle, dims, &config).unwrap() {
            assert!(oracle.measure(&page, dims.width).unwrap() <= threshold);
        }
    }

    #[test]
    fn test_bisect_cost_grows_linearly_with_chapter_length() {
        let short = measured_bytes(1000, PaginationStrategy::Bisect);
        let long = measured_bytes(4000, PaginationStrategy::Bisect);
        assert!(long < 6 * short, "{short} bytes for 1000 words, {long} for 4000");
        assert!(long < measured_bytes(4000, PaginationStrategy::Linear) / 4);
    }

    #[test]
    fn test_shrinking_extent_is_reported() {
        let config = PaginationConfig::default();
        let dims = PageDimensions::new(100, 10);
        let chapter = chapter(&["abcdefghijklmnopqrst"]);

        let err = paginate_chapter(&chapter, &ShrinkingOracle, dims, &config).unwrap_err();
        assert!(matches!(err, LayoutError::NotMonotonic { .. }));
    }

    #[test]
    fn test_bisect_follows_short_pages_after_a_long_one() {
        // a long first page primes the guess before a run of short ones
        let long = "x ".repeat(200);
        let chapter = chapter(&[long.as_str(), "a", "b", "c", long.as_str()]);
        let oracle = MonospaceOracle::new(10.0, 10.0);
        let dims = PageDimensions::new(100, 50);

        let bisect = PaginationConfig::default();
        let linear = PaginationConfig::default().with_strategy(PaginationStrategy::Linear);
        assert_eq!(
            paginate_chapter(&chapter, &oracle, dims, &bisect).unwrap(),
            paginate_chapter(&chapter, &oracle, dims, &linear).unwrap()
        );
    }

    #[test]
    fn test_oracle_errors_propagate() {
        let config = PaginationConfig::default();
        let dims = PageDimensions::default();
        assert_eq!(
            paginate_chapter(&chapter(&["text"]), &FailingOracle, dims, &config),
            Err(LayoutError::Unsupported)
        );
        assert!(matches!(
            paginate_chapter(&chapter(&["text"]), &NanOracle, dims, &config),
            Err(LayoutError::InvalidMeasurement(_))
        ));
    }

    #[test]
    fn test_layout_failure_falls_back_to_whole_chapter() {
        let chapters = vec![chapter(&["one"]), chapter(&["two"])];
        let config = PaginationConfig::default();
        let out = paginate_chapters(
            &chapters,
            PageDimensions::default(),
            &FailingOracle,
            &config,
            &NeverCancel,
        )
        .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].pages, vec![chapters[0].content().to_string()]);
        assert_eq!(out[1].layout_error, Some(LayoutError::Unsupported));
    }

    #[test]
    fn test_strict_layout_fails_the_load() {
        let chapters = vec![chapter(&["one"])];
        let config = PaginationConfig::default().with_strict_layout(true);
        let err = paginate_chapters(
            &chapters,
            PageDimensions::default(),
            &FailingOracle,
            &config,
            &NeverCancel,
        )
        .unwrap_err();
        assert!(matches!(err, Error::LayoutFailure { chapter: 0, .. }));
    }

    #[test]
    fn test_invalid_viewport_is_rejected() {
        let chapters = vec![chapter(&["one"])];
        let err = paginate_chapters(
            &chapters,
            PageDimensions::new(0, 100),
            &CharCountOracle,
            &PaginationConfig::default(),
            &NeverCancel,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidViewport { width: 0, height: 100 }));
    }

    #[test]
    fn test_cancellation_is_checked_between_chapters() {
        let chapters = vec![chapter(&["one"])];
        let cancel = AtomicBool::new(true);
        let err = paginate_chapters(
            &chapters,
            PageDimensions::default(),
            &CharCountOracle,
            &PaginationConfig::default(),
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
