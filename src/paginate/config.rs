use crate::error::{Error, Result};

/// How the engine searches for the point where a page overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationStrategy {
    /// Binary search over candidate end offsets: O(log n) measurements per
    /// page.
    #[default]
    Bisect,
    /// Grow the page one character at a time.
    Linear,
}

/// Configuration for pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// Fraction of the viewport height a page may fill, in `(0, 1]`.
    pub fill_threshold: f32,
    pub strategy: PaginationStrategy,
    /// Fail the load when the oracle cannot lay a chapter out, instead of
    /// keeping that chapter as a single unpaginated page.
    pub strict_layout: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            fill_threshold: 0.8,
            strategy: PaginationStrategy::Bisect,
            strict_layout: false,
        }
    }
}

impl PaginationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_threshold(mut self, fill_threshold: f32) -> Self {
        self.fill_threshold = fill_threshold;
        self
    }

    pub fn with_strategy(mut self, strategy: PaginationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_strict_layout(mut self, strict_layout: bool) -> Self {
        self.strict_layout = strict_layout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fill_threshold > 0.0 && self.fill_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "fill threshold must be in (0, 1], got {}",
                self.fill_threshold
            )));
        }
        Ok(())
    }
}
