//! Layout oracle interface.
//!
//! Pagination never lays text out itself. It asks a [`LayoutOracle`] how
//! tall a piece of RTF markup becomes when word-wrapped to the viewport
//! width, which keeps the engine independent of any GUI toolkit.

mod monospace;

pub use monospace::MonospaceOracle;

use thiserror::Error;

/// Errors reported by a layout oracle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("content is too complex to lay out")]
    Unsupported,

    #[error("layout engine reported an invalid extent: {0}")]
    InvalidMeasurement(f32),

    #[error("layout engine extent shrank when the slice grew to {end} characters")]
    NotMonotonic { end: usize },

    #[error("layout engine error: {0}")]
    Engine(String),
}

/// Reports the rendered vertical extent of RTF markup.
///
/// Implementations must be deterministic and side-effect free, and the
/// extent of a slice must never shrink when characters are appended to it.
/// The pagination engine's binary search relies on that monotonicity and
/// reports [`LayoutError::NotMonotonic`] when its measurements contradict it.
pub trait LayoutOracle: Send + Sync {
    /// Height of `markup` word-wrapped at `width`, in the same units as the
    /// viewport height.
    fn measure(&self, markup: &str, width: u32) -> Result<f32, LayoutError>;
}
