//! Error types for fb2pager operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::layout::LayoutError;

/// Errors that can occur while loading or paginating a book.
///
/// Every variant except [`Error::LayoutFailure`] aborts the load as a whole;
/// no partially built [`Document`](crate::Document) is ever returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid FB2: {0}")]
    Format(String),

    #[error("document contains no readable chapters")]
    EmptyDocument,

    #[error("invalid viewport {width}x{height}: both dimensions must be positive")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("layout failed for chapter {chapter}: {source}")]
    LayoutFailure {
        chapter: usize,
        #[source]
        source: LayoutError,
    },

    #[error("load cancelled")]
    Cancelled,
}

impl Error {
    /// True for malformed XML as well as well-formed XML that is not FB2.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::Xml(_) | Error::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
