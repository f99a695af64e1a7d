//! Load entry points: decode, build and paginate in one call.

use std::io;
use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::fb2::{self, BuildOptions};
use crate::io::{ByteSource, FileSource};
use crate::layout::LayoutOracle;
use crate::model::{Document, PageDimensions};
use crate::paginate::{CancelToken, NeverCancel, PaginationConfig};

/// Everything a load needs besides the bytes and the oracle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    pub dimensions: PageDimensions,
    pub build: BuildOptions,
    pub pagination: PaginationConfig,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(mut self, dimensions: PageDimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_build(mut self, build: BuildOptions) -> Self {
        self.build = build;
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }
}

/// Build and paginate a document from FB2 bytes.
///
/// On success every chapter has at least one page. Any error leaves no
/// document behind.
pub fn load_document(
    bytes: &[u8],
    options: &LoadOptions,
    oracle: &dyn LayoutOracle,
) -> Result<Document> {
    load_document_with_cancel(bytes, options, oracle, &NeverCancel)
}

/// [`load_document`] with a cancellation check before each chapter.
pub fn load_document_with_cancel(
    bytes: &[u8],
    options: &LoadOptions,
    oracle: &dyn LayoutOracle,
    cancel: &dyn CancelToken,
) -> Result<Document> {
    let dimensions = options.dimensions;
    if !dimensions.is_valid() {
        return Err(Error::InvalidViewport {
            width: dimensions.width,
            height: dimensions.height,
        });
    }
    options.pagination.validate()?;
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let mut document = fb2::read_fb2(bytes, &options.build)?;
    document.repaginate_with_cancel(dimensions, oracle, &options.pagination, cancel)?;

    info!(
        "loaded {:?}: {} chapters, {} pages at {}x{}",
        document.metadata().title,
        document.chapters().len(),
        document.total_pages(),
        dimensions.width,
        dimensions.height
    );
    Ok(document)
}

/// Load from any [`ByteSource`].
pub fn load_document_from_source(
    source: &dyn ByteSource,
    options: &LoadOptions,
    oracle: &dyn LayoutOracle,
) -> Result<Document> {
    info!("reading {} ({} bytes)", source.describe(), source.len());
    let bytes = source.read_all()?;
    load_document(&bytes, options, oracle)
}

/// Load an FB2 file. A missing file is reported as [`Error::NotFound`].
pub fn load_document_from_path(
    path: impl AsRef<Path>,
    options: &LoadOptions,
    oracle: &dyn LayoutOracle,
) -> Result<Document> {
    let path = path.as_ref();
    let source = FileSource::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    load_document_from_source(&source, options, oracle)
}
