//! # fb2pager
//!
//! Reader core for FictionBook 2 (FB2) e-books: builds a styled chapter
//! model from FB2 XML and paginates it to a fixed viewport as RTF pages.
//!
//! ## Features
//!
//! - FB2 parsing with encoding detection (UTF-8, windows-1251, KOI8-R, ...)
//! - One chapter per top-level section, with titles and heading styles
//! - Word- and hyphen-aware pagination against a pluggable [`LayoutOracle`]
//! - Global page numbering over per-chapter pages via [`PageIndex`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use fb2pager::{LoadOptions, MonospaceOracle, load_document_from_path};
//!
//! let oracle = MonospaceOracle::default();
//! let doc = load_document_from_path("book.fb2", &LoadOptions::default(), &oracle).unwrap();
//!
//! let index = doc.page_index();
//! let location = index.locate(12);
//! println!("page 12 of {} is in {:?}", index.total_pages(), doc.chapters()[location.chapter].title());
//! let rtf = doc.page(location).unwrap();
//! # let _ = rtf;
//! ```
//!
//! ## Layout
//!
//! Pagination never measures text itself. Implement [`LayoutOracle`] on top
//! of the rich-text widget that will display the pages, or use
//! [`MonospaceOracle`] for a toolkit-free fixed-cell estimate:
//!
//! ```
//! use fb2pager::{LayoutError, LayoutOracle};
//!
//! struct Widget;
//!
//! impl LayoutOracle for Widget {
//!     fn measure(&self, markup: &str, width: u32) -> Result<f32, LayoutError> {
//!         // Load `markup` into an off-screen control `width` pixels wide
//!         // and report the y coordinate past its last character.
//!         let _ = (markup, width);
//!         Ok(0.0)
//!     }
//! }
//! ```

pub mod error;
pub mod fb2;
pub mod io;
pub mod layout;
pub mod load;
pub mod model;
pub mod page_index;
pub mod paginate;
pub mod rtf;
pub mod style;
pub(crate) mod util;

pub use error::{Error, Result};
pub use fb2::{BuildOptions, NestedTitles, read_fb2};
pub use layout::{LayoutError, LayoutOracle, MonospaceOracle};
pub use load::{
    LoadOptions, load_document, load_document_from_path, load_document_from_source,
    load_document_with_cancel,
};
pub use model::{Chapter, Document, Metadata, PageDimensions};
pub use page_index::{PageIndex, PageLocation, locate, resolve};
pub use paginate::{CancelToken, NeverCancel, PaginationConfig, PaginationStrategy};
