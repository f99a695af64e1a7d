//! Core data model.
//!
//! This module contains:
//! - Book metadata
//! - The styled block tree a chapter is built from
//! - Chapters, their rendered content and pages
//! - The document that owns them

mod document;
mod metadata;
mod node;

pub use document::{Chapter, Document, PageDimensions};
pub use metadata::Metadata;
pub use node::{ChapterBody, Flow, InlineRun, StyledBlock};
