//! FictionBook 2 input.
//!
//! ```text
//! bytes --decode--> str --parse--> Element tree --build--> Document
//! ```
//!
//! The builder only sees the owned [`Element`] tree, never the XML reader.

mod builder;
mod metadata;
mod tree;

pub use builder::{
    BuildOptions, NestedTitles, START_OF_BOOK, UNTITLED, build, flatten, resolve_title,
};
pub use metadata::parse_metadata;
pub use tree::{Element, FB2_NAMESPACE, Node, parse};

use crate::error::Result;
use crate::model::Document;
use crate::util::decode_text;

/// Decode, parse and build an unpaginated document from raw FB2 bytes.
pub fn read_fb2(bytes: &[u8], options: &BuildOptions) -> Result<Document> {
    let text = decode_text(bytes);
    let root = parse(&text)?;
    build(&root, options)
}
