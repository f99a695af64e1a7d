//! Input sources for FB2 bytes.

mod byte_source;

pub use byte_source::{ByteSource, FileSource, MemorySource};
