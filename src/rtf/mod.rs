//! RTF output.
//!
//! Chapters and pages are RTF documents sharing one fixed preamble. This
//! module renders styled text into that format and reads the visible text
//! back out of it.

mod plain;
mod stream;
mod writer;

pub use plain::plain_text;
pub use stream::StyledText;
pub use writer::{FOOTER, HEADER, placeholder_page};
