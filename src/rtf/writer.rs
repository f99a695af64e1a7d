//! RTF serialization primitives.

use crate::style::{BlockStyle, CharFormat};

/// Document preamble shared by every chapter and page.
///
/// Renderers key their default font, size and language off this exact byte
/// sequence, including the trailing delimiter space.
pub const HEADER: &str = r"{\rtf1\ansi\deff0\ansicpg1251\nouicompat{\fonttbl{\f0\fnil\fcharset204 Segoe UI;}{\f1\fnil\fcharset204 Calibri;}}\pard\sa200\sl276\slmult1\f0\fs28\lang1049 ";

/// Closes the group opened by [`HEADER`].
pub const FOOTER: &str = "}";

/// Page emitted for a chapter without any text.
pub fn placeholder_page() -> String {
    format!("{HEADER} {FOOTER}")
}

/// Incremental writer for one self-contained RTF document.
///
/// Tracks the active paragraph and character formatting so that directives
/// are only emitted on change, and inserts the delimiter space a control
/// word needs before literal text.
#[derive(Debug)]
pub(crate) struct RtfWriter {
    out: String,
    delimit: bool,
    format: CharFormat,
    in_paragraph: bool,
}

impl Default for RtfWriter {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl RtfWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut out = String::with_capacity(HEADER.len() + FOOTER.len() + capacity);
        out.push_str(HEADER);
        Self {
            out,
            delimit: false,
            format: CharFormat::PLAIN,
            in_paragraph: false,
        }
    }

    pub fn in_paragraph(&self) -> bool {
        self.in_paragraph
    }

    fn control(&mut self, word: &str) {
        self.out.push('\\');
        self.out.push_str(word);
        self.delimit = true;
    }

    fn control_n(&mut self, word: &str, value: i32) {
        self.out.push('\\');
        self.out.push_str(word);
        self.out.push_str(&value.to_string());
        self.delimit = true;
    }

    /// Reset paragraph properties and apply `style`.
    pub fn begin_paragraph(&mut self, style: &BlockStyle) {
        self.control("pard");
        self.control(style.alignment.control_word());
        if style.left_indent > 0 {
            self.control_n("li", style.left_indent as i32);
        }
        if style.right_indent > 0 {
            self.control_n("ri", style.right_indent as i32);
        }
        self.control_n("fs", i32::from(style.font_size));
        self.in_paragraph = true;
    }

    pub fn paragraph_break(&mut self) {
        self.control("par");
        self.in_paragraph = false;
    }

    pub fn line_break(&mut self) {
        self.control("line");
    }

    /// Switch character formatting, emitting only the toggles that change.
    pub fn set_format(&mut self, format: CharFormat) {
        if format.bold != self.format.bold {
            self.control(if format.bold { "b" } else { "b0" });
        }
        if format.italic != self.format.italic {
            self.control(if format.italic { "i" } else { "i0" });
        }
        self.format = format;
    }

    pub fn text<I: IntoIterator<Item = char>>(&mut self, chars: I) {
        for c in chars {
            match c {
                '\t' => self.control("tab"),
                '\\' | '{' | '}' => {
                    self.delimit_text();
                    self.out.push('\\');
                    self.out.push(c);
                }
                c if c.is_ascii() => {
                    self.delimit_text();
                    self.out.push(c);
                }
                c => {
                    self.delimit_text();
                    push_unicode(&mut self.out, c);
                }
            }
        }
    }

    fn delimit_text(&mut self) {
        if self.delimit {
            self.out.push(' ');
            self.delimit = false;
        }
    }

    pub fn finish(mut self) -> String {
        self.out.push_str(FOOTER);
        self.out
    }
}

/// Append `\uN` escapes (one per UTF-16 unit) followed by an ANSI fallback.
fn push_unicode(out: &mut String, c: char) {
    let fallback = ansi_fallback(c);
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units).iter() {
        out.push_str("\\u");
        out.push_str(&(*unit as i16).to_string());
        match fallback {
            Some(byte) => out.push_str(&format!("\\'{byte:02x}")),
            None => out.push('?'),
        }
    }
}

fn ansi_fallback(c: char) -> Option<u8> {
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1251.encode(c.encode_utf8(&mut buf));
    match (had_errors, bytes.as_ref()) {
        (false, [byte]) => Some(*byte),
        _ => None,
    }
}
