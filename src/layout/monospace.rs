use crate::rtf::plain_text;

use super::{LayoutError, LayoutOracle};

/// Fixed-advance layout estimate.
///
/// Every character is `char_width` wide and every line `line_height` tall.
/// Text is greedily wrapped on whitespace; words longer than a line are cut
/// at the line width. Paragraph and line breaks always start a new line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceOracle {
    pub char_width: f32,
    pub line_height: f32,
}

impl MonospaceOracle {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }

    /// Number of characters that fit on one line of `width`.
    pub fn columns(&self, width: u32) -> usize {
        ((width as f32 / self.char_width).floor() as usize).max(1)
    }

    /// Number of wrapped lines `text` occupies at `columns` per line.
    pub fn line_count(&self, text: &str, columns: usize) -> usize {
        if text.is_empty() {
            return 0;
        }
        text.split('\n').map(|line| wrapped_lines(line, columns)).sum()
    }
}

impl Default for MonospaceOracle {
    fn default() -> Self {
        Self::new(10.0, 20.0)
    }
}

impl LayoutOracle for MonospaceOracle {
    fn measure(&self, markup: &str, width: u32) -> Result<f32, LayoutError> {
        if !(self.char_width > 0.0 && self.line_height > 0.0) {
            return Err(LayoutError::Engine(format!(
                "character cell {}x{} is not positive",
                self.char_width, self.line_height
            )));
        }
        let text = plain_text(markup);
        let lines = self.line_count(&text, self.columns(width));
        Ok(lines as f32 * self.line_height)
    }
}

fn wrapped_lines(line: &str, columns: usize) -> usize {
    let mut lines = 1;
    let mut used = 0;
    for word in line.split_whitespace() {
        let mut len = word.chars().count();
        if used > 0 {
            if used + 1 + len <= columns {
                used += 1 + len;
                continue;
            }
            lines += 1;
        }
        while len > columns {
            lines += 1;
            len -= columns;
        }
        used = len;
    }
    lines
}
