//! Plain-text extraction from RTF markup.
//!
//! Understands the subset of RTF this crate and common word processors
//! emit: groups, control words with numeric parameters, control symbols,
//! `\'hh` hex escapes (decoded as windows-1251), `\uN` escapes with `\ucN`
//! fallback skipping, and the usual non-text destinations.

use std::iter::Peekable;
use std::str::Chars;

/// Destinations whose content is never visible text.
const SKIPPED_DESTINATIONS: &[&str] = &["fonttbl", "colortbl", "stylesheet", "info", "pict"];

/// Extract the visible text of an RTF document.
///
/// `\par` and `\line` become `'\n'`, `\tab` becomes `'\t'`. Raw line breaks
/// in the markup are ignored, as RTF readers do.
pub fn plain_text(markup: &str) -> String {
    if memchr::memchr2(b'\\', b'{', markup.as_bytes()).is_none() {
        return markup.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    }

    let mut out = String::with_capacity(markup.len() / 2);
    let mut state = State::default();
    let mut chars = markup.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                state.depth += 1;
                if state.skip_depth.is_none() && opens_skipped_destination(&chars) {
                    state.skip_depth = Some(state.depth);
                }
            }
            '}' => {
                if state.skip_depth == Some(state.depth) {
                    state.skip_depth = None;
                }
                state.depth = state.depth.saturating_sub(1);
            }
            '\\' => match chars.peek().copied() {
                Some(next) if next.is_ascii_alphabetic() => {
                    let (word, param) = read_control_word(&mut chars);
                    if state.skip_depth.is_none() {
                        state.control_word(&word, param, &mut out);
                    }
                }
                Some('\'') => {
                    chars.next();
                    let hex: String = chars.by_ref().take(2).collect();
                    if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                        let raw = [byte];
                        let (decoded, _) =
                            encoding_rs::WINDOWS_1251.decode_without_bom_handling(&raw);
                        for ch in decoded.chars() {
                            state.literal(ch, &mut out);
                        }
                    }
                }
                Some(symbol) => {
                    chars.next();
                    match symbol {
                        '\\' | '{' | '}' => state.literal(symbol, &mut out),
                        '~' => state.literal('\u{a0}', &mut out),
                        '_' => state.literal('\u{2011}', &mut out),
                        _ => {}
                    }
                }
                None => {}
            },
            '\r' | '\n' => {}
            _ => state.literal(c, &mut out),
        }
    }

    out
}

#[derive(Default)]
struct State {
    depth: usize,
    skip_depth: Option<usize>,
    /// Fallback characters still to drop after a `\uN`.
    pending_fallback: usize,
    /// `\ucN`; `None` means the default of 1.
    fallback_len: Option<usize>,
    high_surrogate: Option<u16>,
}

impl State {
    fn literal(&mut self, c: char, out: &mut String) {
        if self.skip_depth.is_some() {
            return;
        }
        if self.pending_fallback > 0 {
            self.pending_fallback -= 1;
            return;
        }
        out.push(c);
    }

    fn control_word(&mut self, word: &str, param: Option<i32>, out: &mut String) {
        match word {
            "par" | "line" => {
                self.pending_fallback = 0;
                out.push('\n');
            }
            "tab" => out.push('\t'),
            "uc" => self.fallback_len = param.and_then(|n| usize::try_from(n).ok()),
            "u" => {
                if let Some(value) = param {
                    self.unicode(value, out);
                }
            }
            _ => {}
        }
    }

    fn unicode(&mut self, value: i32, out: &mut String) {
        let unit = (if value < 0 { value + 0x10000 } else { value }) as u16;
        self.pending_fallback = self.fallback_len.unwrap_or(1);

        match unit {
            0xD800..=0xDBFF => self.high_surrogate = Some(unit),
            0xDC00..=0xDFFF => {
                if let Some(high) = self.high_surrogate.take() {
                    out.extend(char::decode_utf16([high, unit]).flatten());
                }
            }
            _ => {
                self.high_surrogate = None;
                if let Some(c) = char::from_u32(u32::from(unit)) {
                    out.push(c);
                }
            }
        }
    }
}

/// Read a control word after its backslash: letters, an optional signed
/// numeric parameter, and the optional delimiter space.
fn read_control_word(chars: &mut Peekable<Chars<'_>>) -> (String, Option<i32>) {
    let mut word = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_alphabetic()) {
        word.push(c);
    }

    let mut digits = String::new();
    if let Some(sign) = chars.next_if_eq(&'-') {
        digits.push(sign);
    }
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        digits.push(c);
    }
    chars.next_if_eq(&' ');

    (word, digits.parse().ok())
}

/// True if the group that just opened is `{\*...}` or one of the known
/// non-text destinations.
fn opens_skipped_destination(chars: &Peekable<Chars<'_>>) -> bool {
    let mut ahead = chars.clone();
    if ahead.next() != Some('\\') {
        return false;
    }
    if ahead.peek() == Some(&'*') {
        return true;
    }
    let word: String = ahead.take_while(|c| c.is_ascii_alphabetic()).collect();
    SKIPPED_DESTINATIONS.contains(&word.as_str())
}
