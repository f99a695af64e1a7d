//! Text decoding helpers.

use std::borrow::Cow;

use memchr::memmem;

const PROLOG_SCAN_LIMIT: usize = 1024;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. Honors the `encoding` pseudo-attribute of the XML declaration when it
///    names something other than UTF-8
/// 2. Otherwise tries UTF-8 (handles BOM automatically via encoding_rs)
/// 3. Falls back to windows-1251, the usual encoding of undeclared FB2 files
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some(label) = declared_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
        && encoding != encoding_rs::UTF_8
    {
        let (result, _, malformed) = encoding.decode(bytes);
        if malformed {
            log::warn!("input is not valid {}; some characters were replaced", encoding.name());
        }
        return result;
    }

    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    log::warn!("input is not valid UTF-8 and declares no encoding; decoding as windows-1251");
    let (result, _, _) = encoding_rs::WINDOWS_1251.decode(bytes);
    result
}

/// Extract the `encoding` value from an `<?xml ... ?>` declaration.
///
/// Only the first kilobyte is inspected.
pub fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(&b"\xEF\xBB\xBF"[..]).unwrap_or(bytes);
    let bytes = &bytes[..bytes.len().min(PROLOG_SCAN_LIMIT)];
    let start = memmem::find(bytes, b"<?xml")?;
    let end = start + memmem::find(&bytes[start..], b"?>")?;
    let decl = &bytes[start..end];

    let key = memmem::find(decl, b"encoding")?;
    let rest = &decl[key + b"encoding".len()..];
    let eq = memchr::memchr(b'=', rest)?;
    let rest = &rest[eq + 1..];
    let open = rest.iter().position(|b| *b == b'"' || *b == b'\'')?;
    let quote = rest[open];
    let value = &rest[open + 1..];
    let close = memchr::memchr(quote, value)?;

    let label = std::str::from_utf8(&value[..close]).ok()?.trim();
    (!label.is_empty()).then(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_encoding() {
        let xml = br#"<?xml version="1.0" encoding="windows-1251"?><FictionBook/>"#;
        assert_eq!(declared_encoding(xml).as_deref(), Some("windows-1251"));

        let xml = b"<?xml version='1.0' encoding = 'UTF-8' ?><a/>";
        assert_eq!(declared_encoding(xml).as_deref(), Some("UTF-8"));

        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?><a/>"), None);
        assert_eq!(declared_encoding(b"<a/>"), None);
    }

    #[test]
    fn test_decode_declared_cp1251() {
        // "Привет" in windows-1251
        let mut bytes = br#"<?xml version="1.0" encoding="windows-1251"?><p>"#.to_vec();
        bytes.extend_from_slice(&[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2]);
        bytes.extend_from_slice(b"</p>");

        let text = decode_text(&bytes);
        assert!(text.contains("<p>Привет</p>"));
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<p>Ёж</p>".as_bytes());
        assert_eq!(decode_text(&bytes), "<p>Ёж</p>");
    }

    #[test]
    fn test_decode_undeclared_falls_back_to_cp1251() {
        let bytes = [b'<', b'p', b'>', 0xC0, 0xE1, b'<', b'/', b'p', b'>'];
        assert_eq!(decode_text(&bytes), "<p>Аб</p>");
    }
}
