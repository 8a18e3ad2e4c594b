//! Byte-to-text decoding for XML files read from disk.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::normalize::patterns::XML_ENCODING_DECL;

/// Bytes inspected when looking for an XML declaration.
const DECLARATION_WINDOW: usize = 256;

/// Decode raw file bytes into XML text. Never fails.
///
/// Detection order: byte order mark, valid UTF-8, the `encoding` named in the
/// XML declaration, then Windows-1252 (a superset of ISO-8859-1 for printable
/// characters). The last step keeps legacy files with accented issuer names
/// readable instead of rejecting them.
///
/// Transcoded text has its declaration relabelled as UTF-8, so the XML copy
/// written next to the PDF stays self-consistent.
pub fn decode_xml(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        debug!("Decoding XML as {} (byte order mark)", encoding.name());
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return relabel_utf8(text.into_owned());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let encoding = declared_encoding(bytes)
        .filter(|encoding| *encoding != UTF_8)
        .unwrap_or(WINDOWS_1252);
    debug!("Decoding XML as {}", encoding.name());
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Replaced undecodable bytes while reading {}", encoding.name());
    }
    relabel_utf8(text.into_owned())
}

/// Rewrite a non-UTF-8 `encoding` label in the declaration to `UTF-8`.
fn relabel_utf8(mut text: String) -> String {
    let range = XML_ENCODING_DECL
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .filter(|label| !label.as_str().eq_ignore_ascii_case("UTF-8"))
        .map(|label| label.range());
    if let Some(range) = range {
        text.replace_range(range, "UTF-8");
    }
    text
}

/// Encoding label from a leading `<?xml ... encoding="..."?>`.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(DECLARATION_WINDOW)];
    let head = String::from_utf8_lossy(head);
    let caps = XML_ENCODING_DECL.captures(&head)?;
    Encoding::for_label(caps[1].as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latin1(text: &str) -> Vec<u8> {
        text.chars().map(|c| c as u32 as u8).collect()
    }

    #[test]
    fn test_utf8_passes_through() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><a n="Diseño"/>"#;
        assert_eq!(decode_xml(xml.as_bytes()), xml);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<a/>");
        assert_eq!(decode_xml(&bytes), "<a/>");
    }

    #[test]
    fn test_declared_latin1() {
        let bytes = latin1(r#"<?xml version="1.0" encoding="ISO-8859-1"?><a n="Acme Diseño S.A."/>"#);
        assert!(std::str::from_utf8(&bytes).is_err());
        let text = decode_xml(&bytes);
        assert!(text.contains("Acme Diseño S.A."));
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    }

    #[test]
    fn test_undeclared_legacy_bytes_fall_back_to_windows_1252() {
        let bytes = latin1(r#"<a n="Ñandú"/>"#);
        assert_eq!(decode_xml(&bytes), r#"<a n="Ñandú"/>"#);
    }

    #[test]
    fn test_wrong_utf8_declaration_still_decodes() {
        let bytes = latin1(r#"<?xml version="1.0" encoding="UTF-8"?><a n="Peña"/>"#);
        assert!(decode_xml(&bytes).contains("Peña"));
    }
}
