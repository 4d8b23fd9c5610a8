// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload classification by magic bytes.
//
// Jobs arrive with no declared content type -- the wire protocol carries
// bare bytes.  Classification looks at the leading bytes only: `%PDF-` for
// PDF, `%!` for PostScript, otherwise a UTF-8 printability heuristic
// decides between plain text and an opaque binary.

use jetspool_core::types::DocumentType;

/// Classify a document payload.
pub fn detect(payload: &[u8]) -> DocumentType {
    if payload.starts_with(b"%PDF-") {
        DocumentType::Pdf
    } else if payload.starts_with(b"%!") {
        DocumentType::PostScript
    } else if looks_like_text(payload) {
        DocumentType::PlainText
    } else {
        DocumentType::Unknown
    }
}

/// True when the payload is valid UTF-8 made of printable characters and
/// whitespace.
fn looks_like_text(payload: &[u8]) -> bool {
    if payload.is_empty() {
        return false;
    }
    match std::str::from_utf8(payload) {
        Ok(text) => text.chars().all(|c| !c.is_control() || c.is_whitespace()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic_is_detected() {
        assert_eq!(detect(b"%PDF-1.7\n..."), DocumentType::Pdf);
    }

    #[test]
    fn postscript_magic_is_detected() {
        assert_eq!(detect(b"%!PS-Adobe-3.0\nshowpage"), DocumentType::PostScript);
    }

    #[test]
    fn printable_utf8_is_plain_text() {
        assert_eq!(
            detect("Dear printer,\nplease print me.\n".as_bytes()),
            DocumentType::PlainText
        );
    }

    #[test]
    fn binary_junk_is_unknown() {
        assert_eq!(detect(&[0x00, 0xff, 0xfe, 0x01]), DocumentType::Unknown);
    }

    #[test]
    fn empty_payload_is_unknown() {
        assert_eq!(detect(b""), DocumentType::Unknown);
    }
}
