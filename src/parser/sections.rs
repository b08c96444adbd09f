//! Boundary-based body sectioning.
//!
//! This is not MIME unwrapping: the body is split on the literal boundary
//! string and the pieces at fixed positions are taken as the human-readable
//! part, the machine-readable report, and the returned original.

use serde::Serialize;

use super::header::{parse_header, HeaderMap};

/// Named slots of a multipart body. All are absent without a boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BodySections {
    /// Piece 1: usually the human-readable explanation.
    pub first: Option<String>,
    /// `first` parsed as a header block.
    pub first_parsed: Option<HeaderMap>,
    /// Piece 2: usually `message/delivery-status` or `message/feedback-report`.
    pub machine: Option<String>,
    /// Piece 3: usually the returned original message or its headers.
    pub returned: Option<String>,
}

impl BodySections {
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.machine.is_none() && self.returned.is_none()
    }
}

/// Split `body` on the header's `Content-Type` boundary.
///
/// Without a boundary every slot is `None`.
pub fn parse_body_sections(header: &HeaderMap, body: &str) -> BodySections {
    let Some(boundary) = header.content_type().and_then(|ct| ct.boundary()) else {
        return BodySections::default();
    };

    let pieces: Vec<&str> = body.split(boundary).collect();
    let piece = |i: usize| pieces.get(i).map(|s| s.to_string());

    let first = piece(1);
    let first_parsed = first.as_deref().map(parse_header);

    BodySections {
        first,
        first_parsed,
        machine: piece(2),
        returned: piece(3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(ct: &str) -> HeaderMap {
        parse_header(&format!("Content-Type: {ct}"))
    }

    #[test]
    fn test_sections_without_boundary() {
        let sections = parse_body_sections(&header("text/plain"), "hello");
        assert!(sections.is_empty());
        assert!(sections.first_parsed.is_none());
    }

    #[test]
    fn test_sections_positions() {
        let body = "preamble\r\n--B\r\nfirst part\r\n--B\r\nmachine part\r\n--B\r\nreturned\r\n--B--";
        let sections = parse_body_sections(&header("multipart/report; boundary=\"B\""), body);
        assert_eq!(sections.first.as_deref(), Some("\r\nfirst part\r\n--"));
        assert_eq!(sections.machine.as_deref(), Some("\r\nmachine part\r\n--"));
        assert_eq!(sections.returned.as_deref(), Some("\r\nreturned\r\n--"));
    }

    #[test]
    fn test_missing_pieces_are_none() {
        let body = "preamble--Bonly first";
        let sections = parse_body_sections(&header("multipart/mixed; boundary=B"), body);
        assert_eq!(sections.first.as_deref(), Some("only first"));
        assert!(sections.machine.is_none());
        assert!(sections.returned.is_none());
    }

    #[test]
    fn test_first_part_is_header_parsed() {
        let body = "--B\r\nX-HmXmrOriginalRecipient: victim@z.com\r\nDate: today\r\n--B--";
        let sections = parse_body_sections(&header("multipart/mixed; boundary=B"), body);
        let parsed = sections.first_parsed.expect("first parsed");
        assert_eq!(
            parsed.text("x-hmxmroriginalrecipient").as_deref(),
            Some("victim@z.com")
        );
    }
}
