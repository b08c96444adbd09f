//! Content normalization: line endings, quoted-printable soft breaks, and
//! the header/body split of a raw message.

/// Canonicalize a raw message (or a header block, or a body).
///
/// - every line ending becomes `\r\n`
/// - quoted-printable soft line breaks (`=\r\n`) are removed
/// - `=3D` becomes `=` and `=09` becomes two spaces
///
/// This only undoes the escapes commonly seen in bounce bodies; it is not a
/// quoted-printable decoder. Empty input is returned unchanged.
pub fn normalize_content(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    content
        .replace("\r\n", "\n")
        .replace('\n', "\r\n")
        .replace("=\r\n", "")
        .replace("=3D", "=")
        .replace("=09", "  ")
}

/// Split a normalized message into `(header, body)` on the first blank line.
///
/// Tries `\r\n\r\n` first and falls back to `\n\n`. A message without any
/// blank line is all header and has an empty body.
pub fn split_message(content: &str) -> (&str, &str) {
    if let Some(pos) = content.find("\r\n\r\n") {
        (&content[..pos], &content[pos + 4..])
    } else if let Some(pos) = content.find("\n\n") {
        (&content[..pos], &content[pos + 2..])
    } else {
        (content, "")
    }
}

/// Decode raw message bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every
/// byte). A leading UTF-8 BOM is stripped.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unifies_line_endings() {
        assert_eq!(normalize_content("a\nb\r\nc"), "a\r\nb\r\nc");
    }

    #[test]
    fn test_normalize_removes_soft_breaks() {
        let input = "this line is wra=\npped\n";
        assert_eq!(normalize_content(input), "this line is wrapped\r\n");
    }

    #[test]
    fn test_normalize_decodes_escapes() {
        assert_eq!(normalize_content("boundary=3D\"abc\""), "boundary=\"abc\"");
        assert_eq!(normalize_content("a=09b"), "a  b");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_content(""), "");
    }

    #[test]
    fn test_split_message_crlf() {
        let (header, body) = split_message("Subject: Hi\r\nFrom: a@b.com\r\n\r\nBody\r\n\r\nMore");
        assert_eq!(header, "Subject: Hi\r\nFrom: a@b.com");
        assert_eq!(body, "Body\r\n\r\nMore");
    }

    #[test]
    fn test_split_message_lf_fallback() {
        let (header, body) = split_message("Subject: Hi\n\nBody");
        assert_eq!(header, "Subject: Hi");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_message_without_body() {
        let (header, body) = split_message("Subject: Hi");
        assert_eq!(header, "Subject: Hi");
        assert_eq!(body, "");
    }

    #[test]
    fn test_decode_bytes_windows1252_fallback() {
        // "Müller" with ü as 0xFC
        let decoded = decode_bytes(b"M\xFCller");
        assert_eq!(decoded, "Müller");
    }

    #[test]
    fn test_decode_bytes_strips_bom() {
        let decoded = decode_bytes(b"\xEF\xBB\xBFSubject: x");
        assert_eq!(decoded, "Subject: x");
    }
}
