//! Mailbox extraction from free text.

use std::sync::LazyLock;

use regex::Regex;

static MAILBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z0-9._%-]+@[A-Z0-9.-]+\.[A-Z]{2,4})\b").expect("mailbox regex")
});

static ADDR_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[ "'<>:()\[\]]"#).expect("address split regex"));

/// Pull the address out of a decorated value such as
/// `"Jane Doe" <jane@example.com>` or `rfc822;<jane@example.com>`.
///
/// Returns the first token (split on spaces, quotes, `<>:()[]`) that contains
/// an `@`, or `None`.
pub fn extract_email(value: &str) -> Option<String> {
    ADDR_SPLIT_RE
        .split(value)
        .find(|token| token.contains('@'))
        .map(str::to_string)
}

/// Collect mailboxes from a block of text, one per line at most.
///
/// The first mailbox on each CRLF-separated line is kept; duplicates are
/// dropped and first-seen order is preserved.
pub fn find_emails(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for line in text.split("\r\n") {
        if let Some(caps) = MAILBOX_RE.captures(line) {
            let addr = &caps[1];
            if !found.iter().any(|f| f == addr) {
                found.push(addr.to_string());
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_email_decorated() {
        assert_eq!(
            extract_email("\"Jane Doe\" <jane@example.com>").as_deref(),
            Some("jane@example.com")
        );
        assert_eq!(
            extract_email(" rfc822;<user@example.com>").as_deref(),
            Some("user@example.com")
        );
        assert_eq!(extract_email("(bob@x.org)").as_deref(), Some("bob@x.org"));
    }

    #[test]
    fn test_extract_email_none() {
        assert_eq!(extract_email("undisclosed recipients"), None);
        assert_eq!(extract_email(""), None);
    }

    #[test]
    fn test_find_emails_dedup_and_order() {
        let text = "Delivery to b@y.com failed\r\n\
                    also a@x.com and c@z.com\r\n\
                    again b@y.com\r\n\
                    nothing here";
        assert_eq!(find_emails(text), vec!["b@y.com", "a@x.com"]);
    }

    #[test]
    fn test_find_emails_case_insensitive() {
        assert_eq!(find_emails("<User.Name@Example.COM>"), vec!["User.Name@Example.COM"]);
    }

    #[test]
    fn test_find_emails_empty() {
        assert!(find_emails("").is_empty());
    }
}
