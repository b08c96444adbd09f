//! Where messages come from and where decisions go.
//!
//! The classifier only sees [`RawMessage`]s. Mailbox access, directory
//! walking, deleting and moving belong to implementations of
//! [`MessageSource`] and [`MessageDisposer`] outside this crate; the only
//! adapters provided here read explicit `.eml` paths or in-memory messages.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::classify::{classify, classify_envelope, Envelope};
use crate::error::{BounceError, Result};
use crate::model::{Disposition, Mail, Token};
use crate::parser::{decode_bytes, normalize_content, split_message};

/// One message to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub token: Token,
    pub header_text: String,
    pub body_text: String,
    /// Both parts already went through `normalize_content`.
    normalized: bool,
}

impl RawMessage {
    /// A message whose header and body were split by the caller.
    pub fn new(token: impl Into<Token>, header_text: String, body_text: String) -> Self {
        Self {
            token: token.into(),
            header_text,
            body_text,
            normalized: false,
        }
    }

    /// Normalize a whole message, then split it on its first blank line.
    pub fn from_blob(token: impl Into<Token>, blob: &str) -> Self {
        let normalized = normalize_content(blob);
        let (header, body) = split_message(&normalized);
        Self {
            token: token.into(),
            header_text: header.to_string(),
            body_text: body.to_string(),
            normalized: true,
        }
    }

    pub fn classify(&self) -> Mail {
        if self.normalized {
            let env = Envelope::from_normalized(&self.header_text, self.body_text.clone());
            classify_envelope(self.token.clone(), &env)
        } else {
            classify(self.token.clone(), &self.header_text, &self.body_text)
        }
    }
}

/// Yields messages one at a time.
pub trait MessageSource {
    /// The next message, `None` when exhausted. An `Err` covers one message
    /// only; the source can still be polled afterwards.
    fn next_message(&mut self) -> Option<Result<RawMessage>>;

    /// Number of messages left, if known.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

/// Acts on a classification decision (delete, move, flag...).
pub trait MessageDisposer {
    fn dispose(&mut self, token: &Token, disposition: &Disposition) -> Result<()>;
}

/// Reads `.eml` files from an explicit list of paths.
///
/// The token of each message is its file name.
#[derive(Debug, Clone, Default)]
pub struct EmlFileSource {
    paths: VecDeque<PathBuf>,
}

impl EmlFileSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl MessageSource for EmlFileSource {
    fn next_message(&mut self) -> Option<Result<RawMessage>> {
        let path = self.paths.pop_front()?;
        Some(read_eml(&path))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.paths.len())
    }
}

/// Read and split one `.eml` file.
pub fn read_eml(path: &Path) -> Result<RawMessage> {
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BounceError::FileNotFound(path.to_path_buf())
        } else {
            BounceError::io(path, e)
        }
    })?;

    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(BounceError::InvalidMessage(format!(
            "{} is empty",
            path.display()
        )));
    }

    let token = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    tracing::debug!(path = %path.display(), bytes = data.len(), "read message file");

    Ok(RawMessage::from_blob(token, &decode_bytes(&data)))
}

/// Messages held in memory, in order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    messages: VecDeque<RawMessage>,
}

impl MemorySource {
    pub fn new(messages: impl IntoIterator<Item = RawMessage>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
        }
    }
}

impl MessageSource for MemorySource {
    fn next_message(&mut self) -> Option<Result<RawMessage>> {
        self.messages.pop_front().map(Ok)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.messages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_blob_splits() {
        let msg = RawMessage::from_blob(3u64, "Subject: x\nFrom: a@b.com\n\nhello\n");
        assert_eq!(msg.token, Token::Sequence(3));
        assert_eq!(msg.header_text, "Subject: x\r\nFrom: a@b.com");
        assert_eq!(msg.body_text, "hello\r\n");
    }

    #[test]
    fn test_mixed_line_endings_split_after_normalizing() {
        // LF up to the report, CRLF blank line only after the status block.
        let blob = "Subject: Delivery Status Notification (Failure)\n\
            Content-Type: multipart/report; report-type=delivery-status; boundary=\"B\"\n\n\
            --B\nContent-Type: text/plain\n\nDelivery failed\n\
            --B\nContent-Type: message/delivery-status\n\n\
            Reporting-MTA: dns; mx.e.com\n\n\
            Final-Recipient: rfc822; u@e.com\nAction: failed\nStatus: 5.1.1\r\n\r\n\
            --B--\r\n";

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mixed.eml");
        std::fs::write(&path, blob).expect("write");

        let msg = read_eml(&path).expect("read");
        assert!(msg.header_text.starts_with("Subject:"));
        assert!(!msg.header_text.contains("--B"));

        let mail = msg.classify();
        assert_eq!(mail, crate::classify::classify_raw("mixed.eml", blob));
        assert_eq!(mail.recipients.len(), 1);
        assert_eq!(mail.recipients[0].email.as_deref(), Some("u@e.com"));
        assert_eq!(mail.recipients[0].status.as_deref(), Some("5.1.1"));
        assert!(mail.recipients[0].remove);
    }

    #[test]
    fn test_new_and_from_blob_agree() {
        let blob = "Subject: Undeliverable\r\nX-Failed-Recipients: a@x.com\r\n\r\nuser unknown";
        let split = RawMessage::new(
            1u64,
            "Subject: Undeliverable\r\nX-Failed-Recipients: a@x.com".to_string(),
            "user unknown".to_string(),
        );
        assert_eq!(split.classify(), RawMessage::from_blob(1u64, blob).classify());
    }

    #[test]
    fn test_eml_source_reads_files_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = dir.path().join("a.eml");
        let b = dir.path().join("b.eml");
        std::fs::write(&a, "Subject: first\r\n\r\nbody").expect("write");
        std::fs::write(&b, "Subject: second\r\n\r\nbody").expect("write");

        let mut source = EmlFileSource::new([&a, &b]);
        assert_eq!(source.remaining(), Some(2));

        let first = source.next_message().expect("some").expect("ok");
        assert_eq!(first.token, Token::Name("a.eml".into()));
        assert_eq!(first.header_text, "Subject: first");

        let second = source.next_message().expect("some").expect("ok");
        assert_eq!(second.token, Token::Name("b.eml".into()));
        assert!(source.next_message().is_none());
    }

    #[test]
    fn test_eml_source_missing_file() {
        let mut source = EmlFileSource::new(["/definitely/not/here.eml"]);
        let err = source.next_message().expect("some").unwrap_err();
        assert!(matches!(err, BounceError::FileNotFound(_)));
        assert!(source.next_message().is_none());
    }

    #[test]
    fn test_empty_file_is_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.eml");
        std::fs::write(&path, "\r\n").expect("write");
        assert!(matches!(read_eml(&path), Err(BounceError::InvalidMessage(_))));
    }

    #[test]
    fn test_latin1_file_is_decoded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("latin1.eml");
        std::fs::write(&path, b"Subject: R\xE9ponse\r\n\r\nbody").expect("write");
        let msg = read_eml(&path).expect("read");
        assert_eq!(msg.header_text, "Subject: Réponse");
    }
}
