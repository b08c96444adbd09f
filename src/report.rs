//! Batch classification over a [`MessageSource`].

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Disposition, DispositionPolicy, Mail};
use crate::source::{MessageDisposer, MessageSource};

/// Tally of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counter {
    /// Messages pulled from the source, readable or not.
    pub total: u64,
    pub processed: u64,
    pub unprocessed: u64,
    /// Messages the disposer acted on without error.
    pub disposed: u64,
    /// Messages that could not be read or disposed of.
    pub failed: u64,
}

/// Result of a batch run: the tally plus every classified mail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub counter: Counter,
    pub mails: Vec<Mail>,
    /// One line per failure, in encounter order.
    pub errors: Vec<String>,
}

/// Classify every message of `source`.
///
/// Each mail's [`Disposition`] under `policy` is handed to `disposer`, if
/// any. Read and dispose failures are counted and recorded, never fatal.
/// `progress_callback` receives `(done, total)` after each message, with
/// `total` 0 when the source cannot tell.
pub fn process(
    source: &mut dyn MessageSource,
    mut disposer: Option<&mut dyn MessageDisposer>,
    policy: &DispositionPolicy,
    progress_callback: Option<&dyn Fn(u64, u64)>,
) -> Report {
    let mut report = Report::default();
    let expected = source.remaining().unwrap_or(0) as u64;

    while let Some(next) = source.next_message() {
        report.counter.total += 1;

        match next {
            Ok(raw) => {
                let mail = raw.classify();
                if mail.processed {
                    report.counter.processed += 1;
                } else {
                    report.counter.unprocessed += 1;
                }

                let disposition = mail.disposition(policy);
                debug!(token = %mail.token, ?disposition, "classified");

                if let Some(disposer) = disposer.as_deref_mut() {
                    match disposer.dispose(&mail.token, &disposition) {
                        Ok(()) => report.counter.disposed += 1,
                        Err(e) => {
                            warn!(token = %mail.token, error = %e, "dispose failed");
                            report.counter.failed += 1;
                            report.errors.push(format!("{}: {e}", mail.token));
                        }
                    }
                }

                report.mails.push(mail);
            }
            Err(e) => {
                warn!(error = %e, "skipping unreadable message");
                report.counter.failed += 1;
                report.errors.push(e.to_string());
            }
        }

        if let Some(cb) = progress_callback {
            cb(report.counter.total, expected);
        }
    }

    report
}

impl Report {
    /// Mails whose disposition is a hard bounce.
    pub fn hard_bounces<'a>(
        &'a self,
        policy: &'a DispositionPolicy,
    ) -> impl Iterator<Item = &'a Mail> + 'a {
        self.mails
            .iter()
            .filter(move |m| m.disposition(policy) == Disposition::HardBounce)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::{BounceError, Result};
    use crate::model::Token;
    use crate::source::{EmlFileSource, MemorySource, RawMessage};

    #[derive(Default)]
    struct RecordingDisposer {
        seen: Vec<(Token, Disposition)>,
        fail_on: Option<Token>,
    }

    impl MessageDisposer for RecordingDisposer {
        fn dispose(&mut self, token: &Token, disposition: &Disposition) -> Result<()> {
            if self.fail_on.as_ref() == Some(token) {
                return Err(BounceError::InvalidMessage("cannot move".into()));
            }
            self.seen.push((token.clone(), *disposition));
            Ok(())
        }
    }

    fn messages() -> Vec<RawMessage> {
        vec![
            RawMessage::from_blob(
                1u64,
                "Subject: Undeliverable\r\nX-Failed-Recipients: gone@x.com\r\n\r\n550 5.1.1 user unknown",
            ),
            RawMessage::from_blob(2u64, "Subject: Lunch?\r\n\r\nSee you"),
            RawMessage::from_blob(
                3u64,
                "Subject: Undeliverable\r\nX-Failed-Recipients: full@x.com\r\n\r\nmailbox is full",
            ),
        ]
    }

    #[test]
    fn test_process_counts_and_dispositions() {
        let mut source = MemorySource::new(messages());
        let mut disposer = RecordingDisposer::default();
        let policy = DispositionPolicy {
            purge_unprocessed: true,
        };

        let report = process(&mut source, Some(&mut disposer), &policy, None);

        assert_eq!(
            report.counter,
            Counter {
                total: 3,
                processed: 2,
                unprocessed: 1,
                disposed: 3,
                failed: 0,
            }
        );
        assert_eq!(
            disposer.seen,
            vec![
                (Token::Sequence(1), Disposition::HardBounce),
                (Token::Sequence(2), Disposition::Unprocessed { purge: true }),
                (Token::Sequence(3), Disposition::Processed),
            ]
        );
        assert_eq!(report.hard_bounces(&policy).count(), 1);
    }

    #[test]
    fn test_process_without_disposer() {
        let mut source = MemorySource::new(messages());
        let report = process(&mut source, None, &DispositionPolicy::default(), None);
        assert_eq!(report.counter.total, 3);
        assert_eq!(report.counter.disposed, 0);
        assert_eq!(report.mails.len(), 3);
    }

    #[test]
    fn test_dispose_failure_is_counted() {
        let mut source = MemorySource::new(messages());
        let mut disposer = RecordingDisposer {
            fail_on: Some(Token::Sequence(2)),
            ..RecordingDisposer::default()
        };
        let report = process(
            &mut source,
            Some(&mut disposer),
            &DispositionPolicy::default(),
            None,
        );
        assert_eq!(report.counter.disposed, 2);
        assert_eq!(report.counter.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("#2"));
    }

    #[test]
    fn test_unreadable_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ok = dir.path().join("ok.eml");
        std::fs::write(&ok, "Subject: hi\r\n\r\nbody").expect("write");
        let missing = dir.path().join("missing.eml");

        let mut source = EmlFileSource::new([&missing, &ok]);
        let calls = Cell::new(0u64);
        let progress = |done: u64, total: u64| {
            assert_eq!(total, 2);
            calls.set(done);
        };
        let report = process(
            &mut source,
            None,
            &DispositionPolicy::default(),
            Some(&progress),
        );

        assert_eq!(report.counter.total, 2);
        assert_eq!(report.counter.failed, 1);
        assert_eq!(report.counter.unprocessed, 1);
        assert_eq!(calls.get(), 2);
    }
}
