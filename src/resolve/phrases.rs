//! Free-text diagnostic phrases and the status code they imply.
//!
//! Entries are evaluated in order against a single body line; the first
//! entry that matches wins. Every entry is a case-insensitive regex, so a
//! few of them (`over ?quota`, `blocke?d? for spam`) match variants.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};

/// Patterns that capture an embedded `D.D.D` in group 1. They are tried
/// before the plain phrases.
const CAPTURING: &[&str] = &[
    r"[45]\d\d[- ]#?([45]\.\d\.\d)",
    r"Diagnostic[- ][Cc]ode: smtp; ?\d\d ([45]\.\d\.\d)",
    r"Status: ([45]\.\d\.\d)",
];

/// Phrase to status code, in evaluation order.
pub const PHRASES: &[(&str, &str)] = &[
    // 4.2.0
    ("not yet been delivered", "4.2.0"),
    ("message will be retried for", "4.2.0"),
    // 4.2.2
    ("benutzer hat zuviele mails auf dem server", "4.2.2"),
    ("exceeded storage allocation", "4.2.2"),
    ("mailbox full", "4.2.2"),
    ("mailbox is full", "4.2.2"),
    ("mailbox quota usage exceeded", "4.2.2"),
    ("mailbox size limit exceeded", "4.2.2"),
    ("mailfolder is full", "4.2.2"),
    ("not enough storage space", "4.2.2"),
    ("over ?quota", "4.2.2"),
    ("quota exceeded", "4.2.2"),
    ("quota violation", "4.2.2"),
    ("user has exhausted allowed storage space", "4.2.2"),
    ("user has too many messages on the server", "4.2.2"),
    ("user mailbox exceeds allowed size", "4.2.2"),
    ("user has Exceeded", "4.2.2"),
    // 4.3.2
    ("delivery attempts will continue to be made for", "4.3.2"),
    ("delivery temporarily suspended", "4.3.2"),
    ("greylisted for 5 minutes", "4.3.2"),
    ("greylisting in action", "4.3.2"),
    ("server busy", "4.3.2"),
    ("server too busy", "4.3.2"),
    ("system load is too high", "4.3.2"),
    ("temporarily deferred", "4.3.2"),
    ("temporarily unavailable", "4.3.2"),
    ("throttling", "4.3.2"),
    ("too busy to accept mail", "4.3.2"),
    ("too many connections", "4.3.2"),
    ("too many sessions", "4.3.2"),
    ("too much load", "4.3.2"),
    ("try again later", "4.3.2"),
    ("try later", "4.3.2"),
    // 4.4.7
    ("retry timeout exceeded", "4.4.7"),
    ("queue too long", "4.4.7"),
    // 5.1.1
    ("554 delivery error:", "5.1.1"),
    ("account has been disabled", "5.2.1"),
    ("account is unavailable", "5.1.1"),
    ("account not found", "5.1.1"),
    ("address invalid", "5.1.1"),
    ("address is unknown", "5.1.1"),
    ("address unknown", "5.1.1"),
    ("addressee unknown", "5.1.1"),
    ("address_not_found", "5.1.1"),
    ("bad address", "5.1.1"),
    ("bad destination mailbox address", "5.1.1"),
    ("destin. Sconosciuto", "5.1.1"),
    ("destinatario errato", "5.1.1"),
    ("destinatario sconosciuto o mailbox disatttivata", "5.1.1"),
    ("does not exist", "5.1.1"),
    ("email Address was not found", "5.1.1"),
    ("excessive userid unknowns", "5.1.1"),
    ("Indirizzo inesistente", "5.1.1"),
    ("Invalid account", "5.1.1"),
    ("invalid address", "5.1.1"),
    ("invalid or unknown virtual user", "5.1.1"),
    ("invalid mailbox", "5.1.1"),
    ("invalid recipient", "5.1.1"),
    ("mailbox not found", "5.1.1"),
    ("mailbox unavailable", "5.2.0"),
    ("nie istnieje", "5.1.1"),
    ("nie ma takiego konta", "5.1.1"),
    ("no mail box available for this user", "5.1.1"),
    ("no mailbox here", "5.1.1"),
    ("no one with that email address here", "5.1.1"),
    ("no such address", "5.1.1"),
    ("no such email address", "5.1.1"),
    ("no such mail drop defined", "5.1.1"),
    ("no such mailbox", "5.1.1"),
    ("no such person at this address", "5.1.1"),
    ("no such recipient", "5.1.1"),
    ("no such user", "5.1.1"),
    ("not a known user", "5.1.1"),
    ("not a valid mailbox", "5.1.1"),
    ("not a valid user", "5.1.1"),
    ("not available", "5.1.1"),
    ("not exists", "5.1.1"),
    ("recipient address rejected", "5.1.1"),
    ("recipient not allowed", "5.1.1"),
    ("recipient not found", "5.1.1"),
    ("recipient rejected", "5.1.1"),
    ("recipient unknown", "5.1.1"),
    ("server doesn't handle mail for that user", "5.1.1"),
    ("this account is disabled", "5.1.1"),
    ("this address no longer accepts mail", "5.1.1"),
    ("this email address is not known to this system", "5.1.1"),
    ("unknown account", "5.1.1"),
    ("unknown address or alias", "5.1.1"),
    ("unknown email address", "5.1.1"),
    ("unknown local part", "5.1.1"),
    ("unknown or illegal alias", "5.1.1"),
    ("unknown or illegal user", "5.1.1"),
    ("unknown recipient", "5.1.1"),
    ("unknown user", "5.1.1"),
    ("user disabled", "5.1.1"),
    ("user doesn't exist in this server", "5.1.1"),
    ("user invalid", "5.1.1"),
    ("user is suspended", "5.1.1"),
    ("user is unknown", "5.1.1"),
    ("user not found", "5.1.1"),
    ("user not known", "5.1.1"),
    ("user unknown", "5.1.1"),
    ("valid RCPT command must precede data", "5.1.1"),
    ("was not found in ldap server", "5.1.1"),
    ("we are sorry but the address is invalid", "5.1.1"),
    ("unable to find alias user", "5.1.1"),
    // 5.1.2
    ("domain isn't in my list of allowed rcpthosts", "5.1.2"),
    ("esta casilla ha expirado por falta de uso", "5.1.2"),
    ("host ?name is unknown", "5.1.2"),
    ("no relaying allowed", "5.1.2"),
    ("no such domain", "5.1.2"),
    ("not our customer", "5.1.2"),
    ("relay not permitted", "5.1.2"),
    ("relay access denied", "5.1.2"),
    ("relaying denied", "5.1.2"),
    ("relaying not allowed", "5.1.2"),
    ("this system is not configured to relay mail", "5.1.2"),
    ("unable to relay", "5.1.2"),
    ("unrouteable mail domain", "5.1.2"),
    ("we do not relay", "5.1.2"),
    // 5.1.6
    ("old address no longer valid", "5.1.6"),
    ("recipient no longer on server", "5.1.6"),
    // 5.1.8
    ("dender address rejected", "5.1.8"),
    // 5.2.0
    ("delivery failed", "5.2.0"),
    ("exceeded the rate limit", "5.2.0"),
    ("local Policy Violation", "5.2.0"),
    ("mailbox currently suspended", "5.2.0"),
    ("mail can not be delivered", "5.2.0"),
    ("mail couldn't be delivered", "5.2.0"),
    ("the account or domain may not exist", "5.2.0"),
    // 5.2.1
    ("account disabled", "5.2.1"),
    ("account inactive", "5.2.1"),
    ("inactive account", "5.2.1"),
    ("adressat unbekannt oder mailbox deaktiviert", "5.2.1"),
    ("destinataire inconnu ou boite aux lettres desactivee", "5.2.1"),
    ("mail is not currently being accepted for this mailbox", "5.2.1"),
    ("el usuario esta en estado: inactivo", "5.2.1"),
    ("email account that you tried to reach is disabled", "5.2.1"),
    ("inactive user", "5.2.1"),
    ("user is inactive", "5.2.1"),
    ("mailbox disabled for this recipient", "5.2.1"),
    ("mailbox has been blocked due to inactivity", "5.2.1"),
    ("mailbox is currently unavailable", "5.2.1"),
    ("mailbox is disabled", "5.2.1"),
    ("mailbox is inactive", "5.2.1"),
    ("mailbox locked or suspended", "5.2.1"),
    ("mailbox temporarily disabled", "5.2.1"),
    ("podane konto jest zablokowane administracyjnie lub nieaktywne", "5.2.1"),
    ("questo indirizzo e' bloccato per inutilizzo", "5.2.1"),
    ("recipient mailbox was disabled", "5.2.1"),
    ("domain name not found", "5.2.1"),
    // 5.4.4
    ("couldn't find any host named", "5.4.4"),
    ("couldn't find any host by that name", "5.4.4"),
    ("perm_failure: dns error", "5.4.4"),
    ("temporary lookup failure", "5.4.4"),
    ("unrouteable address", "5.4.4"),
    ("can't connect to", "5.4.4"),
    // 5.4.6
    ("too many hops", "5.4.6"),
    // 5.5.0
    ("content reject", "5.5.0"),
    ("requested action aborted", "5.5.0"),
    // 5.5.2
    ("mime/reject", "5.5.2"),
    // 5.5.3
    ("mail data refused", "5.5.3"),
    // 5.5.4
    ("mime error", "5.5.4"),
    // 5.6.2
    ("rejecting password protected file attachment", "5.6.2"),
    // 5.7.1
    ("550 OU-00", "5.7.1"),
    ("550 SC-00", "5.7.1"),
    ("550 DY-00", "5.7.1"),
    ("554 denied", "5.7.1"),
    ("you have been blocked by the recipient", "5.7.1"),
    ("requires that you verify", "5.7.1"),
    ("access denied", "5.7.1"),
    ("administrative prohibition - unable to validate recipient", "5.7.1"),
    ("blacklisted", "5.7.1"),
    ("blocke?d? for spam", "5.7.1"),
    ("conection refused", "5.7.1"),
    ("connection refused due to abuse", "5.7.1"),
    ("dial-up or dynamic-ip denied", "5.7.1"),
    ("domain has received too many bounces", "5.7.1"),
    ("failed several antispam checks", "5.7.1"),
    ("found in a dns blacklist", "5.7.1"),
    ("ips blocked", "5.7.1"),
    ("is blocked by", "5.7.1"),
    ("mail Refused", "5.7.1"),
    ("message does not pass domainkeys", "5.7.1"),
    ("message looks like spam", "5.7.1"),
    ("message refused by", "5.7.1"),
    ("not allowed access from your location", "5.7.1"),
    ("permanently deferred", "5.7.1"),
    ("rejected by policy", "5.7.1"),
    ("rejected by windows live hotmail for policy reasons", "5.7.1"),
    ("rejected for policy reasons", "5.7.1"),
    ("rejecting banned content", "5.7.1"),
    ("sorry, looks like spam", "5.7.1"),
    ("spam message discarded", "5.7.1"),
    ("too many spams from your ip", "5.7.1"),
    ("transaction failed", "5.7.1"),
    ("transaction rejected", "5.7.1"),
    ("wiadomosc zostala odrzucona przez system antyspamowy", "5.7.1"),
    ("your message was declared spam", "5.7.1"),
];

/// The compiled phrase table: one set for the fast "which entries match"
/// question, plus the individual regexes for capture extraction.
pub(crate) struct PhraseTable {
    set: RegexSet,
    patterns: Vec<Regex>,
    codes: Vec<Option<&'static str>>,
}

impl PhraseTable {
    fn build() -> Self {
        let sources: Vec<&str> = CAPTURING
            .iter()
            .copied()
            .chain(PHRASES.iter().map(|(phrase, _)| *phrase))
            .collect();
        let codes = CAPTURING
            .iter()
            .map(|_| None)
            .chain(PHRASES.iter().map(|(_, code)| Some(*code)))
            .collect();

        let set = RegexSetBuilder::new(&sources)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .expect("phrase table regex set");
        let patterns = sources
            .iter()
            .map(|src| {
                RegexBuilder::new(src)
                    .case_insensitive(true)
                    .dot_matches_new_line(true)
                    .build()
                    .expect("phrase table regex")
            })
            .collect();

        Self {
            set,
            patterns,
            codes,
        }
    }

    /// The raw code candidate of the first entry matching `line`: the table
    /// code for a phrase, the captured group for a capturing pattern.
    pub(crate) fn lookup<'l>(&self, line: &'l str) -> Option<PhraseMatch<'l>> {
        let idx = self.set.matches(line).iter().next()?;
        match self.codes[idx] {
            Some(code) => Some(PhraseMatch {
                entry: idx,
                candidate: code,
            }),
            None => {
                let caps = self.patterns[idx].captures(line)?;
                let candidate = caps.get(1)?.as_str();
                Some(PhraseMatch {
                    entry: idx,
                    candidate,
                })
            }
        }
    }
}

/// Result of a phrase table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PhraseMatch<'l> {
    /// Position of the matching entry in the table.
    pub entry: usize,
    /// Unformatted code: a table value or text captured from the line.
    pub candidate: &'l str,
}

pub(crate) static TABLE: LazyLock<PhraseTable> = LazyLock::new(PhraseTable::build);
