//! Header block parsing: field lines, folding, and `Content-Type`
//! decomposition.
//!
//! Field names are case-normalized (first letter upper, rest lower), so
//! `CONTENT-TYPE`, `content-type` and `Content-Type` all land on
//! `Content-type`. Lookups normalize the queried name the same way.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s.]+):\s*(.*)").expect("field line regex"));

static PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^=.]*?)=(.*)$").expect("content-type param regex"));

/// Canonical spelling of the Hotmail FBL recipient header.
pub const HOTMAIL_RECIPIENT: &str = "X-HmXmrOriginalRecipient";

const RECEIVED: &str = "Received";
const CONTENT_TYPE: &str = "Content-type";

/// A decomposed `Content-Type` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentType {
    /// Lowercased media type, e.g. `multipart/report`.
    pub mime_type: String,
    /// `key=value` parameters in header order; keys lowercased, quotes stripped.
    pub params: Vec<(String, String)>,
    /// The unfolded header value as it appeared.
    pub raw: String,
}

impl ContentType {
    /// Decompose a raw `Content-Type` value.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(';');
        let mime_type = parts.next().unwrap_or("").trim().to_lowercase();

        let params = parts
            .filter_map(|segment| {
                let caps = PARAM_RE.captures(segment.trim())?;
                let key = caps[1].trim().to_lowercase();
                if key.is_empty() {
                    return None;
                }
                let value = caps[2].replace('"', "").trim().to_string();
                Some((key, value))
            })
            .collect();

        Self {
            mime_type,
            params,
            raw: raw.to_string(),
        }
    }

    /// Look up a parameter by (lowercase) name.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `boundary` parameter, if present and non-empty.
    pub fn boundary(&self) -> Option<&str> {
        self.param("boundary").filter(|b| !b.is_empty())
    }

    /// The `report-type` parameter, if present.
    pub fn report_type(&self) -> Option<&str> {
        self.param("report-type")
    }
}

/// The value stored for one header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Text(String),
    /// Repeated `Received` hops, in order.
    Multi(Vec<String>),
    ContentType(ContentType),
}

impl HeaderValue {
    /// Flat text view: repeated values are `|`-joined, `Content-Type` gives
    /// its raw value.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            HeaderValue::Text(s) => Cow::Borrowed(s),
            HeaderValue::Multi(values) => Cow::Owned(values.join("|")),
            HeaderValue::ContentType(ct) => Cow::Borrowed(&ct.raw),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            HeaderValue::Text(s) => s.is_empty(),
            HeaderValue::Multi(values) => values.iter().all(|v| v.is_empty()),
            HeaderValue::ContentType(ct) => ct.raw.is_empty(),
        }
    }

    fn append_continuation(&mut self, line: &str) {
        let target = match self {
            HeaderValue::Text(s) => s,
            HeaderValue::Multi(values) => match values.last_mut() {
                Some(last) => last,
                None => return,
            },
            HeaderValue::ContentType(ct) => &mut ct.raw,
        };
        target.push(' ');
        target.push_str(line);
    }
}

/// Ordered map of parsed header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderMap {
    /// Look up a field by name (any capitalization).
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let name = canonical_name(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Flat text of a field, if present.
    pub fn text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(HeaderValue::text)
    }

    /// Flat text of a field, only when present and non-empty.
    pub fn non_empty(&self, name: &str) -> Option<Cow<'_, str>> {
        self.text(name).filter(|v| !v.trim().is_empty())
    }

    /// Whether the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The decomposed `Content-Type`, if the header carried one.
    pub fn content_type(&self) -> Option<&ContentType> {
        match self.get(CONTENT_TYPE) {
            Some(HeaderValue::ContentType(ct)) => Some(ct),
            _ => None,
        }
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, name: &str, value: HeaderValue) {
        let name = canonical_name(name);
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for HeaderMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Case-normalize a field name: first letter upper, rest lower.
///
/// `X-HmXmrOriginalRecipient` keeps its vendor spelling.
pub fn canonical_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if lower == "x-hmxmroriginalrecipient" {
        return HOTMAIL_RECIPIENT.to_string();
    }

    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse header lines into a [`HeaderMap`] without decomposing any field.
///
/// - a line matching `Name: value` starts a field
/// - an indented line continues the last stored field (`" " + trimmed line`)
/// - a repeated `Received` adds a hop when its value differs from the last
/// - any other repeated field keeps its first non-empty value
///
/// Lines that are neither are skipped.
pub fn parse_lines<'a, I>(lines: I) -> HeaderMap
where
    I: IntoIterator<Item = &'a str>,
{
    let mut map = HeaderMap::default();
    // Index of the field that continuation lines append to.
    let mut current: Option<usize> = None;

    for line in lines {
        if line.starts_with([' ', '\t']) {
            let continuation = line.trim();
            if continuation.is_empty() {
                continue;
            }
            if let Some(idx) = current {
                map.entries[idx].1.append_continuation(continuation);
            }
            continue;
        }

        let Some(caps) = FIELD_RE.captures(line) else {
            current = None;
            continue;
        };
        let name = canonical_name(&caps[1]);
        let value = caps[2].trim().to_string();

        let existing = map.entries.iter().position(|(k, _)| *k == name);
        current = match existing {
            None => {
                let stored = if name == RECEIVED {
                    HeaderValue::Multi(vec![value])
                } else {
                    HeaderValue::Text(value)
                };
                map.entries.push((name, stored));
                Some(map.entries.len() - 1)
            }
            Some(idx) => match &mut map.entries[idx].1 {
                HeaderValue::Multi(hops) => {
                    if !value.is_empty() && hops.last() != Some(&value) {
                        hops.push(value);
                        Some(idx)
                    } else {
                        None
                    }
                }
                slot if slot.is_empty() => {
                    *slot = HeaderValue::Text(value);
                    Some(idx)
                }
                _ => None,
            },
        };
    }

    map
}

/// Parse a CRLF-separated header block and decompose `Content-Type`.
pub fn parse_header(block: &str) -> HeaderMap {
    parse_header_lines(block.split("\r\n"))
}

/// Same as [`parse_header`] for a pre-split line list.
pub fn parse_header_lines<'a, I>(lines: I) -> HeaderMap
where
    I: IntoIterator<Item = &'a str>,
{
    let mut map = parse_lines(lines);

    if let Some(HeaderValue::Text(raw)) = map.get(CONTENT_TYPE) {
        let ct = ContentType::parse(raw);
        map.insert(CONTENT_TYPE, HeaderValue::ContentType(ct));
    }

    map
}
