//! Record encoding/decoding for the transaction log
//!
//! One record per line:
//!
//! ```text
//! <sequence>\t<kind>\t<key>\t<escaped-value>\n
//! ```
//!
//! - `kind` is the [`EventKind`] tag (1 = Delete, 2 = Put)
//! - `escaped-value` is percent-encoded; empty for Delete
//! - keys are written as-is (see [`kvlog_core::validate_key`])
//!
//! Decoding is split in two steps so replay can check the sequence number
//! before it spends time unescaping the value.

use kvlog_core::{Error, Event, EventKind, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes left unescaped in values: ASCII alphanumerics and `-_.~`
const VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escape a value for single-line storage
pub fn escape_value(value: &str) -> String {
    utf8_percent_encode(value, VALUE_ENCODE_SET).to_string()
}

/// Reverse [`escape_value`]
///
/// `+` decodes to a space. A `%` that is not followed by two hex digits,
/// or a result that is not UTF-8, is rejected.
pub fn unescape_value(escaped: &str) -> std::result::Result<String, String> {
    let bytes = escaped.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(format!("invalid escape at byte {}", i));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = escaped.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| format!("invalid UTF-8: {}", e))
}

/// Encode a sequenced event as one log line, newline included
pub fn encode_record(event: &Event) -> String {
    let value = match event.kind {
        EventKind::Put => escape_value(event.value_str()),
        EventKind::Delete => String::new(),
    };
    format!(
        "{}\t{}\t{}\t{}\n",
        event.sequence,
        event.kind.tag(),
        event.key,
        value
    )
}

/// A parsed log line whose value is still escaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    /// Persisted sequence number
    pub sequence: u64,
    /// Put or Delete
    pub kind: EventKind,
    /// Key, as written
    pub key: &'a str,
    /// Escaped value, as written
    pub escaped_value: &'a str,
}

impl<'a> Record<'a> {
    /// Split a line (without its trailing newline) into fields
    ///
    /// `line_no` is 1-based and only used for error reporting.
    pub fn parse(line: &'a str, line_no: u64) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedRecord {
            line: line_no,
            reason,
        };

        // Escaped values never contain a tab, so exactly four fields.
        let fields: Vec<&str> = line.split('\t').collect();
        let &[seq, kind, key, escaped_value] = fields.as_slice() else {
            return Err(malformed(format!(
                "expected 4 tab-separated fields, found {}",
                fields.len()
            )));
        };

        let sequence = seq
            .parse::<u64>()
            .map_err(|e| malformed(format!("bad sequence {:?}: {}", seq, e)))?;
        let kind = kind
            .parse::<u8>()
            .ok()
            .and_then(EventKind::from_tag)
            .ok_or_else(|| malformed(format!("unknown event kind {:?}", kind)))?;
        if key.is_empty() {
            return Err(malformed("empty key".to_string()));
        }

        Ok(Record {
            sequence,
            kind,
            key,
            escaped_value,
        })
    }

    /// Unescape the value and build the event
    pub fn into_event(self) -> Result<Event> {
        let value = match self.kind {
            EventKind::Put => Some(unescape_value(self.escaped_value).map_err(|reason| {
                Error::ValueDecodingFailure {
                    sequence: self.sequence,
                    reason,
                }
            })?),
            EventKind::Delete => None,
        };

        Ok(Event {
            sequence: self.sequence,
            kind: self.kind,
            key: self.key.to_string(),
            value,
        })
    }
}

/// Decode one line read after sequence `last`
///
/// Fails with [`Error::LogCorruption`] when the record's sequence does not
/// strictly increase.
pub fn decode_record(line: &str, line_no: u64, last: u64) -> Result<Event> {
    let record = Record::parse(line, line_no)?;
    if record.sequence <= last {
        return Err(Error::LogCorruption {
            last,
            found: record.sequence,
        });
    }
    record.into_event()
}
