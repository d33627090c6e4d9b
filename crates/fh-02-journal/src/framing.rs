//! Record framing: newline-delimited records, split and parse helpers.
//!
//! Shared by the writer's range reads and the replica's chunk parsing so
//! both sides agree on what "a complete record" means.

use shared_types::{EventRecord, HubError};

/// Split a byte range at the last record terminator.
///
/// Returns `(complete, partial_tail)`: `complete` ends with `\n` (or is
/// empty), `partial_tail` holds the trailing bytes of a record that was
/// mid-write or mid-fetch.
pub fn split_complete(bytes: &[u8]) -> (&[u8], &[u8]) {
    match bytes.iter().rposition(|b| *b == b'\n') {
        Some(pos) => bytes.split_at(pos + 1),
        None => (&bytes[..0], bytes),
    }
}

/// Parse a range of complete records.
///
/// The input must be what `split_complete` returned as `complete`; any
/// unparseable line is surfaced as chain corruption, not skipped.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<EventRecord>, HubError> {
    let mut records = Vec::new();
    for line in bytes.split(|b| *b == b'\n') {
        if line.is_empty() {
            continue;
        }
        records.push(EventRecord::decode_line(line)?);
    }
    Ok(records)
}
