// Flow log line parsing. Only dstport and protocol are extracted; every
// other field is ignored.

use std::str::FromStr;

use crate::models::domain::ParsedRecord;

/// Minimum number of whitespace-separated fields in a version 2 flow log record.
pub const MIN_FIELDS: usize = 14;

const DSTPORT_FIELD: usize = 6;
const PROTOCOL_FIELD: usize = 7;

/// Why a line was not turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooFewFields(usize),
    BadPort,
    BadProtocol,
}

/// Parses a field made only of ASCII digits. Signs and whitespace are rejected.
pub(crate) fn parse_decimal<T: FromStr>(field: &str) -> Option<T> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Like [`parse_decimal`], but digit strings too long for `u64` saturate to
/// `u64::MAX`, which still resolves to the unknown protocol.
fn parse_protocol_number(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(field.parse().unwrap_or(u64::MAX))
}

pub fn parse(line: &str) -> Result<ParsedRecord, Rejection> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Err(Rejection::TooFewFields(fields.len()));
    }

    let port = parse_decimal::<u16>(fields[DSTPORT_FIELD]).ok_or(Rejection::BadPort)?;
    let protocol_number =
        parse_protocol_number(fields[PROTOCOL_FIELD]).ok_or(Rejection::BadProtocol)?;

    Ok(ParsedRecord {
        port,
        protocol_number,
    })
}
