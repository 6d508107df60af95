//! Typed record values and the per-type field decoders.
//!
//! Decoding is pure: each function maps a field's raw byte buffer (already
//! read at the field's declared length) to a [`DbfValue`]. Unset fields
//! decode to the `None` side of their variant, never to an error.

use std::fmt;
use time::{Date, Month};

use crate::dbf::field::{DbfDataType, DbfField};
use crate::dbf::utils;
use crate::error::{Error, Result};

/// One decoded field value.
///
/// Character data stays raw: Dbf files do not declare their character
/// encoding, so decoding to text is the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub enum DbfValue {
    Character(Vec<u8>),
    Date(Option<Date>),
    Float(Option<f32>),
    Numeric(Option<f64>),
    Logical(bool),
    Integer(i32),
    /// Block link into the external memo file; not resolved here.
    Memo(Option<i64>),
}

impl DbfValue {
    /// `true` when the field held no value (blank or `?`-marked).
    pub fn is_unset(&self) -> bool {
        matches!(
            self,
            DbfValue::Date(None)
                | DbfValue::Float(None)
                | DbfValue::Numeric(None)
                | DbfValue::Memo(None)
        )
    }
}

impl fmt::Display for DbfValue {
    /// Character data renders as lossy UTF-8; unset values render empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbfValue::Character(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            DbfValue::Date(Some(date)) => write!(f, "{}", date),
            DbfValue::Float(Some(value)) => write!(f, "{}", value),
            DbfValue::Numeric(Some(value)) => write!(f, "{}", value),
            DbfValue::Logical(value) => write!(f, "{}", value),
            DbfValue::Integer(value) => write!(f, "{}", value),
            DbfValue::Memo(Some(link)) => write!(f, "{}", link),
            DbfValue::Date(None) | DbfValue::Float(None) | DbfValue::Numeric(None)
            | DbfValue::Memo(None) => Ok(()),
        }
    }
}

/// Decode one field buffer according to the field's type tag.
///
/// `record` is the zero-based index of the record being read, carried into
/// decode errors so a bad file can be diagnosed without re-reading it.
pub fn decode(field: &DbfField, record: u32, buf: &[u8]) -> Result<DbfValue> {
    match field.data_type() {
        DbfDataType::Character => Ok(DbfValue::Character(buf.to_vec())),
        DbfDataType::Date => decode_date(field, buf).map(DbfValue::Date),
        DbfDataType::Float => decode_float(field, record, buf).map(DbfValue::Float),
        DbfDataType::Logical => Ok(DbfValue::Logical(decode_logical(buf))),
        DbfDataType::Numeric => decode_numeric(field, record, buf).map(DbfValue::Numeric),
        DbfDataType::Integer => decode_integer(field, buf).map(DbfValue::Integer),
        DbfDataType::Memo => decode_memo(field, record, buf).map(DbfValue::Memo),
    }
}

/// Decode 8 ASCII digits as `YYYYMMDD`.
///
/// Blank and all-zero buffers are unset. Digit groups that do not name a
/// real calendar date (month 13, day 0) are also unset rather than an
/// error: such values appear in the wild and carry no recoverable intent.
pub fn decode_date(field: &DbfField, buf: &[u8]) -> Result<Option<Date>> {
    if buf.len() != 8 {
        return Err(Error::MalformedField(format!(
            "date field {} is {} bytes, expected 8",
            field.name(),
            buf.len()
        )));
    }
    if buf.iter().all(|&b| b == b' ' || b == b'0') {
        return Ok(None);
    }

    let year = utils::parse_digits(&buf[0..4]);
    let month = utils::parse_digits(&buf[4..6]);
    let day = utils::parse_digits(&buf[6..8]);

    let month = match u8::try_from(month).ok().and_then(|m| Month::try_from(m).ok()) {
        Some(m) => m,
        None => return Ok(None),
    };
    Ok(Date::from_calendar_date(year, month, day as u8).ok())
}

/// Left-trim and validate the text of a numeric field.
///
/// Shared by the Numeric, Float and 10-byte Memo decoders so leading zeros
/// and surrounding whitespace behave identically across all three. Returns
/// `None` when the field holds no value: blank content, or the literal `?`
/// some writers use to mark unset numbers.
fn numeric_text(buf: &[u8]) -> Option<&[u8]> {
    let mut text = utils::trim_left_spaces(buf);
    while let [rest @ .., b' '] = text {
        text = rest;
    }
    if text.is_empty() || text.contains(&b'?') {
        None
    } else {
        Some(text)
    }
}

fn number_error(field: &DbfField, record: u32, text: &[u8]) -> Error {
    Error::NumberFormat {
        field: field.name().to_owned(),
        record,
        text: String::from_utf8_lossy(text).into_owned(),
    }
}

pub fn decode_float(field: &DbfField, record: u32, buf: &[u8]) -> Result<Option<f32>> {
    match numeric_text(buf) {
        None => Ok(None),
        Some(text) => std::str::from_utf8(text)
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .map(Some)
            .ok_or_else(|| number_error(field, record, text)),
    }
}

pub fn decode_numeric(field: &DbfField, record: u32, buf: &[u8]) -> Result<Option<f64>> {
    match numeric_text(buf) {
        None => Ok(None),
        Some(text) => std::str::from_utf8(text)
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .map(Some)
            .ok_or_else(|| number_error(field, record, text)),
    }
}

/// Single byte; true iff `Y`, `y`, `T` or `t`. Every other byte, including
/// blank/unset markers, is false.
pub fn decode_logical(buf: &[u8]) -> bool {
    matches!(buf.first(), Some(b'Y' | b'y' | b'T' | b't'))
}

pub fn decode_integer(field: &DbfField, buf: &[u8]) -> Result<i32> {
    let bytes: [u8; 4] = buf.try_into().map_err(|_| {
        Error::MalformedField(format!(
            "integer field {} is {} bytes, expected 4",
            field.name(),
            buf.len()
        ))
    })?;
    Ok(i32::from_le_bytes(bytes))
}

/// Memo link decoding diverges by declared length: 4-byte fields hold a
/// little-endian block number, 10-byte fields hold it as ASCII decimal.
pub fn decode_memo(field: &DbfField, record: u32, buf: &[u8]) -> Result<Option<i64>> {
    match buf.len() {
        4 => {
            let bytes = [buf[0], buf[1], buf[2], buf[3]];
            Ok(Some(i32::from_le_bytes(bytes) as i64))
        }
        10 => match numeric_text(buf) {
            None => Ok(None),
            Some(text) => std::str::from_utf8(text)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .map(Some)
                .ok_or_else(|| number_error(field, record, text)),
        },
        length => Err(Error::UnknownMemoEncoding {
            field: field.name().to_owned(),
            length,
        }),
    }
}
