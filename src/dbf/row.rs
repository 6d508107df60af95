//! Named row view with typed accessors by column name.

use std::sync::Arc;
use time::Date;

use crate::dbf::header::DbfHeader;
use crate::dbf::value::DbfValue;

/// One decoded record with access to its columns by name.
///
/// Rows are snapshots: they share the header with the reader that produced
/// them but own their values and stay usable after the reader is closed or
/// dropped.
///
/// Every accessor returns an `Option`; `None` covers unknown column names,
/// unset values, and type mismatches alike, leaving the reaction to the
/// caller.
#[derive(Debug, Clone)]
pub struct DbfRow {
    header: Arc<DbfHeader>,
    values: Vec<DbfValue>,
}

impl DbfRow {
    pub(crate) fn new(header: Arc<DbfHeader>, values: Vec<DbfValue>) -> DbfRow {
        DbfRow { header, values }
    }

    /// Header of the file this row came from.
    pub fn header(&self) -> &DbfHeader {
        &self.header
    }

    /// All values in descriptor order.
    pub fn values(&self) -> &[DbfValue] {
        &self.values
    }

    /// Raw value of the named column.
    pub fn value(&self, name: &str) -> Option<&DbfValue> {
        self.header
            .field_index(name)
            .and_then(|i| self.values.get(i))
    }

    /// Raw bytes of a Character column.
    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        match self.value(name)? {
            DbfValue::Character(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Lossy UTF-8 rendering of a Character column. Callers that know the
    /// file's encoding should decode [`bytes`](Self::bytes) themselves.
    pub fn string(&self, name: &str) -> Option<String> {
        self.bytes(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn date(&self, name: &str) -> Option<Date> {
        match self.value(name)? {
            DbfValue::Date(date) => *date,
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.value(name)? {
            DbfValue::Float(value) => *value,
            _ => None,
        }
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        match self.value(name)? {
            DbfValue::Numeric(value) => *value,
            _ => None,
        }
    }

    pub fn logical(&self, name: &str) -> Option<bool> {
        match self.value(name)? {
            DbfValue::Logical(value) => Some(*value),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i32> {
        match self.value(name)? {
            DbfValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Memo-file block link of a Memo column.
    pub fn memo(&self, name: &str) -> Option<i64> {
        match self.value(name)? {
            DbfValue::Memo(link) => *link,
            _ => None,
        }
    }
}
