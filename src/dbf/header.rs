//! Dbf file header parsing

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use crate::dbf::field::DbfField;
use crate::error::{Error, Result};

/// Parsed Dbf file header: the fixed 32-byte preamble plus the field
/// descriptor table.
///
/// The header is parsed once when the file is opened and is immutable
/// afterwards; the reader shares it read-only with callers and rows.
#[derive(Debug)]
pub struct DbfHeader {
    version: u8,
    year: u8,
    month: u8,
    day: u8,
    record_count: u32,
    header_length: u16,
    record_length: u16,
    fields: Vec<DbfField>,
}

impl DbfHeader {
    /// Parse the header from the start of a Dbf stream.
    ///
    /// Reads the 32-byte preamble, then descriptors until the 0x0D
    /// terminator. The terminator position is the true end of the table
    /// regardless of what the declared header length implies.
    pub fn parse<R: Read>(input: &mut R) -> Result<DbfHeader> {
        let version = read_preamble_u8(input)?;
        let year = read_preamble_u8(input)?;
        let month = read_preamble_u8(input)?;
        let day = read_preamble_u8(input)?;
        let record_count = input
            .read_u32::<LittleEndian>()
            .map_err(preamble_error)?;
        let header_length = input
            .read_u16::<LittleEndian>()
            .map_err(preamble_error)?;
        let record_length = input
            .read_u16::<LittleEndian>()
            .map_err(preamble_error)?;

        let mut reserved = [0u8; 20];
        input.read_exact(&mut reserved).map_err(preamble_error)?;

        let mut fields = Vec::new();
        while let Some(field) = DbfField::parse(input, fields.len())? {
            fields.push(field);
        }

        Ok(DbfHeader {
            version,
            year,
            month,
            day,
            record_count,
            header_length,
            record_length,
            fields,
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Last-update year. The file stores an offset from 1900.
    pub fn year(&self) -> u16 {
        1900 + self.year as u16
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Total records in the file, live and deleted.
    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    /// Declared byte length of the whole header area.
    pub fn header_length(&self) -> u16 {
        self.header_length
    }

    /// Fixed byte length of one record, including the deletion flag.
    pub fn record_length(&self) -> u16 {
        self.record_length
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[DbfField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&DbfField> {
        self.fields.get(index)
    }

    /// Ordinal of the named column. Unknown names are a `None`, not an
    /// error; the caller decides how to react.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&DbfField> {
        self.field_index(name).map(|i| &self.fields[i])
    }
}

fn read_preamble_u8<R: Read>(input: &mut R) -> Result<u8> {
    input.read_u8().map_err(preamble_error)
}

fn preamble_error(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::MalformedHeader("source too small for the fixed preamble".into())
    } else {
        Error::Io(e)
    }
}
