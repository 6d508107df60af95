//! Error types for undbf

use thiserror::Error;

/// Main error type for undbf operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed Dbf header: {0}")]
    MalformedHeader(String),

    #[error("Malformed Dbf field: {0}")]
    MalformedField(String),

    #[error("Unknown field type tag 0x{tag:02X} in field {field:?}")]
    UnknownFieldType { field: String, tag: u8 },

    #[error("Cannot parse number {text:?} from field {field} at record {record}")]
    NumberFormat {
        field: String,
        record: u32,
        text: String,
    },

    #[error("Unknown memo encoding in field {field}: length {length} (expected 4 or 10)")]
    UnknownMemoEncoding { field: String, length: usize },

    #[error("Seeking is not supported by this source")]
    SeekUnsupported,

    #[error("Record index out of range [0, {count}): {index}")]
    IndexOutOfRange { index: u32, count: u32 },

    #[error("Reader is closed")]
    Closed,
}

/// Result type alias for undbf operations
pub type Result<T> = std::result::Result<T, Error>;
