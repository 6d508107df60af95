//! # undbf
//!
//! A Rust library for reading and decoding xBase `.dbf` table files.
//!
//! ## Overview
//!
//! The `.dbf` format stores one flat table per file: a fixed header, a
//! field descriptor table, and fixed-length records prefixed by a deletion
//! flag. This library provides:
//!
//! - Header and field-descriptor parsing
//! - Sequential record scanning with transparent deleted-record skipping
//! - Direct seeking to a record index on seekable sources
//! - Typed value decoding for Character, Date, Float, Logical, Numeric,
//!   Integer and Memo fields, including both memo-link encodings
//! - Named row access and text export helpers
//!
//! Character fields are yielded as raw bytes: `.dbf` files do not declare
//! their character encoding, so interpreting text is left to the caller.
//!
//! ## Example - Scanning
//!
//! ```rust,no_run
//! use undbf::DbfReader;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut reader = DbfReader::open("customers.dbf")?;
//!
//!     println!("{} records", reader.record_count());
//!     while let Some(row) = reader.next_row()? {
//!         println!("{:?} {:?}", row.string("NAME"), row.numeric("BALANCE"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Seeking
//!
//! ```rust,no_run
//! use undbf::DbfReader;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut reader = DbfReader::open("customers.dbf")?;
//!
//!     if reader.can_seek() {
//!         reader.seek_to_record(41)?;
//!         let row = reader.next_record()?;
//!         println!("{:?}", row);
//!     }
//!     Ok(())
//! }
//! ```

pub mod dbf;
pub mod error;
pub mod processor;

pub use dbf::{DbfDataType, DbfField, DbfHeader, DbfReader, DbfRow, DbfValue, Rows};
pub use error::{Error, Result};
