//! Dbf record cursor: sequential scanning and capability-gated seeking.

use byteorder::ReadBytesExt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::dbf::header::DbfHeader;
use crate::dbf::row::DbfRow;
use crate::dbf::value::{self, DbfValue};
use crate::error::{Error, Result};

/// End-of-data marker terminating the record area.
const DATA_ENDED: u8 = 0x1A;
/// Deletion flag marking a record as removed.
const DATA_DELETED: u8 = 0x2A;

trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Byte source behind a reader. Seeking is only available for the
/// `Seekable` variant; everything else is a single capability check.
enum Source {
    Sequential(Box<dyn Read>),
    Seekable(Box<dyn ReadSeek>),
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Sequential(input) => input.read(buf),
            Source::Seekable(input) => input.read(buf),
        }
    }
}

impl Source {
    fn can_seek(&self) -> bool {
        matches!(self, Source::Seekable(_))
    }

    fn seek_to(&mut self, position: u64) -> Result<()> {
        match self {
            Source::Sequential(_) => Err(Error::SeekUnsupported),
            Source::Seekable(input) => {
                input.seek(SeekFrom::Start(position))?;
                Ok(())
            }
        }
    }

    /// Skip `count` bytes. Running out of source during a skip is not an
    /// error; the following read observes the end instead.
    fn skip(&mut self, count: u64) -> io::Result<()> {
        match self {
            Source::Sequential(input) => {
                io::copy(&mut input.by_ref().take(count), &mut io::sink())?;
                Ok(())
            }
            Source::Seekable(input) => {
                input.seek(SeekFrom::Current(count as i64))?;
                Ok(())
            }
        }
    }
}

/// Reader over one Dbf file: parses the header on construction, then yields
/// decoded rows one at a time.
///
/// Deleted records are skipped transparently and the 0x1A end marker (or
/// plain end-of-source) ends iteration with `Ok(None)`. The cursor is
/// strictly single-owner: it is not safe to share across threads, and a
/// caller needing concurrent access opens independent readers.
///
/// ## Example
///
/// ```rust,no_run
/// use undbf::DbfReader;
///
/// let mut reader = DbfReader::open("legacy.dbf")?;
/// while let Some(row) = reader.next_row()? {
///     println!("{:?}", row.string("NAME"));
/// }
/// # Ok::<(), undbf::Error>(())
/// ```
pub struct DbfReader {
    source: Option<Source>,
    header: Arc<DbfHeader>,
    records_read: u32,
    exhausted: bool,
}

impl DbfReader {
    /// Open a Dbf file from disk. File sources support seeking.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<DbfReader> {
        let file = File::open(path)?;
        Self::with_source(Source::Seekable(Box::new(BufReader::new(file))))
    }

    /// Read from any seekable byte source, e.g. an in-memory cursor.
    pub fn from_seekable<R: Read + Seek + 'static>(source: R) -> Result<DbfReader> {
        Self::with_source(Source::Seekable(Box::new(source)))
    }

    /// Read from a forward-only byte source. `seek_to_record` is
    /// unavailable on readers built this way.
    pub fn from_reader<R: Read + 'static>(source: R) -> Result<DbfReader> {
        Self::with_source(Source::Sequential(Box::new(source)))
    }

    fn with_source(mut source: Source) -> Result<DbfReader> {
        let header = DbfHeader::parse(&mut source)?;
        let mut reader = DbfReader {
            source: Some(source),
            header: Arc::new(header),
            records_read: 0,
            exhausted: false,
        };
        reader.skip_to_data_start()?;
        Ok(reader)
    }

    /// Skip padding between the descriptor table and the first record.
    ///
    /// The declared header length normally equals `32 + 32 * fields + 1`;
    /// when it declares more, the surplus is padding to skip. A shorter
    /// declaration is left alone rather than guessed at.
    fn skip_to_data_start(&mut self) -> Result<()> {
        let table_end = 32 * (self.header.field_count() as i64 + 1) + 1;
        let padding = self.header.header_length() as i64 - table_end;
        if padding > 0 {
            self.source_mut()?.skip(padding as u64)?;
        }
        Ok(())
    }

    fn source_mut(&mut self) -> Result<&mut Source> {
        self.source.as_mut().ok_or(Error::Closed)
    }

    /// Header of the open file, shared read-only.
    pub fn header(&self) -> &DbfHeader {
        &self.header
    }

    /// Total records in the file, live and deleted.
    pub fn record_count(&self) -> u32 {
        self.header.record_count()
    }

    /// Read and decode the next live record.
    ///
    /// Deleted records are skipped without surfacing. `Ok(None)` signals
    /// the end of the record area and every later call keeps returning it
    /// without touching the source. A source that ends without the 0x1A
    /// marker gets the same graceful stop.
    pub fn next_record(&mut self) -> Result<Option<Vec<DbfValue>>> {
        if self.source.is_none() {
            return Err(Error::Closed);
        }
        if self.exhausted {
            return Ok(None);
        }

        let skip_length = (self.header.record_length() as u64).saturating_sub(1);
        loop {
            let flag = match self.source_mut()?.read_u8() {
                Ok(byte) => byte,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(e) => return Err(Error::Io(e)),
            };

            if flag == DATA_ENDED {
                self.exhausted = true;
                return Ok(None);
            }
            if flag == DATA_DELETED {
                self.source_mut()?.skip(skip_length)?;
                continue;
            }
            return self.read_record_values();
        }
    }

    /// Like [`next_record`](Self::next_record), wrapping the values into a
    /// [`DbfRow`] for access by column name.
    pub fn next_row(&mut self) -> Result<Option<DbfRow>> {
        let header = Arc::clone(&self.header);
        Ok(self
            .next_record()?
            .map(|values| DbfRow::new(header, values)))
    }

    /// Iterate over the remaining live rows.
    pub fn rows(&mut self) -> Rows<'_> {
        Rows { reader: self }
    }

    fn read_record_values(&mut self) -> Result<Option<Vec<DbfValue>>> {
        let header = Arc::clone(&self.header);
        let record = self.records_read;
        let mut values = Vec::with_capacity(header.field_count());
        let mut buf = Vec::new();

        for field in header.fields() {
            buf.resize(field.length(), 0);
            match self.source_mut()?.read_exact(&mut buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    // Truncated trailing record: treat like the end marker
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(e) => return Err(Error::Io(e)),
            }
            values.push(value::decode(field, record, &buf)?);
        }

        self.records_read += 1;
        Ok(Some(values))
    }

    /// `true` when the underlying source supports `seek_to_record`.
    pub fn can_seek(&self) -> bool {
        self.source.as_ref().is_some_and(Source::can_seek)
    }

    /// Position the cursor so the next read returns record `index`.
    ///
    /// The target offset is `header_length + index * record_length`. A
    /// deleted record at the target is not skipped here; the following
    /// `next_record` call applies the deletion rules from the new position.
    pub fn seek_to_record(&mut self, index: u32) -> Result<()> {
        let source = self.source.as_mut().ok_or(Error::Closed)?;
        if !source.can_seek() {
            return Err(Error::SeekUnsupported);
        }
        let count = self.header.record_count();
        if index >= count {
            return Err(Error::IndexOutOfRange { index, count });
        }

        let position = self.header.header_length() as u64
            + index as u64 * self.header.record_length() as u64;
        source.seek_to(position)?;
        self.exhausted = false;
        self.records_read = index;
        Ok(())
    }

    /// Release the underlying source. Idempotent: closing twice is a
    /// no-op. Reads and seeks after close fail with [`Error::Closed`].
    pub fn close(&mut self) {
        self.source = None;
    }
}

/// Iterator over the live rows of a [`DbfReader`], as produced by
/// [`DbfReader::rows`].
pub struct Rows<'a> {
    reader: &'a mut DbfReader,
}

impl Iterator for Rows<'_> {
    type Item = Result<DbfRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_row().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbf::field::DbfDataType;
    use std::io::Cursor;

    /// Field spec for fixture building: (name, tag, length).
    type FieldSpec = (&'static str, u8, u8);

    /// Assemble an in-memory Dbf file from field specs and raw record
    /// payloads. Each payload is the record without its deletion flag.
    fn make_dbf(
        fields: &[FieldSpec],
        records: &[(u8, &[u8])],
        record_count: u32,
        end_marker: bool,
    ) -> Vec<u8> {
        let record_length: usize = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();
        let header_length = 32 + 32 * fields.len() + 1;

        let mut bytes = vec![0x03, 123, 4, 1];
        bytes.extend_from_slice(&record_count.to_le_bytes());
        bytes.extend_from_slice(&(header_length as u16).to_le_bytes());
        bytes.extend_from_slice(&(record_length as u16).to_le_bytes());
        bytes.extend_from_slice(&[0u8; 20]);

        for (name, tag, length) in fields {
            let mut descriptor = vec![0u8; 32];
            descriptor[..name.len()].copy_from_slice(name.as_bytes());
            descriptor[11] = *tag;
            descriptor[16] = *length;
            bytes.extend_from_slice(&descriptor);
        }
        bytes.push(0x0D);

        for (flag, payload) in records {
            assert_eq!(payload.len(), record_length - 1);
            bytes.push(*flag);
            bytes.extend_from_slice(payload);
        }
        if end_marker {
            bytes.push(DATA_ENDED);
        }
        bytes
    }

    const FIELDS: &[FieldSpec] = &[("NAME", b'C', 4), ("AGE", b'N', 3)];

    fn small_fixture(end_marker: bool) -> Vec<u8> {
        make_dbf(
            FIELDS,
            &[
                (b' ', b"Ann  23"),
                (DATA_DELETED, b"Gone 99"),
                (b' ', b"Bob  31"),
            ],
            3,
            end_marker,
        )
    }

    fn name_of(values: &[DbfValue]) -> String {
        match &values[0] {
            DbfValue::Character(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            other => panic!("expected character value, got {other:?}"),
        }
    }

    #[test]
    fn test_drain_skips_deleted() {
        let mut reader = DbfReader::from_seekable(Cursor::new(small_fixture(true))).unwrap();
        assert_eq!(reader.record_count(), 3);

        let first = reader.next_record().unwrap().unwrap();
        assert_eq!(name_of(&first), "Ann ");
        assert_eq!(first[1], DbfValue::Numeric(Some(23.0)));

        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(name_of(&second), "Bob ");

        // two live rows + one skipped deleted row account for the header count
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut reader = DbfReader::from_seekable(Cursor::new(small_fixture(true))).unwrap();
        while reader.next_record().unwrap().is_some() {}
        assert!(reader.next_record().unwrap().is_none());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_missing_end_marker() {
        let mut reader = DbfReader::from_seekable(Cursor::new(small_fixture(false))).unwrap();
        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_none());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_sequential_reader_drains() {
        let data = small_fixture(true);
        let mut reader = DbfReader::from_reader(Cursor::new(data)).unwrap();
        assert!(!reader.can_seek());
        assert_eq!(reader.rows().count(), 2);
    }

    #[test]
    fn test_seek_matches_sequential() {
        let data = small_fixture(true);

        let mut sequential = DbfReader::from_seekable(Cursor::new(data.clone())).unwrap();
        let expected = sequential.next_record().unwrap().unwrap();

        let mut seeking = DbfReader::from_seekable(Cursor::new(data)).unwrap();
        assert!(seeking.can_seek());
        seeking.next_record().unwrap();
        seeking.seek_to_record(0).unwrap();
        assert_eq!(seeking.next_record().unwrap().unwrap(), expected);
    }

    #[test]
    fn test_seek_to_deleted_record_yields_next_live() {
        let data = small_fixture(true);
        let mut reader = DbfReader::from_seekable(Cursor::new(data)).unwrap();
        // record 1 is deleted; seeking there is allowed and the next read
        // falls through to record 2
        reader.seek_to_record(1).unwrap();
        let row = reader.next_record().unwrap().unwrap();
        assert_eq!(name_of(&row), "Bob ");
    }

    #[test]
    fn test_seek_after_drain() {
        let data = small_fixture(true);
        let mut reader = DbfReader::from_seekable(Cursor::new(data)).unwrap();
        while reader.next_record().unwrap().is_some() {}
        reader.seek_to_record(2).unwrap();
        let row = reader.next_record().unwrap().unwrap();
        assert_eq!(name_of(&row), "Bob ");
    }

    #[test]
    fn test_seek_out_of_range() {
        let data = small_fixture(true);
        let mut reader = DbfReader::from_seekable(Cursor::new(data)).unwrap();
        let err = reader.seek_to_record(3).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfRange { index: 3, count: 3 }
        ));
    }

    #[test]
    fn test_seek_unsupported() {
        let data = small_fixture(true);
        let mut reader = DbfReader::from_reader(Cursor::new(data)).unwrap();
        assert!(matches!(
            reader.seek_to_record(0).unwrap_err(),
            Error::SeekUnsupported
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let data = small_fixture(true);
        let mut reader = DbfReader::from_seekable(Cursor::new(data)).unwrap();
        reader.close();
        reader.close();
        assert!(matches!(reader.next_record(), Err(Error::Closed)));
        assert!(matches!(reader.seek_to_record(0), Err(Error::Closed)));
        assert!(!reader.can_seek());
    }

    #[test]
    fn test_wide_descriptor_table_with_memo() {
        // 39 fields, a 4-byte memo link at ordinal 25, the rest single
        // characters; mirrors the shape of real FoxPro exports
        let mut fields: Vec<FieldSpec> = Vec::new();
        const NAMES: [&str; 39] = [
            "F00", "F01", "F02", "F03", "F04", "F05", "F06", "F07", "F08", "F09", "F10", "F11",
            "F12", "F13", "F14", "F15", "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23",
            "F24", "MEMO", "F26", "F27", "F28", "F29", "F30", "F31", "F32", "F33", "F34", "F35",
            "F36", "F37", "F38",
        ];
        for (i, name) in NAMES.into_iter().enumerate() {
            if i == 25 {
                fields.push((name, b'M', 4));
            } else {
                fields.push((name, b'C', 1));
            }
        }

        let mut payload = Vec::new();
        for i in 0..39usize {
            if i == 25 {
                payload.extend_from_slice(&218i32.to_le_bytes());
            } else {
                payload.push(b'x');
            }
        }

        let data = make_dbf(&fields, &[(b' ', &payload)], 1, true);
        let mut reader = DbfReader::from_seekable(Cursor::new(data)).unwrap();

        let header = reader.header();
        assert_eq!(header.field_count(), 39);
        assert_eq!(
            header.field(25).unwrap().data_type(),
            DbfDataType::Memo
        );
        assert_eq!(header.field_index("MEMO"), Some(25));

        let row = reader.next_record().unwrap().unwrap();
        assert_eq!(row[25], DbfValue::Memo(Some(218)));
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_header_padding_is_skipped() {
        // Declare 2 bytes of padding between the descriptor table and the
        // first record, as some writers emit
        let mut bytes = vec![0x03, 123, 4, 1];
        bytes.extend_from_slice(&1u32.to_le_bytes());
        let header_length = (32 + 32 + 1 + 2) as u16;
        bytes.extend_from_slice(&header_length.to_le_bytes());
        bytes.extend_from_slice(&5u16.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 20]);

        let mut descriptor = vec![0u8; 32];
        descriptor[..4].copy_from_slice(b"NAME");
        descriptor[11] = b'C';
        descriptor[16] = 4;
        bytes.extend_from_slice(&descriptor);
        bytes.push(0x0D);
        bytes.extend_from_slice(&[0xEE, 0xEE]); // padding
        bytes.push(b' ');
        bytes.extend_from_slice(b"Carl");
        bytes.push(DATA_ENDED);

        let mut reader = DbfReader::from_seekable(Cursor::new(bytes)).unwrap();
        let row = reader.next_record().unwrap().unwrap();
        assert_eq!(name_of(&row), "Carl");
    }
}
