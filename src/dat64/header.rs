//! Table file header parsing and region geometry

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Error, Result};

/// The 8-byte delimiter separating the record table from the payload region.
pub const DAT_MAGIC: [u8; 8] = [0xBB; 8];

/// Size of the fixed file header: a single u32 row count.
pub const HEADER_SIZE: usize = 4;

/// Geometry of one table file, derived from its header and magic delimiter.
///
/// A table file is laid out as:
///
/// ```text
/// row_count (u32 LE) | TableRegion | BB BB BB BB BB BB BB BB | PayloadRegion
/// ```
///
/// The table holds `row_count` fixed-length records; the delimiter position is
/// data-dependent, so it is found by scanning. All pointer fields inside
/// records are offsets relative to the start of the payload region.
#[derive(Debug, Clone)]
pub struct TableHeader {
    /// Number of records in the table region
    pub row_count: u32,
    /// Absolute offset of the magic delimiter
    pub magic_offset: usize,
    /// Length of the table region in bytes
    pub table_length: usize,
    /// Length of one record, 0 when the table is empty
    pub record_length: usize,
    /// Absolute offset of the payload region
    pub payload_offset: usize,
    /// Length of the payload region in bytes
    pub payload_length: usize,
}

impl TableHeader {
    /// Quick check whether data plausibly is a table file
    pub fn is_table_file(data: &[u8]) -> bool {
        data.len() >= HEADER_SIZE + DAT_MAGIC.len()
            && data[HEADER_SIZE..].windows(DAT_MAGIC.len()).any(|w| w == DAT_MAGIC)
    }

    /// Parse the header and locate the table/payload boundary.
    ///
    /// Fails with [`Error::NoMagicFound`] when the delimiter is absent and
    /// with [`Error::MisalignedTable`] when the table region does not divide
    /// evenly into `row_count` records.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::NoMagicFound);
        }

        let mut cursor = Cursor::new(data);
        let row_count = cursor.read_u32::<LittleEndian>()?;

        // The delimiter can never sit inside the header, so scan from there.
        let magic_offset = data[HEADER_SIZE..]
            .windows(DAT_MAGIC.len())
            .position(|w| w == DAT_MAGIC)
            .map(|p| p + HEADER_SIZE)
            .ok_or(Error::NoMagicFound)?;

        let table_length = magic_offset - HEADER_SIZE;
        let record_length = if row_count == 0 {
            0
        } else {
            if table_length % row_count as usize != 0 {
                return Err(Error::MisalignedTable {
                    table_length,
                    row_count,
                });
            }
            table_length / row_count as usize
        };

        let payload_offset = magic_offset + DAT_MAGIC.len();
        let payload_length = data.len() - payload_offset;

        Ok(TableHeader {
            row_count,
            magic_offset,
            table_length,
            record_length,
            payload_offset,
            payload_length,
        })
    }

    /// The table region of the buffer this header was parsed from
    pub fn table<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[HEADER_SIZE..self.magic_offset]
    }

    /// The payload region of the buffer this header was parsed from
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.payload_offset..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_file(row_count: u32, table: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut data = row_count.to_le_bytes().to_vec();
        data.extend_from_slice(table);
        data.extend_from_slice(&DAT_MAGIC);
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_parse_geometry() {
        let data = table_file(2, &[0u8; 28], &[1, 2, 3, 4]);
        let header = TableHeader::parse(&data).unwrap();
        assert_eq!(header.row_count, 2);
        assert_eq!(header.magic_offset, 32);
        assert_eq!(header.table_length, header.magic_offset - HEADER_SIZE);
        assert_eq!(header.record_length, 14);
        assert_eq!(header.payload_offset, 40);
        assert_eq!(header.payload_length, 4);
        assert_eq!(header.record_length * header.row_count as usize, header.table_length);
        assert_eq!(header.table(&data).len(), 28);
        assert_eq!(header.payload(&data), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_table() {
        let data = table_file(0, &[], &[0xAA]);
        let header = TableHeader::parse(&data).unwrap();
        assert_eq!(header.row_count, 0);
        assert_eq!(header.table_length, 0);
        assert_eq!(header.record_length, 0);
        assert_eq!(header.payload_length, 1);
    }

    #[test]
    fn test_no_magic() {
        let data = vec![1, 0, 0, 0, 0xBB, 0xBB, 0xBB, 0xBB];
        assert!(matches!(TableHeader::parse(&data), Err(Error::NoMagicFound)));
        assert!(matches!(TableHeader::parse(&[]), Err(Error::NoMagicFound)));
    }

    #[test]
    fn test_misaligned_table() {
        // 15 table bytes do not divide into 2 records
        let data = table_file(2, &[0u8; 15], &[]);
        match TableHeader::parse(&data) {
            Err(Error::MisalignedTable {
                table_length,
                row_count,
            }) => {
                assert_eq!(table_length, 15);
                assert_eq!(row_count, 2);
            }
            other => panic!("expected MisalignedTable, got {:?}", other.map(|h| h.record_length)),
        }
    }

    #[test]
    fn test_is_table_file() {
        assert!(TableHeader::is_table_file(&table_file(1, &[0u8; 8], &[])));
        assert!(!TableHeader::is_table_file(b"not a table"));
        assert!(!TableHeader::is_table_file(&[]));
    }
}
