//! Error types for undat64

use thiserror::Error;

/// Structural error for a table file. Any of these aborts the whole file.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("magic delimiter not found")]
    NoMagicFound,

    #[error("table length {table_length} is not divisible by row count {row_count}")]
    MisalignedTable { table_length: usize, row_count: u32 },

    #[error("layout width {actual} does not match file record length {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid layout spec: {0}")]
    InvalidLayout(String),

    #[error("row {row}, field '{field}': {source}")]
    Cell {
        row: usize,
        field: String,
        source: CellError,
    },
}

/// Failure localized to one field of one row. Recorded against the cell and
/// decoding continues, unless the caller asked for fail-fast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    #[error("offset {offset} + {needed} bytes exceeds payload length {payload_length}")]
    OffsetOutOfRange {
        offset: u64,
        needed: u64,
        payload_length: u64,
    },

    #[error("no string terminator found after payload offset {offset}")]
    UnterminatedString { offset: u64 },
}

/// Result type alias for undat64 operations
pub type Result<T> = std::result::Result<T, Error>;
