//! `.datc64` binary table format parser
//!
//! Table files store one homogeneous array of fixed-length records followed
//! by a variable-length payload region. The field layout of a record is not
//! declared in the file; it is supplied by the caller or inferred from byte
//! patterns.
//!
//! ## Format Overview
//!
//! A table file consists of:
//! - 4-byte header holding the row count (u32 little-endian)
//! - Table region: `row_count` contiguous fixed-length records
//! - 8-byte magic delimiter (`BB` repeated)
//! - Payload region: strings and lists referenced by offset from the table
//!
//! ## Example
//!
//! ```rust,no_run
//! use undat64::dat64::header::TableHeader;
//! use undat64::dat64::{decoder, layout::FieldLayout};
//!
//! let data = std::fs::read("acts.datc64")?;
//! let header = TableHeader::parse(&data)?;
//!
//! let layout: FieldLayout = "acts:list[u64],name:string".parse()?;
//! let layout = layout.padded_to(header.record_length);
//! let output = decoder::decode(&data, &header, &layout, &Default::default())?;
//!
//! for row in &output.rows {
//!     println!("{:?}", row.get("name"));
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod decoder;
pub mod dump;
pub mod header;
pub mod infer;
pub mod layout;
pub mod payload;
pub mod utils;

pub use decoder::{decode, CellDiagnostic, DecodeOptions, DecodeOutput, DecodedRow, Value};
pub use dump::{hexdump, scan_sentinel_frequency};
pub use header::{TableHeader, DAT_MAGIC, HEADER_SIZE};
pub use infer::{format_report, infer, Classification, InferConfig, InferenceReport, Observation};
pub use layout::{FieldLayout, FieldSpec, FieldType};
pub use payload::{read_list, read_string};
