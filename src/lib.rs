//! # undat64
//!
//! A Rust library for decoding and reverse engineering `.datc64` table files.
//!
//! ## Overview
//!
//! `.datc64` files store game data as a homogeneous array of fixed-length
//! records plus a trailing payload region of strings and lists. The record
//! layout is not declared anywhere in the file, which makes the format a
//! reverse-engineering exercise. This library provides:
//!
//! - Header parsing and table/payload boundary detection
//! - Record decoding against a caller-supplied field layout, with
//!   bounds-checked resolution of string and list pointers
//! - Partial-success decoding: bad cells are recorded as diagnostics while
//!   the rest of the file keeps decoding
//! - Heuristic column-type inference for files with unknown layouts
//! - Hexdump and sentinel-frequency diagnostics for manual analysis
//!
//! ## Example - Decoding
//!
//! ```rust,no_run
//! use undat64::{decode, DecodeOptions, FieldLayout, TableHeader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("acts.datc64")?;
//!     let header = TableHeader::parse(&data)?;
//!
//!     let layout: FieldLayout = "acts:list[u64],name:string".parse()?;
//!     let layout = layout.padded_to(header.record_length);
//!
//!     let output = decode(&data, &header, &layout, &DecodeOptions::default())?;
//!     for (i, row) in output.rows.iter().enumerate() {
//!         println!("row {}: {:?}", i, row.get("name"));
//!     }
//!     for diag in &output.diagnostics {
//!         eprintln!("{}", diag);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Inference
//!
//! ```rust,no_run
//! use undat64::{format_report, infer, InferConfig, TableHeader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("unknown.datc64")?;
//!     let header = TableHeader::parse(&data)?;
//!
//!     let report = infer(&data, &header, &InferConfig::default());
//!     print!("{}", format_report(&report));
//!     Ok(())
//! }
//! ```

pub mod dat64;
pub mod error;
pub mod utils;

pub use dat64::decoder::{decode, CellDiagnostic, DecodeOptions, DecodeOutput, DecodedRow, Value};
pub use dat64::dump::{hexdump, scan_sentinel_frequency};
pub use dat64::header::{TableHeader, DAT_MAGIC, HEADER_SIZE};
pub use dat64::infer::{
    format_report, infer, Classification, InferConfig, InferenceReport, Observation,
};
pub use dat64::layout::{FieldLayout, FieldSpec, FieldType};
pub use dat64::payload::{read_list, read_string};
pub use error::{CellError, Error, Result};
