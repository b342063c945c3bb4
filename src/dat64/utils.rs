//! File-level workflows: read a table file from disk, decode or analyze it,
//! and print operator-facing reports.
//!
//! The decoding and inference cores are pure functions over byte buffers;
//! everything that touches the filesystem or a terminal lives here.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::dat64::decoder::{self, DecodeOptions, DecodeOutput};
use crate::dat64::dump;
use crate::dat64::header::TableHeader;
use crate::dat64::infer::{self, InferConfig, InferenceReport};
use crate::dat64::layout::FieldLayout;
use crate::utils::format_size;

/// Patterns counted by the table-region sentinel scan, matching the null
/// markers seen in current data files.
pub const SCAN_PATTERNS: [[u8; 4]; 3] = [
    [0xFE, 0xFE, 0xFE, 0xFE],
    [0x00, 0x00, 0x00, 0x00],
    [0xFF, 0xFF, 0xFF, 0xFF],
];

/// Parse just the header of a table file
pub fn parse_header(path: &Path) -> Result<TableHeader> {
    let data = read_file(path)?;
    TableHeader::parse(&data).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Decode a table file with an explicit layout
pub fn decode_file(
    path: &Path,
    layout: &FieldLayout,
    options: &DecodeOptions,
) -> Result<DecodeOutput> {
    let data = read_file(path)?;
    let header =
        TableHeader::parse(&data).with_context(|| format!("Failed to parse {}", path.display()))?;
    decoder::decode(&data, &header, layout, options)
        .with_context(|| format!("Failed to decode {}", path.display()))
}

/// Run layout inference over a table file
pub fn infer_layout(path: &Path, config: &InferConfig) -> Result<InferenceReport> {
    let data = read_file(path)?;
    let header =
        TableHeader::parse(&data).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(infer::infer(&data, &header, config))
}

/// Hexdump part of a table file
pub fn dump_bytes(path: &Path, offset: usize, length: usize, width: usize) -> Result<String> {
    let data = read_file(path)?;
    Ok(dump::hexdump(&data, offset, length, width))
}

/// Print the geometry summary for one file
pub fn show_table_info(path: &Path, file_size: usize, header: &TableHeader) {
    println!("\nTable info for {}:", path.display());
    println!("  File size:      {} ({} bytes)", format_size(file_size as u64), file_size);
    println!("  Row count:      {}", header.row_count);
    println!(
        "  Magic offset:   {} (0x{:x})",
        header.magic_offset, header.magic_offset
    );
    println!("  Table length:   {} bytes", header.table_length);
    println!("  Record length:  {} bytes", header.record_length);
    println!("  Payload offset: {}", header.payload_offset);
    println!("  Payload length: {} bytes", header.payload_length);
}

/// Full analysis report for one file: geometry, hexdumps of the interesting
/// regions, sentinel counts over the table region, and the inference report.
///
/// A structurally broken file still gets its leading hexdump; when the
/// geometry cannot be derived there is simply less to show.
pub fn analyze_file(path: &Path, config: &InferConfig) -> Result<()> {
    let data = read_file(path)?;

    println!("{}", "=".repeat(80));
    println!("File: {}", path.display());
    println!("{}", "=".repeat(80));

    let header = match TableHeader::parse(&data) {
        Ok(header) => header,
        Err(err) => {
            println!("\nNot a decodable table file: {}", err);
            println!("\nFirst 256 bytes:");
            println!("{}", dump::hexdump(&data, 0, 256, 16));
            return Ok(());
        }
    };

    show_table_info(path, data.len(), &header);

    println!("\nFirst 256 bytes (header + table start):");
    println!("{}", dump::hexdump(&data, 0, 256, 16));

    println!("\nMagic delimiter region:");
    let magic_start = header.magic_offset.saturating_sub(32);
    println!("{}", dump::hexdump(&data, magic_start, 64, 16));

    println!("\nPayload start:");
    println!("{}", dump::hexdump(&data, header.payload_offset, 128, 16));

    let table = header.table(&data);
    let patterns: Vec<Vec<u8>> = SCAN_PATTERNS.iter().map(|p| p.to_vec()).collect();
    let counts = dump::scan_sentinel_frequency(table, &patterns);
    let mut found: Vec<(&String, &usize)> = counts.iter().filter(|(_, &c)| c > 0).collect();
    found.sort();
    if !found.is_empty() {
        println!("\nSentinel patterns in table region:");
        for (pattern, count) in found {
            println!("  {}: {} occurrences", pattern, count);
        }
    }

    if header.record_length > 0 {
        println!("\nFirst record (hex):");
        let first = &table[..header.record_length];
        for chunk in first.chunks(16) {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            println!("  {}", hex.join(" "));
        }
    }

    let report = infer::infer(&data, &header, config);
    println!("\n{}", infer::format_report(&report));

    Ok(())
}

/// Analyze several files in sequence, comparing their shapes.
///
/// A file that fails to read is reported and skipped; one bad file never
/// aborts the batch.
pub fn analyze_files(paths: &[impl AsRef<Path>], config: &InferConfig) -> Result<()> {
    for path in paths {
        if let Err(err) = analyze_file(path.as_ref(), config) {
            eprintln!("Warning: {:#}", err);
        }
        println!();
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
