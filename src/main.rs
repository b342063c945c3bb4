//! undat64 - inspect and decode .datc64 table files
//!
//! Usage:
//!   undat64 info <file>                      - Show table geometry
//!   undat64 decode <file> -l <layout>        - Decode with an explicit layout
//!   undat64 infer <file>...                  - Analyze files with unknown layouts
//!   undat64 dump <file> [-o N] [-n N]        - Hexdump part of a file
//!   undat64 scan <dir> [-f GLOB]             - Count sentinel patterns across files

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use undat64::dat64::utils::{
    analyze_files, decode_file, dump_bytes, parse_header, show_table_info, SCAN_PATTERNS,
};
use undat64::utils::{collect_table_files, create_glob_matcher};
use undat64::{scan_sentinel_frequency, DecodeOptions, FieldLayout, InferConfig, TableHeader};

#[derive(Parser)]
#[command(name = "undat64")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and decode .datc64 table files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show table geometry for a file
    Info {
        /// Path to the .datc64 file
        file: PathBuf,
    },
    /// Decode a file with an explicit field layout
    Decode {
        /// Path to the .datc64 file
        file: PathBuf,
        /// Layout spec, e.g. "acts:list[u64],name:string,flag:u8"
        #[arg(short, long)]
        layout: String,
        /// Pad the layout with filler columns up to the file's record length
        #[arg(short, long)]
        pad: bool,
        /// Stop at the first cell error instead of collecting diagnostics
        #[arg(long)]
        fail_fast: bool,
        /// Print at most N rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Analyze files with unknown layouts and report a best-guess column map
    Infer {
        /// Paths to .datc64 files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Additional 64-bit sentinel pattern (hex), repeatable
        #[arg(short, long, value_parser = parse_hex_u64)]
        sentinel: Vec<u64>,
    },
    /// Hexdump part of a file
    Dump {
        /// Path to the .datc64 file
        file: PathBuf,
        /// Starting byte offset
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
        /// Number of bytes to dump
        #[arg(short = 'n', long, default_value_t = 256)]
        length: usize,
        /// Bytes per line
        #[arg(short, long, default_value_t = 16)]
        width: usize,
    },
    /// Count sentinel patterns across table files in a directory
    Scan {
        /// Directory containing .datc64 files
        dir: PathBuf,
        /// Filename filter (glob, e.g. "act*")
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn parse_hex_u64(s: &str) -> std::result::Result<u64, String> {
    let trimmed = s.trim_start_matches("0x");
    u64::from_str_radix(trimmed, 16).map_err(|e| format!("invalid hex value '{}': {}", s, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file } => {
            let size = fs::metadata(&file)
                .with_context(|| format!("Failed to stat {}", file.display()))?
                .len();
            let header = parse_header(&file)?;
            show_table_info(&file, size as usize, &header);
            Ok(())
        }
        Commands::Decode {
            file,
            layout,
            pad,
            fail_fast,
            limit,
        } => cmd_decode(&file, &layout, pad, fail_fast, limit),
        Commands::Infer { files, sentinel } => {
            let mut config = InferConfig::default();
            config.sentinels.extend(sentinel);
            analyze_files(&files, &config)
        }
        Commands::Dump {
            file,
            offset,
            length,
            width,
        } => {
            println!("{}", dump_bytes(&file, offset, length, width)?);
            Ok(())
        }
        Commands::Scan { dir, filter } => cmd_scan(&dir, filter.as_deref()),
    }
}

fn cmd_decode(
    file: &Path,
    layout_spec: &str,
    pad: bool,
    fail_fast: bool,
    limit: Option<usize>,
) -> Result<()> {
    let mut layout: FieldLayout = layout_spec.parse()?;
    if pad {
        let header = parse_header(file)?;
        layout = layout.padded_to(header.record_length);
    }

    let options = DecodeOptions { fail_fast };
    let output = decode_file(file, &layout, &options)?;

    let shown = limit.unwrap_or(output.rows.len()).min(output.rows.len());
    for (i, row) in output.rows.iter().take(shown).enumerate() {
        println!("row {}:", i);
        for (name, value) in row.iter() {
            println!("  {} = {}", name, value);
        }
    }
    if shown < output.rows.len() {
        println!("... and {} more rows", output.rows.len() - shown);
    }

    if !output.diagnostics.is_empty() {
        eprintln!("\n{} cell(s) failed to decode:", output.diagnostics.len());
        for diag in &output.diagnostics {
            eprintln!("  {}", diag);
        }
    }

    println!(
        "\nDecoded {} rows, {} cell errors",
        output.rows.len(),
        output.diagnostics.len()
    );
    Ok(())
}

fn cmd_scan(dir: &Path, filter: Option<&str>) -> Result<()> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let matcher = filter.map(create_glob_matcher).transpose()?;
    let files = collect_table_files(dir, matcher.as_ref())?;
    if files.is_empty() {
        println!("No table files found under {}", dir.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
    );

    let patterns: Vec<Vec<u8>> = SCAN_PATTERNS.iter().map(|p| p.to_vec()).collect();
    let mut totals: HashMap<String, usize> = HashMap::new();
    let mut scanned = 0usize;

    for path in &files {
        pb.inc(1);
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                pb.suspend(|| eprintln!("Warning: failed to read {}: {}", path.display(), err));
                continue;
            }
        };
        let header = match TableHeader::parse(&data) {
            Ok(header) => header,
            Err(err) => {
                pb.suspend(|| eprintln!("Warning: skipping {}: {}", path.display(), err));
                continue;
            }
        };

        for (pattern, count) in scan_sentinel_frequency(header.table(&data), &patterns) {
            *totals.entry(pattern).or_default() += count;
        }
        scanned += 1;
    }
    pb.finish_and_clear();

    println!(
        "Scanned {} of {} files under {}",
        scanned,
        files.len(),
        dir.display()
    );
    let mut rows: Vec<(&String, &usize)> = totals.iter().collect();
    rows.sort();
    println!("\nSentinel pattern frequency (table regions):");
    for (pattern, count) in rows {
        println!("  {}: {} occurrences", pattern, count);
    }
    Ok(())
}
