//! Byte-level diagnostics: hexdump rendering and sentinel frequency scans
//!
//! Pure helpers for the human side of reverse engineering. Nothing here
//! interprets the format; it only makes bytes readable.

use std::collections::HashMap;
use std::fmt::Write as _;

/// Render `length` bytes starting at `offset` as a classic hexdump: offset
/// column, hex bytes, printable-ASCII gutter. `width` is bytes per line.
pub fn hexdump(data: &[u8], offset: usize, length: usize, width: usize) -> String {
    let width = width.max(1);
    let end = offset.saturating_add(length).min(data.len());
    let mut lines = Vec::new();

    let mut row_start = offset;
    while row_start < end {
        let mut line = String::new();
        let _ = write!(line, "{:08x}  ", row_start);

        let mut ascii = String::new();
        for i in 0..width {
            match data.get(row_start + i).filter(|_| row_start + i < end) {
                Some(&byte) => {
                    let _ = write!(line, "{:02x} ", byte);
                    ascii.push(if (32..127).contains(&byte) {
                        byte as char
                    } else {
                        '.'
                    });
                }
                None => line.push_str("   "),
            }
        }

        let _ = write!(line, " |{}|", ascii);
        lines.push(line);
        row_start += width;
    }

    lines.join("\n")
}

/// Count non-overlapping occurrences of each pattern in `data`, keyed by the
/// pattern's hex rendering. Patterns that never occur map to zero.
pub fn scan_sentinel_frequency(data: &[u8], patterns: &[Vec<u8>]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for pattern in patterns {
        if pattern.is_empty() {
            continue;
        }
        let mut count = 0;
        let mut i = 0;
        while i + pattern.len() <= data.len() {
            if &data[i..i + pattern.len()] == pattern.as_slice() {
                count += 1;
                i += pattern.len();
            } else {
                i += 1;
            }
        }
        counts.insert(hex_key(pattern), count);
    }
    counts
}

fn hex_key(pattern: &[u8]) -> String {
    let mut key = String::with_capacity(pattern.len() * 2);
    for byte in pattern {
        let _ = write!(key, "{:02x}", byte);
    }
    key
}
