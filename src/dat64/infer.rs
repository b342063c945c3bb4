//! Heuristic column-type inference for unknown layouts
//!
//! When no field layout is known, the only evidence is the bytes themselves.
//! Walking a record in 8-byte strides and probing the payload region at every
//! candidate value distinguishes pointers from scalars from null markers well
//! enough to seed a layout hypothesis. The output is advisory: it shortens
//! operator iteration, it does not replace an explicit layout.

use std::fmt::Write as _;

use crate::dat64::header::{TableHeader, HEADER_SIZE};
use crate::dat64::payload;

/// Inference configuration.
///
/// Sentinel patterns are discovered empirically per game-data revision, so
/// they are supplied by the caller rather than baked in. The defaults are the
/// patterns observed in current data files.
#[derive(Debug, Clone)]
pub struct InferConfig {
    /// 64-bit patterns that mean "no value" in this format revision
    pub sentinels: Vec<u64>,
    /// Maximum bytes of list payload rendered in previews
    pub list_preview_bytes: usize,
    /// Maximum characters of string previews
    pub string_preview_chars: usize,
    /// Longest terminator distance accepted when probing for a string
    pub max_string_probe: usize,
}

impl Default for InferConfig {
    fn default() -> Self {
        InferConfig {
            sentinels: vec![0, 0xFEFE_FEFE_FEFE_FEFE, 0xA6, 0xA600_0000_0000_0000],
            list_preview_bytes: 64,
            string_preview_chars: 50,
            max_string_probe: 1000,
        }
    }
}

/// Best-guess classification of one candidate field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// `(count, offset)` pair with both halves in payload range
    ListPointer { count: u64, offset: u64 },
    /// In-range offset that decodes to printable UTF-16 text
    StringPointer,
    /// In-range offset whose content does not decode as text
    OpaquePointer,
    /// Matches one of the configured null markers
    SentinelNull,
    /// Plain value; both 32-bit halves exposed for inspection
    Scalar { lo: u32, hi: u32 },
}

/// One observation over the probed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Byte offset of the candidate field within the record
    pub byte_offset: usize,
    /// The raw 64-bit little-endian value at that offset
    pub raw: u64,
    pub classification: Classification,
    /// Decoded string preview or list payload hex, when available
    pub preview: Option<String>,
    /// Set when the evidence did not support a confident guess
    pub low_confidence: bool,
}

/// Advisory layout evidence for one file, gathered from its first record
#[derive(Debug, Clone, Default)]
pub struct InferenceReport {
    pub record_length: usize,
    pub observations: Vec<Observation>,
}

/// Probe the first record of a table file and classify its candidate fields.
///
/// Never fails: bytes that fit no pattern are reported as low-confidence
/// scalars. An empty table yields an empty report.
pub fn infer(data: &[u8], header: &TableHeader, config: &InferConfig) -> InferenceReport {
    let record_length = header.record_length;
    let mut report = InferenceReport {
        record_length,
        observations: Vec::new(),
    };
    if record_length == 0 {
        return report;
    }

    let record = &data[HEADER_SIZE..HEADER_SIZE + record_length];
    let payload = header.payload(data);
    let payload_length = payload.len() as u64;

    let mut offset = 0;
    while offset < record_length {
        if offset + 8 > record_length {
            // Trailing bytes narrower than a candidate field: report what is
            // there, flagged, and stop.
            let mut bytes = [0u8; 8];
            bytes[..record_length - offset].copy_from_slice(&record[offset..]);
            let raw = u64::from_le_bytes(bytes);
            report.observations.push(Observation {
                byte_offset: offset,
                raw,
                classification: Classification::Scalar {
                    lo: raw as u32,
                    hi: (raw >> 32) as u32,
                },
                preview: None,
                low_confidence: true,
            });
            break;
        }

        let raw = read_u64(&record[offset..offset + 8]);
        let is_pointer = raw > 0 && raw < payload_length;

        // A pointer followed by another in-range value reads as a
        // (count, offset) list descriptor; consume the pair.
        if is_pointer && offset + 16 <= record_length {
            let next = read_u64(&record[offset + 8..offset + 16]);
            if next > 0 && next < payload_length {
                report.observations.push(Observation {
                    byte_offset: offset,
                    raw,
                    classification: Classification::ListPointer {
                        count: raw,
                        offset: next,
                    },
                    preview: list_preview(payload, raw, next, config),
                    low_confidence: false,
                });
                offset += 16;
                continue;
            }
        }

        let (classification, preview) = if is_pointer {
            match probe_string(payload, raw, config) {
                Some(text) => (Classification::StringPointer, Some(text)),
                None => (Classification::OpaquePointer, None),
            }
        } else if config.sentinels.contains(&raw) {
            (Classification::SentinelNull, None)
        } else {
            (
                Classification::Scalar {
                    lo: raw as u32,
                    hi: (raw >> 32) as u32,
                },
                None,
            )
        };

        report.observations.push(Observation {
            byte_offset: offset,
            raw,
            classification,
            preview,
            low_confidence: false,
        });
        offset += 8;
    }

    report
}

/// Try to read printable UTF-16 text at `offset`; `None` means the bytes do
/// not look like a string.
fn probe_string(payload: &[u8], offset: u64, config: &InferConfig) -> Option<String> {
    let (text, consumed) = payload::read_string(payload, offset).ok()?;
    if consumed >= config.max_string_probe {
        return None;
    }
    let printable = text.chars().all(|c| !c.is_control())
        || text.contains([' ', '\n', '\r', '\t']);
    if !printable {
        return None;
    }
    Some(text.chars().take(config.string_preview_chars).collect())
}

/// Hex preview of the first bytes a (count, offset) descriptor points at,
/// assuming 8-byte elements; `None` when the descriptor does not fit.
fn list_preview(payload: &[u8], count: u64, offset: u64, config: &InferConfig) -> Option<String> {
    let total = count.checked_mul(8)?;
    let end = offset.checked_add(total)?;
    if end > payload.len() as u64 {
        return None;
    }
    let take = (total as usize).min(config.list_preview_bytes);
    let start = offset as usize;
    Some(hex_string(&payload[start..start + take]))
}

/// Render a report for the operator. Inference itself never prints.
pub fn format_report(report: &InferenceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Column type inference (record length: {} bytes):",
        report.record_length
    );

    for (col, obs) in report.observations.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n  col {} @ offset {}: 0x{:016x} ({})",
            col, obs.byte_offset, obs.raw, obs.raw
        );
        match &obs.classification {
            Classification::ListPointer { count, offset } => {
                let _ = writeln!(out, "    likely: list pointer (count={}, offset={})", count, offset);
                if let Some(preview) = &obs.preview {
                    let _ = writeln!(out, "    payload: {}", preview);
                }
            }
            Classification::StringPointer => {
                let _ = writeln!(
                    out,
                    "    likely: string pointer -> {:?}",
                    obs.preview.as_deref().unwrap_or("")
                );
            }
            Classification::OpaquePointer => {
                let _ = writeln!(out, "    possibly: data pointer (offset={})", obs.raw);
            }
            Classification::SentinelNull => {
                let _ = writeln!(out, "    likely: null marker");
            }
            Classification::Scalar { lo, hi } => {
                let _ = writeln!(out, "    u32 halves: {}, {}", lo, hi);
                if obs.low_confidence {
                    let _ = writeln!(out, "    likely: scalar (partial field, low confidence)");
                } else {
                    let _ = writeln!(out, "    likely: scalar");
                }
            }
        }
    }

    out
}

fn read_u64(raw: &[u8]) -> u64 {
    u64::from_le_bytes([
        raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7],
    ])
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dat64::header::DAT_MAGIC;

    fn table_file(row_count: u32, table: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut data = row_count.to_le_bytes().to_vec();
        data.extend_from_slice(table);
        data.extend_from_slice(&DAT_MAGIC);
        data.extend_from_slice(payload);
        data
    }

    fn infer_with_defaults(data: &[u8]) -> InferenceReport {
        let header = TableHeader::parse(data).unwrap();
        infer(data, &header, &InferConfig::default())
    }

    #[test]
    fn test_list_pointer_pair() {
        // First 8 bytes hold 8, next 8 hold a valid payload offset: the acts
        // file signature. Both in range of the 80-byte payload.
        let mut table = Vec::new();
        table.extend_from_slice(&8u64.to_le_bytes());
        table.extend_from_slice(&20u64.to_le_bytes());
        let data = table_file(1, &table, &[0u8; 100]);

        let report = infer_with_defaults(&data);
        assert_eq!(report.observations.len(), 1);
        assert_eq!(
            report.observations[0].classification,
            Classification::ListPointer {
                count: 8,
                offset: 20
            }
        );
        assert!(report.observations[0].preview.is_some());
    }

    #[test]
    fn test_list_pair_consumes_sixteen_bytes() {
        // After the pair, the walk must resume at offset 16, not 8
        let mut table = Vec::new();
        table.extend_from_slice(&2u64.to_le_bytes());
        table.extend_from_slice(&4u64.to_le_bytes());
        table.extend_from_slice(&0u64.to_le_bytes());
        let data = table_file(1, &table, &[0u8; 50]);

        let report = infer_with_defaults(&data);
        assert_eq!(report.observations.len(), 2);
        assert_eq!(report.observations[1].byte_offset, 16);
        assert_eq!(
            report.observations[1].classification,
            Classification::SentinelNull
        );
    }

    #[test]
    fn test_string_pointer_with_preview() {
        // Offset 2 points at UTF-16 "Act1" within the payload
        let mut payload = vec![0xEE, 0xEE];
        payload.extend_from_slice(&[0x41, 0x00, 0x63, 0x00, 0x74, 0x00, 0x31, 0x00]);
        payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        let mut table = Vec::new();
        table.extend_from_slice(&2u64.to_le_bytes());
        // Large even scalar, far outside the payload range
        table.extend_from_slice(&0x0001_0000_0001_0000u64.to_le_bytes());
        let data = table_file(1, &table, &payload);

        let report = infer_with_defaults(&data);
        assert_eq!(
            report.observations[0].classification,
            Classification::StringPointer
        );
        assert_eq!(report.observations[0].preview.as_deref(), Some("Act1"));
        assert!(matches!(
            report.observations[1].classification,
            Classification::Scalar { .. }
        ));
    }

    #[test]
    fn test_opaque_pointer() {
        // In-range offset, but the bytes there are unprintable garbage
        let mut payload = vec![0x01, 0x00, 0x02, 0x00, 0x07, 0x00];
        payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        let mut table = Vec::new();
        table.extend_from_slice(&2u64.to_le_bytes());
        table.extend_from_slice(&0xFFFF_FFFF_0000_0000u64.to_le_bytes());
        let data = table_file(1, &table, &payload);

        let report = infer_with_defaults(&data);
        assert_eq!(
            report.observations[0].classification,
            Classification::OpaquePointer
        );
        assert!(report.observations[0].preview.is_none());
    }

    #[test]
    fn test_sentinel_null() {
        let mut table = Vec::new();
        table.extend_from_slice(&0xFEFE_FEFE_FEFE_FEFEu64.to_le_bytes());
        table.extend_from_slice(&0u64.to_le_bytes());
        let data = table_file(1, &table, &[0u8; 16]);

        let report = infer_with_defaults(&data);
        assert_eq!(
            report.observations[0].classification,
            Classification::SentinelNull
        );
        assert_eq!(
            report.observations[1].classification,
            Classification::SentinelNull
        );
    }

    #[test]
    fn test_custom_sentinels() {
        let mut table = Vec::new();
        table.extend_from_slice(&0xDEAD_BEEF_DEAD_BEEFu64.to_le_bytes());
        let data = table_file(1, &table, &[]);

        let mut config = InferConfig::default();
        config.sentinels.push(0xDEAD_BEEF_DEAD_BEEF);
        let header = TableHeader::parse(&data).unwrap();
        let report = infer(&data, &header, &config);
        assert_eq!(
            report.observations[0].classification,
            Classification::SentinelNull
        );

        // Without the extra pattern the same value reads as a scalar
        let report = infer_with_defaults(&data);
        assert!(matches!(
            report.observations[0].classification,
            Classification::Scalar { .. }
        ));
    }

    #[test]
    fn test_scalar_halves() {
        let mut table = Vec::new();
        table.extend_from_slice(&1u32.to_le_bytes());
        table.extend_from_slice(&20u32.to_le_bytes());
        let data = table_file(1, &table, &[]);

        let report = infer_with_defaults(&data);
        assert_eq!(
            report.observations[0].classification,
            Classification::Scalar { lo: 1, hi: 20 }
        );
    }

    #[test]
    fn test_trailing_partial_field_is_low_confidence() {
        // 11-byte record: one full candidate plus three trailing bytes
        let mut table = vec![0u8; 8];
        table.extend_from_slice(&[0x0A, 0x0B, 0x0C]);
        let data = table_file(1, &table, &[]);

        let report = infer_with_defaults(&data);
        assert_eq!(report.observations.len(), 2);
        let tail = &report.observations[1];
        assert_eq!(tail.byte_offset, 8);
        assert!(tail.low_confidence);
        assert_eq!(tail.raw, 0x000C0B0A);
    }

    #[test]
    fn test_empty_table_yields_empty_report() {
        let data = table_file(0, &[], &[1, 2, 3]);
        let report = infer_with_defaults(&data);
        assert!(report.observations.is_empty());
    }

    #[test]
    fn test_format_report_is_pure_rendering() {
        let mut table = Vec::new();
        table.extend_from_slice(&8u64.to_le_bytes());
        table.extend_from_slice(&20u64.to_le_bytes());
        let data = table_file(1, &table, &[0u8; 100]);

        let report = infer_with_defaults(&data);
        let text = format_report(&report);
        assert!(text.contains("record length: 16 bytes"));
        assert!(text.contains("list pointer (count=8, offset=20)"));
    }
}
