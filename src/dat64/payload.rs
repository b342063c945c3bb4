//! Low-level reads from the payload region
//!
//! Pointer fields in the table region reference this byte heap by offset.
//! Everything here bounds-checks against the payload before touching it; a
//! bad offset is a recoverable [`CellError`], never an out-of-bounds read.

use crate::error::CellError;

/// String terminator: two zero UTF-16 code units.
const STRING_TERMINATOR: [u8; 4] = [0, 0, 0, 0];

/// Read a zero-terminated UTF-16LE string starting at `offset`.
///
/// Scans forward in code-unit steps until the 4-byte terminator, decodes the
/// preceding bytes, and returns the text with the number of bytes consumed
/// (terminator excluded). A terminator at `offset` itself is a valid empty
/// string.
pub fn read_string(payload: &[u8], offset: u64) -> Result<(String, usize), CellError> {
    let payload_length = payload.len() as u64;
    if offset > payload_length {
        return Err(CellError::OffsetOutOfRange {
            offset,
            needed: STRING_TERMINATOR.len() as u64,
            payload_length,
        });
    }

    let start = offset as usize;
    let mut end = start;
    loop {
        if end + STRING_TERMINATOR.len() > payload.len() {
            return Err(CellError::UnterminatedString { offset });
        }
        if payload[end..end + STRING_TERMINATOR.len()] == STRING_TERMINATOR {
            break;
        }
        end += 2;
    }

    let units: Vec<u16> = payload[start..end]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok((String::from_utf16_lossy(&units), end - start))
}

/// Slice `count` contiguous elements of `element_width` bytes at `offset`.
///
/// A zero count short-circuits to an empty list without looking at `offset`
/// at all; list fields routinely carry garbage offsets next to a zero count.
pub fn read_list(
    payload: &[u8],
    offset: u64,
    count: u64,
    element_width: usize,
) -> Result<Vec<&[u8]>, CellError> {
    if count == 0 || element_width == 0 {
        return Ok(Vec::new());
    }

    let payload_length = payload.len() as u64;
    let needed = count.saturating_mul(element_width as u64);
    if offset > payload_length || count > (payload_length - offset) / element_width as u64 {
        return Err(CellError::OffsetOutOfRange {
            offset,
            needed,
            payload_length,
        });
    }

    let start = offset as usize;
    Ok((0..count as usize)
        .map(|i| &payload[start + i * element_width..start + (i + 1) * element_width])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    // UTF-16LE "Act1" followed by the terminator
    const ACT1: &[u8] = &[
        0x41, 0x00, 0x63, 0x00, 0x74, 0x00, 0x31, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_read_string() {
        let (text, consumed) = read_string(ACT1, 0).unwrap();
        assert_eq!(text, "Act1");
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_read_string_idempotent() {
        assert_eq!(read_string(ACT1, 0).unwrap(), read_string(ACT1, 0).unwrap());
    }

    #[test]
    fn test_read_empty_string() {
        let payload = [0u8; 4];
        let (text, consumed) = read_string(&payload, 0).unwrap();
        assert_eq!(text, "");
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_read_string_out_of_range() {
        let payload = [0u8; 8];
        match read_string(&payload, 9) {
            Err(CellError::OffsetOutOfRange { offset, payload_length, .. }) => {
                assert_eq!(offset, 9);
                assert_eq!(payload_length, 8);
            }
            other => panic!("expected OffsetOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_read_string_unterminated() {
        let payload = [0x41, 0x00, 0x63, 0x00];
        assert_eq!(
            read_string(&payload, 0),
            Err(CellError::UnterminatedString { offset: 0 })
        );
        // Not even room for a terminator at the end of the payload
        assert_eq!(
            read_string(&payload, 4),
            Err(CellError::UnterminatedString { offset: 4 })
        );
    }

    #[test]
    fn test_read_list() {
        let mut payload = vec![0u8; 20];
        payload.extend((0u64..3).flat_map(|v| v.to_le_bytes()));
        let slices = read_list(&payload, 20, 3, 8).unwrap();
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[2], 2u64.to_le_bytes());
    }

    #[test]
    fn test_read_list_zero_count_ignores_offset() {
        let payload = [0u8; 4];
        assert!(read_list(&payload, u64::MAX, 0, 8).unwrap().is_empty());
    }

    #[test]
    fn test_read_list_bounds() {
        let payload = [0u8; 24];
        assert!(read_list(&payload, 0, 3, 8).is_ok());
        assert!(read_list(&payload, 1, 3, 8).is_err());
        assert!(read_list(&payload, 25, 1, 8).is_err());
        // count * width overflowing u64 must not wrap into "in range"
        assert!(read_list(&payload, 0, u64::MAX, 8).is_err());
    }
}
