//! Record decoding against a known field layout
//!
//! Decoding walks the table region record by record, interpreting each field
//! positionally in declaration order. Pointer fields resolve through the
//! payload region; a bad pointer spoils one cell, not the file, and every
//! cell failure is recorded against its row and field.

use std::fmt;

use crate::dat64::header::{TableHeader, HEADER_SIZE};
use crate::dat64::layout::{FieldLayout, FieldType};
use crate::dat64::payload;
use crate::error::{CellError, Error, Result};

/// One decoded cell. Owned; never borrows the input buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    String(String),
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// One decoded record: field name to value, in declaration order.
///
/// A field whose cell failed to decode is absent here; its
/// [`CellDiagnostic`] in the decode output is the record of what went wrong.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRow {
    values: Vec<(String, Value)>,
}

impl DecodedRow {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push(&mut self, name: &str, value: Value) {
        self.values.push((name.to_string(), value));
    }
}

/// Address and cause of a cell that failed to decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDiagnostic {
    pub row: usize,
    pub field: String,
    pub error: CellError,
}

impl fmt::Display for CellDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, field '{}': {}", self.row, self.field, self.error)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Abort on the first cell error instead of collecting and continuing
    pub fail_fast: bool,
}

/// Rows plus the per-cell failures encountered while producing them.
///
/// With the default options the row vector always holds `row_count` entries;
/// `diagnostics` tells how wrong the layout hypothesis was.
#[derive(Debug, Default)]
pub struct DecodeOutput {
    pub rows: Vec<DecodedRow>,
    pub diagnostics: Vec<CellDiagnostic>,
}

/// Decode every record of a table file buffer with the given layout.
///
/// The layout is validated against the file geometry before any byte is
/// interpreted; a width mismatch fails with [`Error::LengthMismatch`].
pub fn decode(
    data: &[u8],
    header: &TableHeader,
    layout: &FieldLayout,
    options: &DecodeOptions,
) -> Result<DecodeOutput> {
    layout.validate(header)?;

    let payload = header.payload(data);
    let mut output = DecodeOutput {
        rows: Vec::with_capacity(header.row_count as usize),
        diagnostics: Vec::new(),
    };

    for row in 0..header.row_count as usize {
        let start = HEADER_SIZE + row * header.record_length;
        let record = &data[start..start + header.record_length];

        let mut decoded = DecodedRow::default();
        let mut pos = 0;
        for spec in layout.fields() {
            let width = spec.ty.width();
            let raw = &record[pos..pos + width];
            pos += width;

            match decode_field(raw, &spec.ty, payload) {
                Ok(value) => decoded.push(&spec.name, value),
                Err(error) => {
                    if options.fail_fast {
                        return Err(Error::Cell {
                            row,
                            field: spec.name.clone(),
                            source: error,
                        });
                    }
                    output.diagnostics.push(CellDiagnostic {
                        row,
                        field: spec.name.clone(),
                        error,
                    });
                }
            }
        }
        output.rows.push(decoded);
    }

    Ok(output)
}

/// Decode one field from its in-record bytes.
///
/// `raw` is exactly `ty.width()` bytes; list elements recurse here with the
/// element slices handed back by the payload resolver.
fn decode_field(raw: &[u8], ty: &FieldType, payload: &[u8]) -> std::result::Result<Value, CellError> {
    match ty {
        FieldType::U8 => Ok(Value::U8(raw[0])),
        FieldType::I8 => Ok(Value::I8(raw[0] as i8)),
        FieldType::U16 => Ok(Value::U16(u16::from_le_bytes([raw[0], raw[1]]))),
        FieldType::I16 => Ok(Value::I16(i16::from_le_bytes([raw[0], raw[1]]))),
        FieldType::U32 => Ok(Value::U32(u32::from_le_bytes([
            raw[0], raw[1], raw[2], raw[3],
        ]))),
        FieldType::I32 => Ok(Value::I32(i32::from_le_bytes([
            raw[0], raw[1], raw[2], raw[3],
        ]))),
        FieldType::U64 => Ok(Value::U64(read_u64(raw))),
        FieldType::I64 => Ok(Value::I64(read_u64(raw) as i64)),
        FieldType::String => {
            let offset = read_u64(raw);
            let (text, _) = payload::read_string(payload, offset)?;
            Ok(Value::String(text))
        }
        FieldType::List(element) => {
            let count = read_u64(&raw[..8]);
            let offset = read_u64(&raw[8..16]);
            let slices = payload::read_list(payload, offset, count, element.width())?;
            let mut items = Vec::with_capacity(slices.len());
            for slice in slices {
                items.push(decode_field(slice, element, payload)?);
            }
            Ok(Value::List(items))
        }
    }
}

fn read_u64(raw: &[u8]) -> u64 {
    u64::from_le_bytes([
        raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7],
    ])
}
