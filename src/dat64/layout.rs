//! Field types and record layouts
//!
//! A layout is the caller's hypothesis about one record's fields. The file
//! itself never declares it, so layouts are validated against the record
//! length derived from the file geometry before any decoding happens.

use std::fmt;
use std::str::FromStr;

use crate::dat64::header::TableHeader;
use crate::error::{Error, Result};

/// Field type with a fixed in-record width.
///
/// Scalars are stored inline, little-endian. `String` and `List` are stored
/// as offsets into the payload region, not as inline data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    /// 8-byte payload offset; UTF-16LE text with a 4-byte zero terminator
    String,
    /// 16-byte `(count, offset)` pair referencing `count` contiguous
    /// elements of the given type in the payload region
    List(Box<FieldType>),
}

impl FieldType {
    /// In-record width in bytes
    pub fn width(&self) -> usize {
        match self {
            FieldType::U8 | FieldType::I8 => 1,
            FieldType::U16 | FieldType::I16 => 2,
            FieldType::U32 | FieldType::I32 => 4,
            FieldType::U64 | FieldType::I64 => 8,
            FieldType::String => 8,
            FieldType::List(_) => 16,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::U8 => write!(f, "u8"),
            FieldType::I8 => write!(f, "i8"),
            FieldType::U16 => write!(f, "u16"),
            FieldType::I16 => write!(f, "i16"),
            FieldType::U32 => write!(f, "u32"),
            FieldType::I32 => write!(f, "i32"),
            FieldType::U64 => write!(f, "u64"),
            FieldType::I64 => write!(f, "i64"),
            FieldType::String => write!(f, "string"),
            FieldType::List(element) => write!(f, "list[{}]", element),
        }
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix("list[").and_then(|r| r.strip_suffix(']')) {
            return Ok(FieldType::List(Box::new(inner.parse()?)));
        }
        match s {
            "u8" => Ok(FieldType::U8),
            "i8" => Ok(FieldType::I8),
            "u16" => Ok(FieldType::U16),
            "i16" => Ok(FieldType::I16),
            "u32" => Ok(FieldType::U32),
            "i32" => Ok(FieldType::I32),
            "u64" => Ok(FieldType::U64),
            "i64" => Ok(FieldType::I64),
            "string" => Ok(FieldType::String),
            _ => Err(Error::InvalidLayout(format!("unknown field type '{}'", s))),
        }
    }
}

/// One named field in a record layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        FieldSpec {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered description of one record's fields.
///
/// Fields are positional in the byte stream; declaration order is decoding
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldLayout {
    fields: Vec<FieldSpec>,
}

impl FieldLayout {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        FieldLayout { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total record width in bytes
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.ty.width()).sum()
    }

    /// Check this layout against the record length derived from a file.
    ///
    /// A mismatching layout is rejected outright, never truncated or padded.
    /// An empty table has nothing to misinterpret, so any layout passes.
    pub fn validate(&self, header: &TableHeader) -> Result<()> {
        if header.row_count == 0 {
            return Ok(());
        }
        let actual = self.width();
        if actual != header.record_length {
            return Err(Error::LengthMismatch {
                expected: header.record_length,
                actual,
            });
        }
        Ok(())
    }

    /// Pad this layout with unnamed filler columns up to `record_length`.
    ///
    /// Useful when probing a file: declare the fields under test, then fill
    /// the rest of the record with u64/u32/u16/u8 columns so the layout
    /// validates. No-op when the layout is already wide enough.
    pub fn padded_to(mut self, record_length: usize) -> Self {
        let mut remaining = record_length.saturating_sub(self.width());
        let mut index = 0;
        while remaining >= 8 {
            self.fields
                .push(FieldSpec::new(format!("unknown{}", index), FieldType::U64));
            index += 1;
            remaining -= 8;
        }
        for (width, ty) in [(4, FieldType::U32), (2, FieldType::U16), (1, FieldType::U8)] {
            if remaining >= width {
                self.fields
                    .push(FieldSpec::new(format!("unknown{}", index), ty));
                index += 1;
                remaining -= width;
            }
        }
        self
    }
}

impl FromStr for FieldLayout {
    type Err = Error;

    /// Parse a compact layout spec: comma-separated `name:type` entries,
    /// e.g. `acts:list[u64],name:string,flag:u8`.
    fn from_str(s: &str) -> Result<Self> {
        let mut fields = Vec::new();
        for entry in s.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (name, ty) = entry
                .split_once(':')
                .ok_or_else(|| Error::InvalidLayout(format!("expected name:type, got '{}'", entry)))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidLayout(format!("missing field name in '{}'", entry)));
            }
            fields.push(FieldSpec::new(name, ty.parse()?));
        }
        if fields.is_empty() {
            return Err(Error::InvalidLayout("empty layout spec".into()));
        }
        Ok(FieldLayout::new(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dat64::header::DAT_MAGIC;

    fn header_for(row_count: u32, record_length: usize) -> TableHeader {
        let mut data = row_count.to_le_bytes().to_vec();
        data.extend_from_slice(&vec![0u8; row_count as usize * record_length]);
        data.extend_from_slice(&DAT_MAGIC);
        TableHeader::parse(&data).unwrap()
    }

    #[test]
    fn test_field_widths() {
        assert_eq!(FieldType::U8.width(), 1);
        assert_eq!(FieldType::I16.width(), 2);
        assert_eq!(FieldType::U32.width(), 4);
        assert_eq!(FieldType::I64.width(), 8);
        assert_eq!(FieldType::String.width(), 8);
        assert_eq!(FieldType::List(Box::new(FieldType::U64)).width(), 16);
    }

    #[test]
    fn test_layout_width() {
        let layout = FieldLayout::new(vec![
            FieldSpec::new("acts", FieldType::List(Box::new(FieldType::U64))),
            FieldSpec::new("name", FieldType::String),
            FieldSpec::new("flag", FieldType::U8),
        ]);
        assert_eq!(layout.width(), 25);
    }

    #[test]
    fn test_validate() {
        let layout = FieldLayout::new(vec![
            FieldSpec::new("id", FieldType::U64),
            FieldSpec::new("kind", FieldType::U16),
        ]);
        assert!(layout.validate(&header_for(3, 10)).is_ok());

        match layout.validate(&header_for(3, 12)) {
            Err(Error::LengthMismatch { expected, actual }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 10);
            }
            other => panic!("expected LengthMismatch, got {:?}", other),
        }

        // Empty tables accept any layout; there are no records to decode.
        assert!(layout.validate(&header_for(0, 0)).is_ok());
    }

    #[test]
    fn test_parse_layout_spec() {
        let layout: FieldLayout = "acts:list[u64], name:string,flag:u8".parse().unwrap();
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.fields()[0].name, "acts");
        assert_eq!(
            layout.fields()[0].ty,
            FieldType::List(Box::new(FieldType::U64))
        );
        assert_eq!(layout.fields()[1].ty, FieldType::String);
        assert_eq!(layout.width(), 25);

        assert!("".parse::<FieldLayout>().is_err());
        assert!("noname".parse::<FieldLayout>().is_err());
        assert!("x:list[".parse::<FieldLayout>().is_err());
        assert!("x:float".parse::<FieldLayout>().is_err());
    }

    #[test]
    fn test_nested_list_spec() {
        let ty: FieldType = "list[list[u32]]".parse().unwrap();
        assert_eq!(
            ty,
            FieldType::List(Box::new(FieldType::List(Box::new(FieldType::U32))))
        );
        assert_eq!(ty.to_string(), "list[list[u32]]");
    }

    #[test]
    fn test_padded_to() {
        // The acts file probe: one list field padded out to a 149-byte record
        let layout: FieldLayout = "list_field:list[u64]".parse().unwrap();
        let padded = layout.padded_to(149);
        assert_eq!(padded.width(), 149);
        // 16 + 16*u64 + u32 + 1*u8 = 149
        assert_eq!(padded.fields().last().unwrap().ty, FieldType::U8);

        let already: FieldLayout = "id:u64".parse().unwrap();
        assert_eq!(already.clone().padded_to(4).width(), 8);
    }
}
