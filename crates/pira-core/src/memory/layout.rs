//! Fixed-offset record layouts.
//!
//! A layout is an ordered list of field descriptors mirroring the device's
//! memory map: packed, little-endian, no alignment. Reserved fillers occupy
//! bytes but produce no field.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use thiserror::Error;

use crate::error::PiraError;
use crate::protocol::MemoryWindow;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{layout}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{layout}: no field named '{field}'")]
    MissingField {
        layout: &'static str,
        field: &'static str,
    },
    #[error("{layout}.{field}: expected {expected}")]
    TypeMismatch {
        layout: &'static str,
        field: &'static str,
        expected: &'static str,
    },
    #[error("{layout}.{field}: expected {expected} elements, got {actual}")]
    LengthMismatch {
        layout: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire type of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    I16,
    /// Fixed-size byte array (strings, counters, code lists).
    Bytes(usize),
    /// Fixed-size array of little-endian u16.
    Words(usize),
    /// Opaque filler.
    Reserved(usize),
}

impl FieldKind {
    /// Width in bytes.
    pub const fn width(self) -> usize {
        match self {
            FieldKind::U8 => 1,
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::Bytes(n) | FieldKind::Reserved(n) => n,
            FieldKind::Words(n) => n * 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    pub const fn reserved(width: usize) -> Self {
        Self::new("reserved", FieldKind::Reserved(width))
    }
}

/// Ordered field descriptors for one record.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Layout {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    /// Total record size in bytes, fillers included.
    pub const fn size(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].kind.width();
            i += 1;
        }
        total
    }

    /// Byte offset of a named field from the start of the record.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for spec in self.fields {
            if spec.name == name && !matches!(spec.kind, FieldKind::Reserved(_)) {
                return Some(offset);
            }
            offset += spec.kind.width();
        }
        None
    }

    /// Memory window covering this layout at `address`.
    pub fn window(&self, address: u16) -> Result<MemoryWindow, PiraError> {
        MemoryWindow::with_len(address, self.size())
    }

    /// Decode a raw dump. Either every field decodes or nothing is returned.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedRecord, DecodeError> {
        let expected = self.size();
        if data.len() != expected {
            return Err(DecodeError::SizeMismatch {
                layout: self.name,
                expected,
                actual: data.len(),
            });
        }

        let mut cursor = Cursor::new(data);
        let mut fields = Vec::with_capacity(self.fields.len());

        for spec in self.fields {
            let value = match spec.kind {
                FieldKind::U8 => FieldValue::U8(cursor.read_u8()?),
                FieldKind::U16 => FieldValue::U16(cursor.read_u16::<LittleEndian>()?),
                FieldKind::I16 => FieldValue::I16(cursor.read_i16::<LittleEndian>()?),
                FieldKind::Bytes(n) => {
                    let mut buf = vec![0u8; n];
                    cursor.read_exact(&mut buf)?;
                    FieldValue::Bytes(buf)
                }
                FieldKind::Words(n) => {
                    let mut words = vec![0u16; n];
                    cursor.read_u16_into::<LittleEndian>(&mut words)?;
                    FieldValue::Words(words)
                }
                FieldKind::Reserved(n) => {
                    cursor.set_position(cursor.position() + n as u64);
                    continue;
                }
            };
            fields.push((spec.name, value));
        }

        Ok(DecodedRecord {
            layout: self.name,
            fields,
        })
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    U8(u8),
    U16(u16),
    I16(i16),
    Bytes(Vec<u8>),
    Words(Vec<u16>),
}

/// Named field values in layout order, fillers omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    layout: &'static str,
    fields: Vec<(&'static str, FieldValue)>,
}

impl DecodedRecord {
    pub fn layout(&self) -> &'static str {
        self.layout
    }

    pub fn fields(&self) -> &[(&'static str, FieldValue)] {
        &self.fields
    }

    pub fn get(&self, field: &'static str) -> Result<&FieldValue, DecodeError> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
            .ok_or(DecodeError::MissingField {
                layout: self.layout,
                field,
            })
    }

    fn mismatch(&self, field: &'static str, expected: &'static str) -> DecodeError {
        DecodeError::TypeMismatch {
            layout: self.layout,
            field,
            expected,
        }
    }

    pub fn u8(&self, field: &'static str) -> Result<u8, DecodeError> {
        match self.get(field)? {
            FieldValue::U8(v) => Ok(*v),
            _ => Err(self.mismatch(field, "u8")),
        }
    }

    pub fn u16(&self, field: &'static str) -> Result<u16, DecodeError> {
        match self.get(field)? {
            FieldValue::U16(v) => Ok(*v),
            _ => Err(self.mismatch(field, "u16")),
        }
    }

    pub fn i16(&self, field: &'static str) -> Result<i16, DecodeError> {
        match self.get(field)? {
            FieldValue::I16(v) => Ok(*v),
            _ => Err(self.mismatch(field, "i16")),
        }
    }

    pub fn bytes(&self, field: &'static str) -> Result<&[u8], DecodeError> {
        match self.get(field)? {
            FieldValue::Bytes(v) => Ok(v),
            _ => Err(self.mismatch(field, "byte array")),
        }
    }

    pub fn words(&self, field: &'static str) -> Result<&[u16], DecodeError> {
        match self.get(field)? {
            FieldValue::Words(v) => Ok(v),
            _ => Err(self.mismatch(field, "word array")),
        }
    }

    /// Byte array field as a fixed-size array.
    pub fn byte_array<const N: usize>(&self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let bytes = self.bytes(field)?;
        bytes.try_into().map_err(|_| DecodeError::LengthMismatch {
            layout: self.layout,
            field,
            expected: N,
            actual: bytes.len(),
        })
    }

    /// Word array field as a fixed-size array.
    pub fn word_array<const N: usize>(&self, field: &'static str) -> Result<[u16; N], DecodeError> {
        let words = self.words(field)?;
        words.try_into().map_err(|_| DecodeError::LengthMismatch {
            layout: self.layout,
            field,
            expected: N,
            actual: words.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: Layout = Layout::new(
        "sample",
        &[
            FieldSpec::new("level", FieldKind::U16),
            FieldSpec::reserved(2),
            FieldSpec::new("offset", FieldKind::I16),
            FieldSpec::new("flags", FieldKind::U8),
            FieldSpec::new("name", FieldKind::Bytes(3)),
            FieldSpec::new("bins", FieldKind::Words(2)),
        ],
    );

    #[test]
    fn test_size_and_offsets() {
        assert_eq!(SAMPLE.size(), 2 + 2 + 2 + 1 + 3 + 4);
        assert_eq!(SAMPLE.offset_of("level"), Some(0));
        assert_eq!(SAMPLE.offset_of("offset"), Some(4));
        assert_eq!(SAMPLE.offset_of("name"), Some(7));
        assert_eq!(SAMPLE.offset_of("bins"), Some(10));
        assert_eq!(SAMPLE.offset_of("reserved"), None);
        assert_eq!(SAMPLE.offset_of("missing"), None);
    }

    #[test]
    fn test_decode_little_endian_packed() {
        let data = [
            0x52, 0x08, // level = 0x0852
            0xAA, 0xBB, // reserved
            0xFE, 0xFF, // offset = -2
            0x81, // flags
            b'R', b'D', b'S', // name
            0x01, 0x00, 0x00, 0x01, // bins = [1, 256]
        ];
        let record = SAMPLE.decode(&data).unwrap();

        assert_eq!(record.layout(), "sample");
        assert_eq!(record.fields().len(), 5);
        assert_eq!(record.u16("level").unwrap(), 2130);
        assert_eq!(record.i16("offset").unwrap(), -2);
        assert_eq!(record.u8("flags").unwrap(), 0x81);
        assert_eq!(record.byte_array::<3>("name").unwrap(), *b"RDS");
        assert_eq!(record.word_array::<2>("bins").unwrap(), [1, 256]);
    }

    #[test]
    fn test_decode_size_mismatch_is_atomic() {
        let err = SAMPLE.decode(&[0u8; 13]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::SizeMismatch { expected: 14, actual: 13, .. }
        ));
        assert!(SAMPLE.decode(&[0u8; 15]).is_err());
    }

    #[test]
    fn test_accessor_errors() {
        let record = SAMPLE.decode(&[0u8; 14]).unwrap();
        assert!(matches!(
            record.u8("level"),
            Err(DecodeError::TypeMismatch { field: "level", .. })
        ));
        assert!(matches!(
            record.u16("nope"),
            Err(DecodeError::MissingField { field: "nope", .. })
        ));
        assert!(matches!(
            record.byte_array::<4>("name"),
            Err(DecodeError::LengthMismatch { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn test_window() {
        let window = SAMPLE.window(0x1A).unwrap();
        assert_eq!(window.address(), 0x1A);
        assert_eq!(window.len(), 14);
        assert!(SAMPLE.window(0x1000).is_err());
    }
}
