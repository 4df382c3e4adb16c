//! Field descriptors and decoded values.
//!
//! A [`FieldSpec`] is fixed at grammar-construction time and describes one
//! typed region of the wire: width, endianness, string form, or varint form,
//! plus whether the field declares the frame length. Decoding a field yields
//! a [`DecodedField`] recorded on the attempt's state in wire order.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Wire type of a field. Widths of 16 bits and up carry an explicit byte
/// order; 8-bit types and floats do not (float bit patterns are always read
/// little-endian and reinterpreted as IEEE-754).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    U8,
    I8,
    U16Le,
    U16Be,
    I16Le,
    I16Be,
    U32Le,
    U32Be,
    I32Le,
    I32Be,
    U64Le,
    U64Be,
    I64Le,
    I64Be,
    F32,
    F64,
    /// One-byte length prefix followed by that many payload bytes.
    PascalString,
    /// Bytes up to (excluding) a zero terminator; the terminator is consumed.
    CString,
    /// Exactly `FieldSpec::size` bytes, right-trimmed of zero padding.
    FixedString,
    /// Base-128 unsigned varint, at most ten bytes.
    VarUint,
    /// Zig-zag signed varint, at most ten bytes.
    VarInt,
}

impl FieldType {
    /// Encoded size in bytes for fixed-width scalars; `None` for strings and
    /// varints, whose extent depends on the data.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            FieldType::U8 | FieldType::I8 => Some(1),
            FieldType::U16Le | FieldType::U16Be | FieldType::I16Le | FieldType::I16Be => Some(2),
            FieldType::U32Le
            | FieldType::U32Be
            | FieldType::I32Le
            | FieldType::I32Be
            | FieldType::F32 => Some(4),
            FieldType::U64Le
            | FieldType::U64Be
            | FieldType::I64Le
            | FieldType::I64Be
            | FieldType::F64 => Some(8),
            FieldType::PascalString
            | FieldType::CString
            | FieldType::FixedString
            | FieldType::VarUint
            | FieldType::VarInt => None,
        }
    }
}

/// Role of a field within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Ordinary payload field.
    #[default]
    Plain,
    /// The decoded value declares the total frame length. Only unsigned
    /// 8/16/32-bit fields take effect; other types decode normally but leave
    /// the declared length unset.
    Length,
}

/// Immutable, construction-time field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    /// Byte count for [`FieldType::FixedString`]; ignored by other types.
    pub size: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        FieldSpec { name: name.into(), ty, size: 0, kind: FieldKind::Plain }
    }

    /// A field whose decoded value declares the frame length.
    pub fn length(name: impl Into<String>, ty: FieldType) -> Self {
        FieldSpec { name: name.into(), ty, size: 0, kind: FieldKind::Length }
    }

    /// A fixed-size string field of exactly `size` bytes.
    pub fn fixed_string(name: impl Into<String>, size: usize) -> Self {
        FieldSpec { name: name.into(), ty: FieldType::FixedString, size, kind: FieldKind::Plain }
    }
}

/// A single decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::U8(x) => Some(u64::from(*x)),
            FieldValue::U16(x) => Some(u64::from(*x)),
            FieldValue::U32(x) => Some(u64::from(*x)),
            FieldValue::U64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::I8(x) => Some(i64::from(*x)),
            FieldValue::I16(x) => Some(i64::from(*x)),
            FieldValue::I32(x) => Some(i64::from(*x)),
            FieldValue::I64(x) => Some(*x),
            FieldValue::U8(x) => Some(i64::from(*x)),
            FieldValue::U16(x) => Some(i64::from(*x)),
            FieldValue::U32(x) => Some(i64::from(*x)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::F32(x) => Some(f64::from(*x)),
            FieldValue::F64(x) => Some(*x),
            _ => None,
        }
    }
}

/// A field decoded during an attempt, recorded in wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub name: String,
    /// Buffer offset where decoding of this field began.
    pub offset: usize,
    pub ty: FieldType,
    pub value: FieldValue,
}

/// Decode a fixed-width scalar from `buf`, which must hold exactly the
/// field's encoded size. Callers guard availability; this never reads past
/// the given slice.
pub(crate) fn decode_scalar(buf: &[u8], ty: FieldType) -> FieldValue {
    match ty {
        FieldType::U8 => FieldValue::U8(buf[0]),
        FieldType::I8 => FieldValue::I8(buf[0] as i8),
        FieldType::U16Le => FieldValue::U16(LittleEndian::read_u16(buf)),
        FieldType::U16Be => FieldValue::U16(BigEndian::read_u16(buf)),
        FieldType::I16Le => FieldValue::I16(LittleEndian::read_i16(buf)),
        FieldType::I16Be => FieldValue::I16(BigEndian::read_i16(buf)),
        FieldType::U32Le => FieldValue::U32(LittleEndian::read_u32(buf)),
        FieldType::U32Be => FieldValue::U32(BigEndian::read_u32(buf)),
        FieldType::I32Le => FieldValue::I32(LittleEndian::read_i32(buf)),
        FieldType::I32Be => FieldValue::I32(BigEndian::read_i32(buf)),
        FieldType::U64Le => FieldValue::U64(LittleEndian::read_u64(buf)),
        FieldType::U64Be => FieldValue::U64(BigEndian::read_u64(buf)),
        FieldType::I64Le => FieldValue::I64(LittleEndian::read_i64(buf)),
        FieldType::I64Be => FieldValue::I64(BigEndian::read_i64(buf)),
        FieldType::F32 => FieldValue::F32(f32::from_bits(LittleEndian::read_u32(buf))),
        FieldType::F64 => FieldValue::F64(f64::from_bits(LittleEndian::read_u64(buf))),
        // Variable-length types never reach the scalar path.
        FieldType::PascalString
        | FieldType::CString
        | FieldType::FixedString
        | FieldType::VarUint
        | FieldType::VarInt => unreachable!("variable-length type in scalar decode"),
    }
}
