//! Schema-level data types and typed values for the storage engine.
//!
//! Every attribute in a table schema has a fixed on-disk width: `INT` and
//! `FLOAT` are 4 bytes, `BOOL` is 1 byte, `STRING` is a declared fixed
//! length. There is no variable-width or nullable encoding (see the record
//! manager's on-disk value codecs).

use std::cmp::Ordering;

/// Type tag recorded in a schema's attribute descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    Int,
    Float,
    Bool,
    /// Fixed declared length in bytes.
    String(u32),
}

impl DataType {
    /// Numeric tag stored in the on-disk schema header.
    pub fn tag(&self) -> u32 {
        match self {
            DataType::Int => 0,
            DataType::Float => 1,
            DataType::Bool => 2,
            DataType::String(_) => 3,
        }
    }

    /// Reconstructs a `DataType` from a stored tag and length field.
    pub fn from_tag(tag: u32, length: u32) -> Option<Self> {
        match tag {
            0 => Some(DataType::Int),
            1 => Some(DataType::Float),
            2 => Some(DataType::Bool),
            3 => Some(DataType::String(length)),
            _ => None,
        }
    }

    /// Byte width this attribute occupies in a record's fixed layout.
    pub fn byte_size(&self) -> usize {
        match self {
            DataType::Int => 4,
            DataType::Float => 4,
            DataType::Bool => 1,
            DataType::String(len) => *len as usize,
        }
    }

    /// The `length` field stored alongside the type tag in the schema header.
    pub fn declared_length(&self) -> u32 {
        match self {
            DataType::String(len) => *len,
            _ => self.byte_size() as u32,
        }
    }
}

/// A typed attribute value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
    String(String),
}

impl Value {
    /// The `DataType` this value is an instance of.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Float(_) => DataType::Float,
            Value::Bool(_) => DataType::Bool,
            Value::String(s) => DataType::String(s.len() as u32),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Compares two values of matching type; `None` on a type mismatch.
    ///
    /// `Float` has no `Eq`/`Ord` impl in std, so this is a hand rolled
    /// partial comparison rather than a derive.
    pub fn cmp_same_type(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality between two values of matching type; `None` on a type mismatch.
    pub fn eq_same_type(&self, other: &Value) -> Option<bool> {
        self.cmp_same_type(other).map(|ord| ord == Ordering::Equal)
    }

    /// Encodes this value into `buf`, which must be exactly
    /// `self.data_type().byte_size()` bytes (for `String`, the declared
    /// schema length — not the actual string length).
    ///
    /// Returns `None` if `buf` has the wrong length or a `String` value is
    /// longer than the declared field width.
    pub fn encode_into(&self, buf: &mut [u8]) -> Option<()> {
        match self {
            Value::Int(v) => {
                if buf.len() != 4 {
                    return None;
                }
                buf.copy_from_slice(&v.to_ne_bytes());
            }
            Value::Float(v) => {
                if buf.len() != 4 {
                    return None;
                }
                buf.copy_from_slice(&v.to_ne_bytes());
            }
            Value::Bool(v) => {
                if buf.len() != 1 {
                    return None;
                }
                buf[0] = if *v { 1 } else { 0 };
            }
            Value::String(s) => {
                let bytes = s.as_bytes();
                if bytes.len() > buf.len() {
                    return None;
                }
                buf[..bytes.len()].copy_from_slice(bytes);
                buf[bytes.len()..].fill(0);
            }
        }
        Some(())
    }

    /// Decodes a value of the given type from a field-width slice.
    ///
    /// For `String`, trailing NUL bytes are trimmed back to the original
    /// content — the declared length is a fixed field width, not the
    /// string's logical length.
    pub fn decode(ty: &DataType, buf: &[u8]) -> Option<Value> {
        if buf.len() != ty.byte_size() {
            return None;
        }
        match ty {
            DataType::Int => Some(Value::Int(i32::from_ne_bytes(buf.try_into().ok()?))),
            DataType::Float => Some(Value::Float(f32::from_ne_bytes(buf.try_into().ok()?))),
            DataType::Bool => Some(Value::Bool(buf[0] != 0)),
            DataType::String(_) => {
                let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
                Some(Value::String(
                    String::from_utf8_lossy(&buf[..end]).into_owned(),
                ))
            }
        }
    }
}
