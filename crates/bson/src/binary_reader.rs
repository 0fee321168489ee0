//! BSON binary reader.
//!
//! Reads the little-endian BSON wire format token by token. Every read is
//! bounds checked, and the declared size of each document, array and
//! code-with-scope element is verified when it closes.

use crate::error::{BsonError, Result};
use crate::reader::BsonReader;
use crate::types::{subtype, BsonType};
use crate::values::{BsonBinary, BsonDbPointer, BsonDecimal128, BsonObjectId, BsonTimestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextKind {
    Document,
    Array,
    Scope,
}

#[derive(Debug)]
struct Context {
    kind: ContextKind,
    /// Offset one past the container's last byte.
    end: usize,
}

/// Reads BSON tokens from a byte slice.
///
/// A fresh reader is positioned at a top-level document.
pub struct BsonBinaryReader<'a> {
    data: &'a [u8],
    x: usize,
    contexts: Vec<Context>,
    current_type: Option<BsonType>,
    current_name: Option<String>,
}

impl<'a> BsonBinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            x: 0,
            contexts: Vec::new(),
            current_type: Some(BsonType::Document),
            current_name: None,
        }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.x
    }

    /// True once every byte has been consumed outside of any container.
    pub fn is_exhausted(&self) -> bool {
        self.contexts.is_empty() && self.x == self.data.len()
    }

    #[inline]
    fn limit(&self) -> usize {
        self.contexts.last().map_or(self.data.len(), |ctx| ctx.end)
    }

    #[inline]
    fn check(&self, n: usize) -> Result<()> {
        match self.x.checked_add(n) {
            Some(end) if end <= self.limit() => Ok(()),
            _ => Err(BsonError::UnexpectedEof),
        }
    }

    fn u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let val = self.data[self.x];
        self.x += 1;
        Ok(val)
    }

    fn bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    fn i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.bytes::<4>()?))
    }

    fn i64_le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.bytes::<8>()?))
    }

    fn buf(&mut self, n: usize) -> Result<Vec<u8>> {
        self.check(n)?;
        let data = self.data[self.x..self.x + n].to_vec();
        self.x += n;
        Ok(data)
    }

    fn length(&mut self) -> Result<usize> {
        let len = self.i32_le()?;
        usize::try_from(len).map_err(|_| BsonError::InvalidSize(len as i64))
    }

    fn read_cstring(&mut self) -> Result<String> {
        let limit = self.limit();
        let start = self.x;
        let nul = self.data[start..limit]
            .iter()
            .position(|&b| b == 0)
            .ok_or(BsonError::UnexpectedEof)?;
        let s = std::str::from_utf8(&self.data[start..start + nul])
            .map_err(|_| BsonError::InvalidUtf8)?
            .to_owned();
        self.x = start + nul + 1;
        Ok(s)
    }

    /// Reads a BSON string: i32 length (including the null terminator), bytes, null byte.
    fn read_bson_string(&mut self) -> Result<String> {
        let length = self.length()?;
        if length == 0 {
            return Err(BsonError::InvalidSize(0));
        }
        let bytes = self.buf(length - 1)?;
        if self.u8()? != 0 {
            return Err(BsonError::InvalidValue("string is not null-terminated".into()));
        }
        String::from_utf8(bytes).map_err(|_| BsonError::InvalidUtf8)
    }

    fn read_object_id_bytes(&mut self) -> Result<BsonObjectId> {
        Ok(BsonObjectId::from_bytes(self.bytes::<12>()?))
    }

    /// Checks that the reader sits on a value of `expected` type and consumes the marker.
    fn expect(&mut self, expected: BsonType) -> Result<()> {
        if self.current_type != Some(expected) {
            return Err(BsonError::TypeMismatch {
                expected,
                actual: self.current_type,
            });
        }
        self.current_type = None;
        self.current_name = None;
        Ok(())
    }

    fn open(&mut self, kind: ContextKind) -> Result<()> {
        let start = self.x;
        let size = self.length()?;
        if size < 5 {
            return Err(BsonError::InvalidSize(size as i64));
        }
        let end = start.checked_add(size).ok_or(BsonError::InvalidSize(size as i64))?;
        if end > self.limit() {
            return Err(BsonError::UnexpectedEof);
        }
        self.contexts.push(Context { kind, end });
        Ok(())
    }

    fn close(&mut self, kind: ContextKind) -> Result<()> {
        if self.current_type != Some(BsonType::EndOfDocument) {
            return Err(BsonError::InvalidState(format!(
                "{kind:?} closed before its end marker was read"
            )));
        }
        let ctx = match self.contexts.pop() {
            Some(ctx) if ctx.kind == kind => ctx,
            _ => return Err(BsonError::InvalidState(format!("no open {kind:?} to close"))),
        };
        if self.x != ctx.end {
            return Err(BsonError::SizeMismatch {
                expected: ctx.end,
                actual: self.x,
            });
        }
        if kind == ContextKind::Document
            && matches!(self.contexts.last(), Some(c) if c.kind == ContextKind::Scope)
        {
            if let Some(scope) = self.contexts.pop() {
                if self.x != scope.end {
                    return Err(BsonError::SizeMismatch {
                        expected: scope.end,
                        actual: self.x,
                    });
                }
            }
        }
        // Back at the top level, another document may follow.
        self.current_type = if self.contexts.is_empty() && self.x < self.data.len() {
            Some(BsonType::Document)
        } else {
            None
        };
        Ok(())
    }
}

impl BsonReader for BsonBinaryReader<'_> {
    fn current_bson_type(&self) -> Option<BsonType> {
        self.current_type
    }

    fn read_bson_type(&mut self) -> Result<BsonType> {
        let kind = match self.contexts.last() {
            Some(ctx) if ctx.kind != ContextKind::Scope => ctx.kind,
            _ => {
                return Err(BsonError::InvalidState(
                    "read_bson_type is only valid inside a document or array".into(),
                ))
            }
        };
        let tag = self.u8()?;
        let typ = BsonType::from_u8(tag).ok_or(BsonError::UnsupportedType(tag))?;
        self.current_type = Some(typ);
        self.current_name = None;
        if typ != BsonType::EndOfDocument {
            let name = self.read_cstring()?;
            if kind == ContextKind::Document {
                self.current_name = Some(name);
            }
        }
        Ok(typ)
    }

    fn read_name(&mut self) -> Result<String> {
        self.current_name
            .take()
            .ok_or_else(|| BsonError::InvalidState("no field name at this position".into()))
    }

    fn read_start_document(&mut self) -> Result<()> {
        self.expect(BsonType::Document)?;
        self.open(ContextKind::Document)
    }

    fn read_end_document(&mut self) -> Result<()> {
        self.close(ContextKind::Document)
    }

    fn read_start_array(&mut self) -> Result<()> {
        self.expect(BsonType::Array)?;
        self.open(ContextKind::Array)
    }

    fn read_end_array(&mut self) -> Result<()> {
        self.close(ContextKind::Array)
    }

    fn read_double(&mut self) -> Result<f64> {
        self.expect(BsonType::Double)?;
        Ok(f64::from_le_bytes(self.bytes::<8>()?))
    }

    fn read_string(&mut self) -> Result<String> {
        self.expect(BsonType::String)?;
        self.read_bson_string()
    }

    fn read_binary_data(&mut self) -> Result<BsonBinary> {
        self.expect(BsonType::Binary)?;
        let mut length = self.length()?;
        let subtype = self.u8()?;
        if subtype == subtype::OLD_BINARY {
            let inner = self.length()?;
            if inner + 4 != length {
                return Err(BsonError::InvalidSize(inner as i64));
            }
            length = inner;
        }
        let data = self.buf(length)?;
        Ok(BsonBinary { subtype, data })
    }

    fn read_undefined(&mut self) -> Result<()> {
        self.expect(BsonType::Undefined)
    }

    fn read_object_id(&mut self) -> Result<BsonObjectId> {
        self.expect(BsonType::ObjectId)?;
        self.read_object_id_bytes()
    }

    fn read_boolean(&mut self) -> Result<bool> {
        self.expect(BsonType::Boolean)?;
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(BsonError::InvalidValue(format!("invalid boolean byte 0x{b:02x}"))),
        }
    }

    fn read_date_time(&mut self) -> Result<i64> {
        self.expect(BsonType::DateTime)?;
        self.i64_le()
    }

    fn read_null(&mut self) -> Result<()> {
        self.expect(BsonType::Null)
    }

    fn read_regular_expression(&mut self) -> Result<(String, String)> {
        self.expect(BsonType::RegularExpression)?;
        let pattern = self.read_cstring()?;
        let options = self.read_cstring()?;
        Ok((pattern, options))
    }

    fn read_db_pointer(&mut self) -> Result<BsonDbPointer> {
        self.expect(BsonType::DbPointer)?;
        let name = self.read_bson_string()?;
        let id = self.read_object_id_bytes()?;
        Ok(BsonDbPointer { name, id })
    }

    fn read_javascript(&mut self) -> Result<String> {
        self.expect(BsonType::JavaScript)?;
        self.read_bson_string()
    }

    fn read_symbol(&mut self) -> Result<String> {
        self.expect(BsonType::Symbol)?;
        self.read_bson_string()
    }

    fn read_javascript_with_scope(&mut self) -> Result<String> {
        self.expect(BsonType::JavaScriptWithScope)?;
        self.open(ContextKind::Scope)?;
        let code = self.read_bson_string()?;
        // The scope document follows.
        self.current_type = Some(BsonType::Document);
        Ok(code)
    }

    fn read_int32(&mut self) -> Result<i32> {
        self.expect(BsonType::Int32)?;
        self.i32_le()
    }

    fn read_timestamp(&mut self) -> Result<BsonTimestamp> {
        self.expect(BsonType::Timestamp)?;
        let increment = self.i32_le()?;
        let timestamp = self.i32_le()?;
        Ok(BsonTimestamp {
            increment,
            timestamp,
        })
    }

    fn read_int64(&mut self) -> Result<i64> {
        self.expect(BsonType::Int64)?;
        self.i64_le()
    }

    fn read_decimal128(&mut self) -> Result<BsonDecimal128> {
        self.expect(BsonType::Decimal128)?;
        Ok(BsonDecimal128 {
            data: self.buf(16)?,
        })
    }

    fn read_min_key(&mut self) -> Result<()> {
        self.expect(BsonType::MinKey)
    }

    fn read_max_key(&mut self) -> Result<()> {
        self.expect(BsonType::MaxKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_int32_field() {
        let bytes = [12, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0];
        let mut r = BsonBinaryReader::new(&bytes);
        r.read_start_document().unwrap();
        assert_eq!(r.read_bson_type().unwrap(), BsonType::Int32);
        assert_eq!(r.read_name().unwrap(), "a");
        assert_eq!(r.read_int32().unwrap(), 1);
        assert_eq!(r.read_bson_type().unwrap(), BsonType::EndOfDocument);
        r.read_end_document().unwrap();
        assert!(r.is_exhausted());
    }

    #[test]
    fn wrong_typed_read_is_a_mismatch() {
        let bytes = [12, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0];
        let mut r = BsonBinaryReader::new(&bytes);
        r.read_start_document().unwrap();
        r.read_bson_type().unwrap();
        assert_eq!(
            r.read_string(),
            Err(BsonError::TypeMismatch {
                expected: BsonType::String,
                actual: Some(BsonType::Int32),
            })
        );
    }

    #[test]
    fn truncated_input_is_eof() {
        let bytes = [12, 0, 0, 0, 0x10, b'a', 0, 1];
        let mut r = BsonBinaryReader::new(&bytes);
        assert_eq!(r.read_start_document(), Err(BsonError::UnexpectedEof));
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let bytes = [8, 0, 0, 0, 0x42, b'a', 0, 0];
        let mut r = BsonBinaryReader::new(&bytes);
        r.read_start_document().unwrap();
        assert_eq!(r.read_bson_type(), Err(BsonError::UnsupportedType(0x42)));
    }

    #[test]
    fn declared_size_is_verified() {
        // Declares 6 bytes but terminates after 5.
        let bytes = [6, 0, 0, 0, 0, 0];
        let mut r = BsonBinaryReader::new(&bytes);
        r.read_start_document().unwrap();
        assert_eq!(r.read_bson_type().unwrap(), BsonType::EndOfDocument);
        assert_eq!(
            r.read_end_document(),
            Err(BsonError::SizeMismatch {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn array_element_names_are_skipped() {
        let bytes = [
            21, 0, 0, 0, 0x04, b'x', 0, 13, 0, 0, 0, 0x08, b'0', 0, 1, 0x08, b'1', 0, 0, 0, 0,
        ];
        let mut r = BsonBinaryReader::new(&bytes);
        r.read_start_document().unwrap();
        assert_eq!(r.read_bson_type().unwrap(), BsonType::Array);
        assert_eq!(r.read_name().unwrap(), "x");
        r.read_start_array().unwrap();
        assert_eq!(r.read_bson_type().unwrap(), BsonType::Boolean);
        assert!(r.read_boolean().unwrap());
        assert_eq!(r.read_bson_type().unwrap(), BsonType::Boolean);
        assert!(!r.read_boolean().unwrap());
        assert_eq!(r.read_bson_type().unwrap(), BsonType::EndOfDocument);
        r.read_end_array().unwrap();
        assert_eq!(r.read_bson_type().unwrap(), BsonType::EndOfDocument);
        r.read_end_document().unwrap();
    }
}
