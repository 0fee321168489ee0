//! BSON binary writer.
//!
//! BSON is a little-endian binary format. Container sizes are not known
//! up front, so a 4-byte placeholder is reserved when a container opens and
//! back-patched when it closes.

use crate::error::{BsonError, Result};
use crate::types::{subtype, BsonType};
use crate::values::{BsonBinary, BsonDbPointer, BsonDecimal128, BsonObjectId, BsonTimestamp};
use crate::writer::BsonWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextKind {
    Document,
    Array,
    /// Code-with-scope element whose scope document has not been written yet.
    Scope,
}

#[derive(Debug)]
struct Context {
    kind: ContextKind,
    /// Offset of the 4-byte size placeholder.
    start: usize,
    /// Next array index.
    index: usize,
}

/// Writes BSON tokens to a growable byte buffer.
///
/// Several top-level documents may be written back to back.
#[derive(Debug, Default)]
pub struct BsonBinaryWriter {
    buf: Vec<u8>,
    contexts: Vec<Context>,
    name: Option<String>,
}

impl BsonBinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the written data and resets the buffer.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes the element header (type tag + field name) for the next value.
    fn begin_element(&mut self, typ: BsonType) -> Result<()> {
        let Some(ctx) = self.contexts.last_mut() else {
            return Err(BsonError::InvalidState(format!(
                "cannot write {typ} outside of a document"
            )));
        };
        match ctx.kind {
            ContextKind::Document => {
                let name = self.name.take().ok_or_else(|| {
                    BsonError::InvalidState(format!("write_name must precede {typ} in a document"))
                })?;
                self.buf.push(typ.as_u8());
                write_cstring(&mut self.buf, &name)
            }
            ContextKind::Array => {
                let index = ctx.index;
                ctx.index += 1;
                self.buf.push(typ.as_u8());
                write_cstring(&mut self.buf, &index.to_string())
            }
            ContextKind::Scope => Err(BsonError::InvalidState(format!(
                "expected scope document, got {typ}"
            ))),
        }
    }

    fn open(&mut self, kind: ContextKind) {
        let start = self.buf.len();
        self.buf.extend_from_slice(&[0u8; 4]);
        self.contexts.push(Context {
            kind,
            start,
            index: 0,
        });
    }

    fn close(&mut self, kind: ContextKind) -> Result<()> {
        match self.contexts.last() {
            Some(ctx) if ctx.kind == kind => {}
            _ => {
                return Err(BsonError::InvalidState(format!(
                    "no open {kind:?} to close"
                )))
            }
        }
        if self.name.is_some() {
            return Err(BsonError::InvalidState("field name without a value".into()));
        }
        self.buf.push(0);
        if let Some(ctx) = self.contexts.pop() {
            self.patch_size(ctx.start)?;
        }
        // A closed scope document also completes its code-with-scope element.
        if kind == ContextKind::Document
            && matches!(self.contexts.last(), Some(ctx) if ctx.kind == ContextKind::Scope)
        {
            if let Some(scope) = self.contexts.pop() {
                self.patch_size(scope.start)?;
            }
        }
        Ok(())
    }

    fn patch_size(&mut self, start: usize) -> Result<()> {
        let size = i32::try_from(self.buf.len() - start)
            .map_err(|_| BsonError::InvalidSize((self.buf.len() - start) as i64))?;
        self.buf[start..start + 4].copy_from_slice(&size.to_le_bytes());
        Ok(())
    }
}

impl BsonWriter for BsonBinaryWriter {
    fn write_start_document(&mut self) -> Result<()> {
        match self.contexts.last() {
            None => {}
            Some(ctx) if ctx.kind == ContextKind::Scope => {}
            Some(_) => self.begin_element(BsonType::Document)?,
        }
        self.open(ContextKind::Document);
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<()> {
        self.close(ContextKind::Document)
    }

    fn write_start_array(&mut self) -> Result<()> {
        self.begin_element(BsonType::Array)?;
        self.open(ContextKind::Array);
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<()> {
        self.close(ContextKind::Array)
    }

    fn write_name(&mut self, name: &str) -> Result<()> {
        match self.contexts.last() {
            Some(ctx) if ctx.kind == ContextKind::Document => {
                if self.name.is_some() {
                    return Err(BsonError::InvalidState(format!(
                        "write_name({name:?}) called twice without a value"
                    )));
                }
                self.name = Some(name.to_owned());
                Ok(())
            }
            _ => Err(BsonError::InvalidState(format!(
                "write_name({name:?}) is only valid inside a document"
            ))),
        }
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.begin_element(BsonType::Double)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.begin_element(BsonType::String)?;
        write_string(&mut self.buf, value)
    }

    fn write_binary_data(&mut self, binary: &BsonBinary) -> Result<()> {
        self.begin_element(BsonType::Binary)?;
        let len = i32::try_from(binary.data.len())
            .map_err(|_| BsonError::InvalidSize(binary.data.len() as i64))?;
        if binary.subtype == subtype::OLD_BINARY {
            // The old binary subtype repeats the payload length inside the payload.
            self.buf.extend_from_slice(&old_binary_total_len(len)?.to_le_bytes());
            self.buf.push(binary.subtype);
            self.buf.extend_from_slice(&len.to_le_bytes());
        } else {
            self.buf.extend_from_slice(&len.to_le_bytes());
            self.buf.push(binary.subtype);
        }
        self.buf.extend_from_slice(&binary.data);
        Ok(())
    }

    fn write_undefined(&mut self) -> Result<()> {
        self.begin_element(BsonType::Undefined)
    }

    fn write_object_id(&mut self, id: &BsonObjectId) -> Result<()> {
        id.validate()?;
        self.begin_element(BsonType::ObjectId)?;
        self.buf.extend_from_slice(&id.to_bytes());
        Ok(())
    }

    fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.begin_element(BsonType::Boolean)?;
        self.buf.push(u8::from(value));
        Ok(())
    }

    fn write_date_time(&mut self, millis: i64) -> Result<()> {
        self.begin_element(BsonType::DateTime)?;
        self.buf.extend_from_slice(&millis.to_le_bytes());
        Ok(())
    }

    fn write_null(&mut self) -> Result<()> {
        self.begin_element(BsonType::Null)
    }

    fn write_regular_expression(&mut self, pattern: &str, options: &str) -> Result<()> {
        self.begin_element(BsonType::RegularExpression)?;
        write_cstring(&mut self.buf, pattern)?;
        write_cstring(&mut self.buf, options)
    }

    fn write_db_pointer(&mut self, pointer: &BsonDbPointer) -> Result<()> {
        pointer.id.validate()?;
        self.begin_element(BsonType::DbPointer)?;
        write_string(&mut self.buf, &pointer.name)?;
        self.buf.extend_from_slice(&pointer.id.to_bytes());
        Ok(())
    }

    fn write_javascript(&mut self, code: &str) -> Result<()> {
        self.begin_element(BsonType::JavaScript)?;
        write_string(&mut self.buf, code)
    }

    fn write_symbol(&mut self, symbol: &str) -> Result<()> {
        self.begin_element(BsonType::Symbol)?;
        write_string(&mut self.buf, symbol)
    }

    fn write_javascript_with_scope(&mut self, code: &str) -> Result<()> {
        self.begin_element(BsonType::JavaScriptWithScope)?;
        // Total length placeholder, patched once the scope document closes.
        self.open(ContextKind::Scope);
        write_string(&mut self.buf, code)
    }

    fn write_int32(&mut self, value: i32) -> Result<()> {
        self.begin_element(BsonType::Int32)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_timestamp(&mut self, timestamp: &BsonTimestamp) -> Result<()> {
        self.begin_element(BsonType::Timestamp)?;
        self.buf.extend_from_slice(&timestamp.increment.to_le_bytes());
        self.buf.extend_from_slice(&timestamp.timestamp.to_le_bytes());
        Ok(())
    }

    fn write_int64(&mut self, value: i64) -> Result<()> {
        self.begin_element(BsonType::Int64)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_decimal128(&mut self, value: &BsonDecimal128) -> Result<()> {
        if value.data.len() != 16 {
            return Err(BsonError::InvalidValue(format!(
                "Decimal128 data must be 16 bytes, got {}",
                value.data.len()
            )));
        }
        self.begin_element(BsonType::Decimal128)?;
        self.buf.extend_from_slice(&value.data);
        Ok(())
    }

    fn write_min_key(&mut self) -> Result<()> {
        self.begin_element(BsonType::MinKey)
    }

    fn write_max_key(&mut self) -> Result<()> {
        self.begin_element(BsonType::MaxKey)
    }
}

/// Writes a null-terminated C-string. Embedded null bytes are rejected.
fn write_cstring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(BsonError::InvalidValue(format!(
            "C-string may not contain a null byte: {s:?}"
        )));
    }
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}

/// Writes a BSON string: little-endian i32 (byte_count+1) + UTF-8 bytes + null byte.
fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    let bytes = s.as_bytes();
    let len = i32::try_from(bytes.len() + 1).map_err(|_| BsonError::InvalidSize(bytes.len() as i64))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    buf.push(0);
    Ok(())
}

/// Outer length of an old-binary payload: the data plus its 4-byte inner length.
fn old_binary_total_len(len: i32) -> Result<i32> {
    len.checked_add(4)
        .ok_or(BsonError::InvalidSize(i64::from(len) + 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document() {
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        w.write_end_document().unwrap();
        assert_eq!(w.flush(), [5, 0, 0, 0, 0]);
    }

    #[test]
    fn int32_field() {
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        w.write_name("a").unwrap();
        w.write_int32(1).unwrap();
        w.write_end_document().unwrap();
        assert_eq!(
            w.flush(),
            [12, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn array_elements_get_index_names() {
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        w.write_name("x").unwrap();
        w.write_start_array().unwrap();
        w.write_boolean(true).unwrap();
        w.write_boolean(false).unwrap();
        w.write_end_array().unwrap();
        w.write_end_document().unwrap();
        let bytes = w.flush();
        assert_eq!(
            bytes,
            [
                21, 0, 0, 0, // document size
                0x04, b'x', 0, // array header
                13, 0, 0, 0, // array size
                0x08, b'0', 0, 1, // "0": true
                0x08, b'1', 0, 0, // "1": false
                0, // end of array
                0, // end of document
            ]
        );
    }

    #[test]
    fn value_without_name_is_rejected() {
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        assert!(matches!(w.write_int32(1), Err(BsonError::InvalidState(_))));
    }

    #[test]
    fn value_outside_document_is_rejected() {
        let mut w = BsonBinaryWriter::new();
        assert!(matches!(w.write_null(), Err(BsonError::InvalidState(_))));
    }

    #[test]
    fn mismatched_close_is_rejected() {
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        assert!(w.write_end_array().is_err());
    }

    #[test]
    fn code_with_scope_total_length_is_patched() {
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        w.write_name("f").unwrap();
        w.write_javascript_with_scope("x").unwrap();
        w.write_start_document().unwrap();
        w.write_end_document().unwrap();
        w.write_end_document().unwrap();
        let bytes = w.flush();
        // total = 4 (length) + 6 (string "x") + 5 (empty scope)
        assert_eq!(&bytes[7..11], &15i32.to_le_bytes());
        assert_eq!(bytes.len(), 4 + 3 + 15 + 1);
    }

    #[test]
    fn old_binary_carries_inner_length() {
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        w.write_name("b").unwrap();
        w.write_binary_data(&BsonBinary {
            subtype: subtype::OLD_BINARY,
            data: vec![7, 8],
        })
        .unwrap();
        w.write_end_document().unwrap();
        let bytes = w.flush();
        assert_eq!(&bytes[7..11], &6i32.to_le_bytes());
        assert_eq!(bytes[11], subtype::OLD_BINARY);
        assert_eq!(&bytes[12..16], &2i32.to_le_bytes());
        assert_eq!(&bytes[16..18], &[7, 8]);
    }

    #[test]
    fn old_binary_length_must_fit_i32() {
        assert_eq!(old_binary_total_len(2).unwrap(), 6);
        assert_eq!(
            old_binary_total_len(i32::MAX),
            Err(BsonError::InvalidSize(i64::from(i32::MAX) + 4))
        );
    }

    #[test]
    fn object_id_parts_must_fit_their_width() {
        let too_wide = [
            BsonObjectId {
                timestamp: 1,
                process: 1 << 41,
                counter: 0,
            },
            BsonObjectId {
                timestamp: 1,
                process: 0,
                counter: 0x0100_0001,
            },
        ];
        for id in too_wide {
            let mut w = BsonBinaryWriter::new();
            w.write_start_document().unwrap();
            w.write_name("_id").unwrap();
            assert!(matches!(w.write_object_id(&id), Err(BsonError::InvalidValue(_))));
            let pointer = BsonDbPointer {
                name: "ns".into(),
                id,
            };
            assert!(matches!(w.write_db_pointer(&pointer), Err(BsonError::InvalidValue(_))));
        }

        let widest = BsonObjectId {
            timestamp: u32::MAX,
            process: 0xff_ffff_ffff,
            counter: 0x00ff_ffff,
        };
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        w.write_name("_id").unwrap();
        w.write_object_id(&widest).unwrap();
        w.write_end_document().unwrap();
        assert_eq!(&w.flush()[9..21], &[0xff; 12]);
    }

    #[test]
    fn null_byte_in_name_is_rejected() {
        let mut w = BsonBinaryWriter::new();
        w.write_start_document().unwrap();
        w.write_name("a\0b").unwrap();
        assert!(matches!(w.write_null(), Err(BsonError::InvalidValue(_))));
    }
}
