//! In-memory BSON writer.
//!
//! Builds a [`BsonValue`] document from writer tokens instead of bytes. Used
//! where an encoded value is needed as a structured value rather than on the
//! wire.

use crate::error::{BsonError, Result};
use crate::values::{
    BsonBinary, BsonDbPointer, BsonDecimal128, BsonJavascriptCode, BsonJavascriptCodeWithScope,
    BsonObjectId, BsonSymbol, BsonTimestamp, BsonValue,
};
use crate::writer::BsonWriter;

#[derive(Debug)]
enum Frame {
    Document {
        /// Name under which the finished document is placed in its parent.
        name: Option<String>,
        fields: Vec<(String, BsonValue)>,
    },
    Array {
        name: Option<String>,
        items: Vec<BsonValue>,
    },
    Scope {
        name: Option<String>,
        code: String,
    },
}

/// Writer that collects a single top-level document in memory.
#[derive(Debug, Default)]
pub struct BsonDocumentWriter {
    stack: Vec<Frame>,
    name: Option<String>,
    document: Option<Vec<(String, BsonValue)>>,
}

impl BsonDocumentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed top-level document, once `write_end_document` closed it.
    pub fn document(&self) -> Option<&[(String, BsonValue)]> {
        self.document.as_deref()
    }

    pub fn into_document(self) -> Option<Vec<(String, BsonValue)>> {
        self.document
    }

    /// Name for a container about to be opened in the current frame.
    fn slot_name(&mut self) -> Result<Option<String>> {
        match self.stack.last() {
            Some(Frame::Document { .. }) => self
                .name
                .take()
                .map(Some)
                .ok_or_else(|| BsonError::InvalidState("write_name must precede a value".into())),
            Some(Frame::Array { .. }) => Ok(None),
            Some(Frame::Scope { .. }) => Err(BsonError::InvalidState(
                "expected scope document".into(),
            )),
            None => Err(BsonError::InvalidState("value written outside of a document".into())),
        }
    }

    fn attach(&mut self, name: Option<String>, value: BsonValue) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Document { fields, .. }) => {
                let name = name.ok_or_else(|| {
                    BsonError::InvalidState("document field without a name".into())
                })?;
                fields.push((name, value));
                Ok(())
            }
            Some(Frame::Array { items, .. }) => {
                items.push(value);
                Ok(())
            }
            Some(Frame::Scope { .. }) => {
                Err(BsonError::InvalidState("expected scope document".into()))
            }
            None => Err(BsonError::InvalidState("value written outside of a document".into())),
        }
    }

    fn push_value(&mut self, value: BsonValue) -> Result<()> {
        let name = self.slot_name()?;
        self.attach(name, value)
    }
}

impl BsonWriter for BsonDocumentWriter {
    fn write_start_document(&mut self) -> Result<()> {
        let name = match self.stack.last() {
            None => {
                if self.document.is_some() {
                    return Err(BsonError::InvalidState("document already written".into()));
                }
                None
            }
            Some(Frame::Scope { .. }) => None,
            Some(_) => self.slot_name()?,
        };
        self.stack.push(Frame::Document {
            name,
            fields: Vec::new(),
        });
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<()> {
        let (name, fields) = match self.stack.pop() {
            Some(Frame::Document { name, fields }) => (name, fields),
            Some(other) => {
                self.stack.push(other);
                return Err(BsonError::InvalidState("no open document to close".into()));
            }
            None => return Err(BsonError::InvalidState("no open document to close".into())),
        };
        match self.stack.pop() {
            None => {
                self.document = Some(fields);
                Ok(())
            }
            Some(Frame::Scope { name, code }) => {
                let value = BsonValue::JavaScriptCodeWithScope(BsonJavascriptCodeWithScope {
                    code,
                    scope: fields,
                });
                self.attach(name, value)
            }
            Some(parent) => {
                self.stack.push(parent);
                self.attach(name, BsonValue::Document(fields))
            }
        }
    }

    fn write_start_array(&mut self) -> Result<()> {
        let name = self.slot_name()?;
        self.stack.push(Frame::Array {
            name,
            items: Vec::new(),
        });
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Array { name, items }) => self.attach(name, BsonValue::Array(items)),
            Some(other) => {
                self.stack.push(other);
                Err(BsonError::InvalidState("no open array to close".into()))
            }
            None => Err(BsonError::InvalidState("no open array to close".into())),
        }
    }

    fn write_name(&mut self, name: &str) -> Result<()> {
        match self.stack.last() {
            Some(Frame::Document { .. }) => {
                self.name = Some(name.to_owned());
                Ok(())
            }
            _ => Err(BsonError::InvalidState(format!(
                "write_name({name:?}) is only valid inside a document"
            ))),
        }
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.push_value(BsonValue::Float(value))
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.push_value(BsonValue::Str(value.to_owned()))
    }

    fn write_binary_data(&mut self, binary: &BsonBinary) -> Result<()> {
        self.push_value(BsonValue::Binary(binary.clone()))
    }

    fn write_undefined(&mut self) -> Result<()> {
        self.push_value(BsonValue::Undefined)
    }

    fn write_object_id(&mut self, id: &BsonObjectId) -> Result<()> {
        id.validate()?;
        self.push_value(BsonValue::ObjectId(*id))
    }

    fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.push_value(BsonValue::Boolean(value))
    }

    fn write_date_time(&mut self, millis: i64) -> Result<()> {
        self.push_value(BsonValue::DateTime(millis))
    }

    fn write_null(&mut self) -> Result<()> {
        self.push_value(BsonValue::Null)
    }

    fn write_regular_expression(&mut self, pattern: &str, options: &str) -> Result<()> {
        self.push_value(BsonValue::Regex(pattern.to_owned(), options.to_owned()))
    }

    fn write_db_pointer(&mut self, pointer: &BsonDbPointer) -> Result<()> {
        pointer.id.validate()?;
        self.push_value(BsonValue::DbPointer(pointer.clone()))
    }

    fn write_javascript(&mut self, code: &str) -> Result<()> {
        self.push_value(BsonValue::JavaScriptCode(BsonJavascriptCode {
            code: code.to_owned(),
        }))
    }

    fn write_symbol(&mut self, symbol: &str) -> Result<()> {
        self.push_value(BsonValue::Symbol(BsonSymbol {
            symbol: symbol.to_owned(),
        }))
    }

    fn write_javascript_with_scope(&mut self, code: &str) -> Result<()> {
        let name = self.slot_name()?;
        self.stack.push(Frame::Scope {
            name,
            code: code.to_owned(),
        });
        Ok(())
    }

    fn write_int32(&mut self, value: i32) -> Result<()> {
        self.push_value(BsonValue::Int32(value))
    }

    fn write_timestamp(&mut self, timestamp: &BsonTimestamp) -> Result<()> {
        self.push_value(BsonValue::Timestamp(*timestamp))
    }

    fn write_int64(&mut self, value: i64) -> Result<()> {
        self.push_value(BsonValue::Int64(value))
    }

    fn write_decimal128(&mut self, value: &BsonDecimal128) -> Result<()> {
        self.push_value(BsonValue::Decimal128(value.clone()))
    }

    fn write_min_key(&mut self) -> Result<()> {
        self.push_value(BsonValue::MinKey)
    }

    fn write_max_key(&mut self) -> Result<()> {
        self.push_value(BsonValue::MaxKey)
    }
}
