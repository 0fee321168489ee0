//! Token-level BSON writer interface.
//!
//! A writer is driven as a sequence of tokens: containers are opened and
//! closed explicitly, and every document field is a `write_name` followed
//! by exactly one value token. Array elements are written without names.

use crate::error::Result;
use crate::values::{
    BsonBinary, BsonDbPointer, BsonDecimal128, BsonObjectId, BsonTimestamp, BsonValue,
};

/// Emits BSON tokens in call order.
pub trait BsonWriter {
    fn write_start_document(&mut self) -> Result<()>;
    fn write_end_document(&mut self) -> Result<()>;
    fn write_start_array(&mut self) -> Result<()>;
    fn write_end_array(&mut self) -> Result<()>;
    /// Names the next value written inside a document.
    fn write_name(&mut self, name: &str) -> Result<()>;

    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_binary_data(&mut self, binary: &BsonBinary) -> Result<()>;
    fn write_undefined(&mut self) -> Result<()>;
    fn write_object_id(&mut self, id: &BsonObjectId) -> Result<()>;
    fn write_boolean(&mut self, value: bool) -> Result<()>;
    fn write_date_time(&mut self, millis: i64) -> Result<()>;
    fn write_null(&mut self) -> Result<()>;
    fn write_regular_expression(&mut self, pattern: &str, options: &str) -> Result<()>;
    fn write_db_pointer(&mut self, pointer: &BsonDbPointer) -> Result<()>;
    fn write_javascript(&mut self, code: &str) -> Result<()>;
    fn write_symbol(&mut self, symbol: &str) -> Result<()>;
    /// Writes the code part of a code-with-scope value. The scope must follow
    /// immediately as a document (`write_start_document` .. `write_end_document`).
    fn write_javascript_with_scope(&mut self, code: &str) -> Result<()>;
    fn write_int32(&mut self, value: i32) -> Result<()>;
    fn write_timestamp(&mut self, timestamp: &BsonTimestamp) -> Result<()>;
    fn write_int64(&mut self, value: i64) -> Result<()>;
    fn write_decimal128(&mut self, value: &BsonDecimal128) -> Result<()>;
    fn write_min_key(&mut self) -> Result<()>;
    fn write_max_key(&mut self) -> Result<()>;
}

/// Writes a whole document (start, fields, end).
pub fn write_bson_document<W: BsonWriter + ?Sized>(
    writer: &mut W,
    fields: &[(String, BsonValue)],
) -> Result<()> {
    writer.write_start_document()?;
    for (name, value) in fields {
        writer.write_name(name)?;
        write_bson_value(writer, value)?;
    }
    writer.write_end_document()
}

/// Writes a single value token (recursively for containers).
pub fn write_bson_value<W: BsonWriter + ?Sized>(writer: &mut W, value: &BsonValue) -> Result<()> {
    match value {
        BsonValue::Float(f) => writer.write_double(*f),
        BsonValue::Str(s) => writer.write_string(s),
        BsonValue::Document(fields) => write_bson_document(writer, fields),
        BsonValue::Array(items) => {
            writer.write_start_array()?;
            for item in items {
                write_bson_value(writer, item)?;
            }
            writer.write_end_array()
        }
        BsonValue::Binary(bin) => writer.write_binary_data(bin),
        BsonValue::Undefined => writer.write_undefined(),
        BsonValue::ObjectId(id) => writer.write_object_id(id),
        BsonValue::Boolean(b) => writer.write_boolean(*b),
        BsonValue::DateTime(ms) => writer.write_date_time(*ms),
        BsonValue::Null => writer.write_null(),
        BsonValue::Regex(pattern, options) => writer.write_regular_expression(pattern, options),
        BsonValue::DbPointer(ptr) => writer.write_db_pointer(ptr),
        BsonValue::JavaScriptCode(js) => writer.write_javascript(&js.code),
        BsonValue::Symbol(sym) => writer.write_symbol(&sym.symbol),
        BsonValue::JavaScriptCodeWithScope(jscws) => {
            writer.write_javascript_with_scope(&jscws.code)?;
            write_bson_document(writer, &jscws.scope)
        }
        BsonValue::Int32(i) => writer.write_int32(*i),
        BsonValue::Timestamp(ts) => writer.write_timestamp(ts),
        BsonValue::Int64(i) => writer.write_int64(*i),
        BsonValue::Decimal128(dec) => writer.write_decimal128(dec),
        BsonValue::MinKey => writer.write_min_key(),
        BsonValue::MaxKey => writer.write_max_key(),
    }
}
