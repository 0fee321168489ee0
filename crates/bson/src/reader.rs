//! Token-level BSON reader interface.
//!
//! Readers mirror [`BsonWriter`](crate::BsonWriter): `read_bson_type`
//! advances to the next element of the current container and reports its
//! type (`EndOfDocument` once the container is exhausted), `read_name`
//! returns the element's field name, and the typed readers consume the
//! element's value.

use crate::error::{BsonError, Result};
use crate::types::BsonType;
use crate::values::{
    BsonBinary, BsonDbPointer, BsonDecimal128, BsonJavascriptCode, BsonJavascriptCodeWithScope,
    BsonObjectId, BsonSymbol, BsonTimestamp, BsonValue,
};

/// Consumes BSON tokens.
pub trait BsonReader {
    /// Type of the element the reader is positioned at, if any.
    fn current_bson_type(&self) -> Option<BsonType>;
    /// Advances to the next element and returns its type.
    fn read_bson_type(&mut self) -> Result<BsonType>;
    /// Field name of the current element.
    fn read_name(&mut self) -> Result<String>;

    fn read_start_document(&mut self) -> Result<()>;
    fn read_end_document(&mut self) -> Result<()>;
    fn read_start_array(&mut self) -> Result<()>;
    fn read_end_array(&mut self) -> Result<()>;

    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_binary_data(&mut self) -> Result<BsonBinary>;
    fn read_undefined(&mut self) -> Result<()>;
    fn read_object_id(&mut self) -> Result<BsonObjectId>;
    fn read_boolean(&mut self) -> Result<bool>;
    fn read_date_time(&mut self) -> Result<i64>;
    fn read_null(&mut self) -> Result<()>;
    /// Returns `(pattern, options)`.
    fn read_regular_expression(&mut self) -> Result<(String, String)>;
    fn read_db_pointer(&mut self) -> Result<BsonDbPointer>;
    fn read_javascript(&mut self) -> Result<String>;
    fn read_symbol(&mut self) -> Result<String>;
    /// Reads the code of a code-with-scope element; the reader is then
    /// positioned at the scope document.
    fn read_javascript_with_scope(&mut self) -> Result<String>;
    fn read_int32(&mut self) -> Result<i32>;
    fn read_timestamp(&mut self) -> Result<BsonTimestamp>;
    fn read_int64(&mut self) -> Result<i64>;
    fn read_decimal128(&mut self) -> Result<BsonDecimal128>;
    fn read_min_key(&mut self) -> Result<()>;
    fn read_max_key(&mut self) -> Result<()>;
}

/// Reads a whole document at the current position.
pub fn read_bson_document<R: BsonReader + ?Sized>(reader: &mut R) -> Result<Vec<(String, BsonValue)>> {
    reader.read_start_document()?;
    let mut fields = Vec::new();
    while reader.read_bson_type()? != BsonType::EndOfDocument {
        let name = reader.read_name()?;
        fields.push((name, read_bson_value(reader)?));
    }
    reader.read_end_document()?;
    Ok(fields)
}

/// Reads the value of the current element.
pub fn read_bson_value<R: BsonReader + ?Sized>(reader: &mut R) -> Result<BsonValue> {
    let typ = reader
        .current_bson_type()
        .ok_or_else(|| BsonError::InvalidState("no current element".into()))?;
    let value = match typ {
        BsonType::Double => BsonValue::Float(reader.read_double()?),
        BsonType::String => BsonValue::Str(reader.read_string()?),
        BsonType::Document => BsonValue::Document(read_bson_document(reader)?),
        BsonType::Array => {
            reader.read_start_array()?;
            let mut items = Vec::new();
            while reader.read_bson_type()? != BsonType::EndOfDocument {
                items.push(read_bson_value(reader)?);
            }
            reader.read_end_array()?;
            BsonValue::Array(items)
        }
        BsonType::Binary => BsonValue::Binary(reader.read_binary_data()?),
        BsonType::Undefined => {
            reader.read_undefined()?;
            BsonValue::Undefined
        }
        BsonType::ObjectId => BsonValue::ObjectId(reader.read_object_id()?),
        BsonType::Boolean => BsonValue::Boolean(reader.read_boolean()?),
        BsonType::DateTime => BsonValue::DateTime(reader.read_date_time()?),
        BsonType::Null => {
            reader.read_null()?;
            BsonValue::Null
        }
        BsonType::RegularExpression => {
            let (pattern, options) = reader.read_regular_expression()?;
            BsonValue::Regex(pattern, options)
        }
        BsonType::DbPointer => BsonValue::DbPointer(reader.read_db_pointer()?),
        BsonType::JavaScript => BsonValue::JavaScriptCode(BsonJavascriptCode {
            code: reader.read_javascript()?,
        }),
        BsonType::Symbol => BsonValue::Symbol(BsonSymbol {
            symbol: reader.read_symbol()?,
        }),
        BsonType::JavaScriptWithScope => {
            let code = reader.read_javascript_with_scope()?;
            let scope = read_bson_document(reader)?;
            BsonValue::JavaScriptCodeWithScope(BsonJavascriptCodeWithScope { code, scope })
        }
        BsonType::Int32 => BsonValue::Int32(reader.read_int32()?),
        BsonType::Timestamp => BsonValue::Timestamp(reader.read_timestamp()?),
        BsonType::Int64 => BsonValue::Int64(reader.read_int64()?),
        BsonType::Decimal128 => BsonValue::Decimal128(reader.read_decimal128()?),
        BsonType::MinKey => {
            reader.read_min_key()?;
            BsonValue::MinKey
        }
        BsonType::MaxKey => {
            reader.read_max_key()?;
            BsonValue::MaxKey
        }
        BsonType::EndOfDocument => {
            return Err(BsonError::InvalidState("no value at end of document".into()))
        }
    };
    Ok(value)
}
