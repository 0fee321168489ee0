//! JSON view of documents.
//!
//! [`Value::to_json`] renders relaxed Extended JSON: numbers, strings,
//! booleans, arrays and documents map directly, everything else uses the
//! `$`-prefixed wrapper forms (`{"$oid": …}`, `{"$binary": …}`, …). Dates in
//! years 1970 through 9999 are ISO-8601 strings, others fall back to
//! `{"$date": {"$numberLong": …}}`.
//! Converting from plain JSON is lossless in the other direction: integers
//! become `Int32` when they fit and `Int64` otherwise.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dbdoc_bson::{BsonBinary, BsonDecimal128};
use serde_json::{json, Map, Value as JsonValue};

use crate::document::Document;
use crate::value::Value;

impl Value {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Ref(db_ref) => {
                let mut obj = Map::new();
                obj.insert("$ref".into(), JsonValue::String(db_ref.namespace.clone()));
                obj.insert("$id".into(), db_ref.id.to_json());
                if let Some(db) = &db_ref.database {
                    obj.insert("$db".into(), JsonValue::String(db.clone()));
                }
                JsonValue::Object(obj)
            }
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Document(doc) => doc.to_json(),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::CodeWithScope(cws) => json!({
                "$code": cws.code,
                "$scope": cws.scope.to_json(),
            }),
            Value::Bytes(bytes) => binary_json(&BsonBinary::new(bytes.clone())),
            Value::Symbol(s) => json!({ "$symbol": s }),
            Value::Double(f) => double_json(*f),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::ObjectId(id) => json!({ "$oid": id.to_hex() }),
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::DateTime(ms) => date_json(*ms),
            Value::Regex { pattern, options } => json!({
                "$regularExpression": { "pattern": pattern, "options": options }
            }),
            Value::Code(code) => json!({ "$code": code }),
            Value::Int32(i) => JsonValue::from(*i),
            Value::Timestamp(ts) => json!({
                "$timestamp": { "t": ts.timestamp as u32, "i": ts.increment as u32 }
            }),
            Value::Int64(i) => JsonValue::from(*i),
            Value::Decimal128(d) => json!({ "$numberDecimal": decimal128_to_string(d) }),
            Value::MinKey => json!({ "$minKey": 1 }),
            Value::MaxKey => json!({ "$maxKey": 1 }),
            Value::Undefined => json!({ "$undefined": true }),
            Value::Binary(binary) => binary_json(binary),
            Value::Uuid(uuid) => json!({ "$uuid": uuid.hyphenated().to_string() }),
            Value::Bson(bson) => Value::from_bson(bson.clone()).to_json(),
        }
    }
}

impl Document {
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => Value::Int32(small),
                        Err(_) => Value::Int64(i),
                    }
                } else {
                    Value::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(obj) => Value::Document(obj.into_iter().collect()),
        }
    }
}

impl From<Map<String, JsonValue>> for Document {
    fn from(obj: Map<String, JsonValue>) -> Self {
        obj.into_iter().collect()
    }
}

fn binary_json(binary: &BsonBinary) -> JsonValue {
    json!({
        "$binary": {
            "base64": STANDARD.encode(&binary.data),
            "subType": format!("{:02x}", binary.subtype),
        }
    })
}

fn double_json(f: f64) -> JsonValue {
    if f.is_nan() {
        json!({ "$numberDouble": "NaN" })
    } else if f.is_infinite() {
        let repr = if f > 0.0 { "Infinity" } else { "-Infinity" };
        json!({ "$numberDouble": repr })
    } else {
        JsonValue::from(f)
    }
}

/// First millisecond of the year 10000.
const MAX_ISO_DATE_MS: i64 = 253_402_300_800_000;

fn date_json(ms: i64) -> JsonValue {
    if !(0..MAX_ISO_DATE_MS).contains(&ms) {
        return json!({ "$date": { "$numberLong": ms.to_string() } });
    }
    let (days, day_ms) = (ms.div_euclid(86_400_000), ms.rem_euclid(86_400_000));
    let (year, month, day) = civil_from_days(days);
    let secs = day_ms / 1000;
    json!({
        "$date": format!(
            "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
            secs / 3600,
            secs / 60 % 60,
            secs % 60,
            day_ms % 1000
        )
    })
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

const DECIMAL128_EXPONENT_BIAS: i32 = 6176;
const DECIMAL128_MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999;

/// Decimal128 in the canonical string form of the BSON decimal128 rules.
fn decimal128_to_string(decimal: &BsonDecimal128) -> String {
    let Ok(bytes) = <[u8; 16]>::try_from(decimal.data.as_slice()) else {
        return "NaN".into();
    };
    let bits = u128::from_le_bytes(bytes);
    let sign = if bits >> 127 == 1 { "-" } else { "" };
    match (bits >> 122) & 0x1f {
        0x1f => return "NaN".into(),
        0x1e => return format!("{sign}Infinity"),
        _ => {}
    }
    let (biased, coefficient) = if (bits >> 125) & 0b11 == 0b11 {
        // Implied 0b100 prefix: always above the maximum coefficient.
        (((bits >> 111) & 0x3fff) as i32, 0)
    } else {
        (((bits >> 113) & 0x3fff) as i32, bits & ((1u128 << 113) - 1))
    };
    let coefficient = if coefficient > DECIMAL128_MAX_COEFFICIENT {
        0
    } else {
        coefficient
    };
    let exponent = biased - DECIMAL128_EXPONENT_BIAS;
    let digits = coefficient.to_string();
    let adjusted = exponent + digits.len() as i32 - 1;

    if exponent <= 0 && adjusted >= -6 {
        if exponent == 0 {
            return format!("{sign}{digits}");
        }
        let point = digits.len() as i32 + exponent;
        if point > 0 {
            let (int, frac) = digits.split_at(point as usize);
            format!("{sign}{int}.{frac}")
        } else {
            format!("{sign}0.{}{digits}", "0".repeat((-point) as usize))
        }
    } else {
        let (first, rest) = digits.split_at(1);
        let dot = if rest.is_empty() { "" } else { "." };
        let exp_sign = if adjusted >= 0 { "+" } else { "" };
        format!("{sign}{first}{dot}{rest}E{exp_sign}{adjusted}")
    }
}
