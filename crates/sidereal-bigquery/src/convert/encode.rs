//! Scalar and JSON encoding shared by every converter.
//!
//! Attribute maps encode as JSON objects with keys in sorted order so the
//! output is stable for a given input. Nested collections always go through
//! [`encode_array`], which is the only place the `[]` default is produced.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use opentelemetry_proto::tonic::common::v1::{any_value::Value as AnyValueKind, AnyValue, KeyValue};
use serde_json::{Map, Number, Value};

use crate::ConvertError;

/// Encoding of an attribute map with no entries.
pub const EMPTY_OBJECT: &str = "{}";

/// Encoding of a nested collection with no entries.
pub const EMPTY_ARRAY: &str = "[]";

/// Width of a trace identifier in bytes.
pub const TRACE_ID_LEN: usize = 16;

/// Width of a span identifier in bytes.
pub const SPAN_ID_LEN: usize = 8;

/// Encode an attribute list as a JSON object.
///
/// Keys are sorted; when a key repeats, the last value wins. Returns
/// [`EMPTY_OBJECT`] for an empty list.
///
/// # Errors
///
/// Returns [`ConvertError::UnsupportedValue`] if any value cannot be
/// represented in JSON (a non-finite double), naming the offending key.
pub fn encode_attributes(attrs: &[KeyValue]) -> Result<String, ConvertError> {
    if attrs.is_empty() {
        return Ok(EMPTY_OBJECT.to_owned());
    }
    let object = attributes_to_json(attrs)?;
    Ok(serde_json::to_string(&object)?)
}

/// Encode a sequence of already-converted JSON values as a JSON array.
///
/// Returns [`EMPTY_ARRAY`] when the sequence yields nothing, whether the
/// source collection was absent or present but empty.
///
/// # Errors
///
/// Propagates the first error yielded by `items`.
pub fn encode_array<I>(items: I) -> Result<String, ConvertError>
where
    I: IntoIterator<Item = Result<Value, ConvertError>>,
{
    let values = items.into_iter().collect::<Result<Vec<_>, _>>()?;
    if values.is_empty() {
        return Ok(EMPTY_ARRAY.to_owned());
    }
    Ok(serde_json::to_string(&values)?)
}

/// Convert an attribute list to a JSON object value with sorted keys.
pub(crate) fn attributes_to_json(attrs: &[KeyValue]) -> Result<Value, ConvertError> {
    attributes_to_json_at(None, attrs)
}

fn attributes_to_json_at(parent: Option<&str>, attrs: &[KeyValue]) -> Result<Value, ConvertError> {
    let mut sorted = BTreeMap::new();
    for kv in attrs {
        let path = match parent {
            Some(p) => format!("{p}.{}", kv.key),
            None => kv.key.clone(),
        };
        let value = match &kv.value {
            Some(v) => any_value_to_json(&path, v)?,
            None => Value::Null,
        };
        sorted.insert(kv.key.clone(), value);
    }
    Ok(Value::Object(sorted.into_iter().collect::<Map<_, _>>()))
}

/// Convert an `AnyValue` to JSON. `path` identifies the value in errors.
pub(crate) fn any_value_to_json(path: &str, value: &AnyValue) -> Result<Value, ConvertError> {
    Ok(match &value.value {
        Some(AnyValueKind::StringValue(s)) => Value::String(s.clone()),
        Some(AnyValueKind::BoolValue(b)) => Value::Bool(*b),
        Some(AnyValueKind::IntValue(i)) => Value::from(*i),
        Some(AnyValueKind::DoubleValue(d)) => finite_number(path, *d)?,
        Some(AnyValueKind::BytesValue(b)) => Value::String(BASE64.encode(b)),
        Some(AnyValueKind::ArrayValue(array)) => Value::Array(
            array
                .values
                .iter()
                .map(|v| any_value_to_json(path, v))
                .collect::<Result<_, _>>()?,
        ),
        Some(AnyValueKind::KvlistValue(kvlist)) => {
            attributes_to_json_at(Some(path), &kvlist.values)?
        }
        None => Value::Null,
    })
}

/// Convert a double to a JSON number, rejecting NaN and infinities.
pub(crate) fn finite_number(key: &str, value: f64) -> Result<Value, ConvertError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ConvertError::unsupported(key, format!("non-finite double {value}")))
}

/// Render an `AnyValue` as plain text.
///
/// Strings pass through unchanged, scalars use their display form, bytes
/// are base64 and arrays/maps are JSON. An absent value renders as an empty
/// string.
pub(crate) fn any_value_to_text(key: &str, value: Option<&AnyValue>) -> Result<String, ConvertError> {
    let Some(value) = value else {
        return Ok(String::new());
    };
    Ok(match &value.value {
        Some(AnyValueKind::StringValue(s)) => s.clone(),
        Some(AnyValueKind::BoolValue(b)) => b.to_string(),
        Some(AnyValueKind::IntValue(i)) => i.to_string(),
        Some(AnyValueKind::DoubleValue(d)) => d.to_string(),
        Some(AnyValueKind::BytesValue(b)) => BASE64.encode(b),
        Some(AnyValueKind::ArrayValue(_) | AnyValueKind::KvlistValue(_)) => {
            serde_json::to_string(&any_value_to_json(key, value)?)?
        }
        None => String::new(),
    })
}

/// Render an identifier as fixed-width lowercase hex.
///
/// An empty identifier renders as all zeros.
pub(crate) fn encode_id(
    field: &'static str,
    bytes: &[u8],
    width: usize,
) -> Result<String, ConvertError> {
    match bytes.len() {
        0 => Ok("0".repeat(width * 2)),
        len if len == width => Ok(hex::encode(bytes)),
        len => Err(ConvertError::InvalidId {
            field,
            expected: width,
            len,
        }),
    }
}

pub(crate) fn trace_id_hex(field: &'static str, bytes: &[u8]) -> Result<String, ConvertError> {
    encode_id(field, bytes, TRACE_ID_LEN)
}

pub(crate) fn span_id_hex(field: &'static str, bytes: &[u8]) -> Result<String, ConvertError> {
    encode_id(field, bytes, SPAN_ID_LEN)
}

/// Format Unix nanoseconds as RFC 3339 UTC text with nanosecond precision.
pub(crate) fn format_timestamp(unix_nanos: u64) -> String {
    let nanos = i64::try_from(unix_nanos).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp_nanos(nanos).to_rfc3339_opts(SecondsFormat::Nanos, true)
}
