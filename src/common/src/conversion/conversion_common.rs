use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use opentelemetry_proto::tonic::{
    common::v1::{AnyValue, InstrumentationScope, KeyValue, any_value::Value},
    resource::v1::Resource,
};
use serde_json::{Map, Value as JsonValue};

use super::conversion_influx::Tags;
use super::schema::{OTEL_LIBRARY_NAME, OTEL_LIBRARY_VERSION};

/// Format a float as the shortest decimal that round-trips, without exponent
///
/// `0.5` → `"0.5"`, `1.0` → `"1"`, `1e-7` → `"0.0000001"`. Non-finite values
/// render as `+Inf`, `-Inf` and `NaN`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else {
        value.to_string()
    }
}

/// Render an attribute value as a tag value
///
/// Scalars use their plain textual form, arrays and key-value lists are
/// rendered as JSON, bytes as standard base64 and unset values as "".
pub fn attribute_value_to_string(value: Option<&AnyValue>) -> String {
    match value.and_then(|v| v.value.as_ref()) {
        Some(Value::StringValue(s)) => s.clone(),
        Some(Value::BoolValue(b)) => b.to_string(),
        Some(Value::IntValue(i)) => i.to_string(),
        Some(Value::DoubleValue(d)) => format_float(*d),
        Some(Value::BytesValue(bytes)) => STANDARD.encode(bytes),
        Some(v @ (Value::ArrayValue(_) | Value::KvlistValue(_))) => {
            let json = value_to_json(v).to_string();
            tracing::debug!(json = %json, "Rendering structured attribute value as JSON");
            json
        }
        None => String::new(),
    }
}

fn any_value_to_json(value: &AnyValue) -> JsonValue {
    match &value.value {
        Some(v) => value_to_json(v),
        None => JsonValue::Null,
    }
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::StringValue(s) => JsonValue::String(s.clone()),
        Value::BoolValue(b) => JsonValue::Bool(*b),
        Value::IntValue(i) => JsonValue::Number((*i).into()),
        Value::DoubleValue(d) => serde_json::Number::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::BytesValue(bytes) => JsonValue::String(STANDARD.encode(bytes)),
        Value::ArrayValue(array) => {
            JsonValue::Array(array.values.iter().map(any_value_to_json).collect())
        }
        Value::KvlistValue(list) => {
            let mut map = Map::new();
            for kv in &list.values {
                let v = kv.value.as_ref().map(any_value_to_json).unwrap_or(JsonValue::Null);
                map.insert(kv.key.clone(), v);
            }
            JsonValue::Object(map)
        }
    }
}

/// Merge key-value attributes into tags, later keys overwriting earlier ones
///
/// Attributes with an empty key are dropped with a debug diagnostic naming
/// where they came from.
pub fn attributes_to_tags(attributes: &[KeyValue], mut tags: Tags, origin: &str) -> Tags {
    for kv in attributes {
        if kv.key.is_empty() {
            tracing::debug!(origin, "Dropping attribute with empty key");
            continue;
        }
        tags.insert(kv.key.clone(), attribute_value_to_string(kv.value.as_ref()));
    }
    tags
}

/// Add resource attributes to tags
pub fn resource_to_tags(resource: &Resource, tags: Tags) -> Tags {
    attributes_to_tags(&resource.attributes, tags, "resource")
}

/// Add instrumentation scope name and version to tags
pub fn scope_to_tags(scope: &InstrumentationScope, mut tags: Tags) -> Tags {
    if !scope.name.is_empty() {
        tags.insert(OTEL_LIBRARY_NAME.to_string(), scope.name.clone());
    }
    if !scope.version.is_empty() {
        tags.insert(OTEL_LIBRARY_VERSION.to_string(), scope.version.clone());
    }
    tags
}
