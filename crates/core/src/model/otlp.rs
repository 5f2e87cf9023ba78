//! OTLP/JSON trace documents as returned by Tempo's `/api/traces/{id}`.
//!
//! Only the fields the converter reads are modelled; everything else in the
//! document is ignored by serde.
//!
//! Attribute values are read strictly: an `intValue` that is not an integer
//! (or an integer string) fails the whole OTLP decode, and the body then
//! goes to the Jaeger fallback.

use serde::{Deserialize, Deserializer};

use super::{null_as_default, opt_text_or_number, text_or_number};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OtlpTrace {
    #[serde(alias = "resourceSpans", deserialize_with = "null_as_default")]
    pub batches: Vec<OtlpBatch>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtlpBatch {
    #[serde(default)]
    pub resource: OtlpResource,
    #[serde(
        default,
        alias = "instrumentationLibrarySpans",
        deserialize_with = "null_as_default"
    )]
    pub scope_spans: Vec<OtlpScopeSpans>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OtlpResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Vec<OtlpAttribute>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OtlpScopeSpans {
    #[serde(default, alias = "instrumentationLibrary")]
    pub scope: OtlpScope,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<OtlpSpan>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OtlpScope {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtlpSpan {
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub span_id: String,
    #[serde(default)]
    pub parent_span_id: String,
    #[serde(default)]
    pub name: String,
    /// Symbolic (`SPAN_KIND_SERVER`) rather than the enum ordinal.
    #[serde(default, deserialize_with = "text_or_number")]
    pub kind: String,
    /// Nanoseconds since the epoch, still in its decimal text form.
    #[serde(default, deserialize_with = "text_or_number")]
    pub start_time_unix_nano: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub end_time_unix_nano: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Vec<OtlpAttribute>,
    #[serde(default)]
    pub status: OtlpStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OtlpStatus {
    #[serde(default, deserialize_with = "text_or_number")]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OtlpAttribute {
    pub key: String,
    #[serde(default)]
    pub value: AttributeValue,
}

/// One OTLP `AnyValue`, narrowed to the variants the converter understands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Bool(bool),
    #[default]
    Unset,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnyValue {
    #[serde(default)]
    string_value: Option<String>,
    #[serde(default, deserialize_with = "opt_text_or_number")]
    int_value: Option<String>,
    #[serde(default)]
    bool_value: Option<bool>,
}

impl RawAnyValue {
    /// A non-empty string wins, then the integer, then the boolean.
    fn into_value(self) -> Result<AttributeValue, String> {
        match self {
            Self {
                string_value: Some(s),
                ..
            } if !s.is_empty() => Ok(AttributeValue::String(s)),
            Self {
                int_value: Some(i), ..
            } => i
                .parse::<i64>()
                .map(AttributeValue::Int)
                .map_err(|e| format!("invalid intValue {i:?}: {e}")),
            Self {
                bool_value: Some(b),
                ..
            } => Ok(AttributeValue::Bool(b)),
            Self {
                string_value: Some(s),
                ..
            } => Ok(AttributeValue::String(s)),
            _ => Ok(AttributeValue::Unset),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawAnyValue::deserialize(deserializer)?
            .into_value()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(json: serde_json::Value) -> AttributeValue {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn attribute_value_variants() {
        assert_eq!(
            value(serde_json::json!({"stringValue": "api"})),
            AttributeValue::String("api".into())
        );
        assert_eq!(
            value(serde_json::json!({"intValue": "42"})),
            AttributeValue::Int(42)
        );
        assert_eq!(
            value(serde_json::json!({"intValue": 7})),
            AttributeValue::Int(7)
        );
        assert_eq!(
            value(serde_json::json!({"boolValue": true})),
            AttributeValue::Bool(true)
        );
        assert_eq!(value(serde_json::json!({})), AttributeValue::Unset);
        assert_eq!(
            value(serde_json::json!({"doubleValue": 1.5})),
            AttributeValue::Unset
        );
    }

    #[test]
    fn empty_string_value_yields_to_int() {
        assert_eq!(
            value(serde_json::json!({"stringValue": "", "intValue": "3"})),
            AttributeValue::Int(3)
        );
        assert_eq!(
            value(serde_json::json!({"stringValue": ""})),
            AttributeValue::String(String::new())
        );
    }

    #[test]
    fn rejects_non_integer_int_value() {
        let res: Result<AttributeValue, _> =
            serde_json::from_value(serde_json::json!({"intValue": "4.5"}));
        assert!(res.is_err());
    }

    #[test]
    fn requires_batches_key() {
        let res: Result<OtlpTrace, _> = serde_json::from_str(r#"{"traceID":"abc","spans":[]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn accepts_resource_spans_spelling_and_numeric_fields() {
        let doc: OtlpTrace = serde_json::from_value(serde_json::json!({
            "resourceSpans": [{
                "resource": {"attributes": []},
                "instrumentationLibrarySpans": [{
                    "instrumentationLibrary": {"name": "lib"},
                    "spans": [{
                        "spanId": "AAAAAAAAAAE=",
                        "name": "op",
                        "kind": 2,
                        "startTimeUnixNano": 1700000000000000000u64,
                        "endTimeUnixNano": "1700000000005000000",
                        "status": {"code": "STATUS_CODE_OK"}
                    }]
                }]
            }]
        }))
        .unwrap();

        let span = &doc.batches[0].scope_spans[0].spans[0];
        assert_eq!(doc.batches[0].scope_spans[0].scope.name, "lib");
        assert_eq!(span.kind, "2");
        assert_eq!(span.start_time_unix_nano, "1700000000000000000");
        assert_eq!(span.end_time_unix_nano, "1700000000005000000");
        assert_eq!(span.status.code, "STATUS_CODE_OK");
        assert!(span.parent_span_id.is_empty());
    }
}
