//! Jaeger-style trace model. This is the unified in-memory shape every query
//! works on, and it serializes to the JSON consumed by Jaeger UIs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::null_as_default;

pub const CHILD_OF: &str = "CHILD_OF";

/// Query-by-ID response envelope. A lookup is expected to yield one trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<Trace>,
}

impl TraceResponse {
    pub fn single(trace: Trace) -> Self {
        Self { data: vec![trace] }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "traceID", default)]
    pub trace_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub processes: BTreeMap<String, Process>,
}

impl Trace {
    /// Service that emitted `span`: the inline process first, then the
    /// `processes` entry named by `processID`. Empty when neither is set.
    pub fn service_name<'a>(&'a self, span: &'a Span) -> &'a str {
        if !span.process.service_name.is_empty() {
            return &span.process.service_name;
        }
        span.process_id
            .as_deref()
            .and_then(|id| self.processes.get(id))
            .map(|p| p.service_name.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    #[serde(rename = "traceID", default)]
    pub trace_id: String,
    #[serde(rename = "spanID", default)]
    pub span_id: String,
    #[serde(default)]
    pub operation_name: String,
    /// Microseconds since the epoch.
    #[serde(default)]
    pub start_time: i64,
    /// Microseconds. May be zero or negative when the source clock skewed.
    #[serde(default)]
    pub duration: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub process: Process,
    #[serde(rename = "processID", default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
}

impl Span {
    /// Span IDs this span declares as `CHILD_OF` parents.
    pub fn parent_ids(&self) -> impl Iterator<Item = &str> {
        self.references
            .iter()
            .filter(|r| r.ref_type == CHILD_OF)
            .map(|r| r.span_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    #[serde(rename = "type", default)]
    pub tag_type: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Tag {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tag_type: "string".to_string(),
            value: serde_json::Value::String(value.into()),
        }
    }

    /// The tag value as display text; `null` renders as the empty string.
    pub fn value_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "refType")]
    pub ref_type: String,
    #[serde(rename = "traceID", default)]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: String,
}

impl Reference {
    pub fn child_of(trace_id: impl Into<String>, parent_span_id: impl Into<String>) -> Self {
        Self {
            ref_type: CHILD_OF.to_string(),
            trace_id: trace_id.into(),
            span_id: parent_span_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    #[serde(default)]
    pub service_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_serializes_with_jaeger_field_names() {
        let span = Span {
            trace_id: "t1".into(),
            span_id: "s1".into(),
            operation_name: "GET /".into(),
            start_time: 10,
            duration: 5,
            tags: vec![Tag::string("http.method", "GET")],
            references: vec![Reference::child_of("t1", "s0")],
            process: Process {
                service_name: "api".into(),
                tags: vec![],
            },
            process_id: None,
        };

        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "traceID": "t1",
                "spanID": "s1",
                "operationName": "GET /",
                "startTime": 10,
                "duration": 5,
                "tags": [{"key": "http.method", "type": "string", "value": "GET"}],
                "references": [{"refType": "CHILD_OF", "traceID": "t1", "spanID": "s0"}],
                "process": {"serviceName": "api", "tags": []}
            })
        );
    }

    #[test]
    fn decodes_go_style_nulls_and_process_ids() {
        let trace: Trace = serde_json::from_value(serde_json::json!({
            "traceID": "abc",
            "spans": [{
                "traceID": "abc",
                "spanID": "01",
                "operationName": "root",
                "startTime": 1,
                "duration": 2,
                "tags": null,
                "references": null,
                "processID": "p1"
            }],
            "processes": {"p1": {"serviceName": "api", "tags": null}}
        }))
        .unwrap();

        assert!(trace.spans[0].tags.is_empty());
        assert!(trace.spans[0].references.is_empty());
        assert_eq!(trace.spans[0].process_id.as_deref(), Some("p1"));
        assert_eq!(trace.processes["p1"].service_name, "api");
    }

    #[test]
    fn service_name_prefers_inline_process_then_process_table() {
        let trace: Trace = serde_json::from_value(serde_json::json!({
            "traceID": "abc",
            "spans": [
                {"spanID": "01", "processID": "p1"},
                {"spanID": "02", "processID": "p1", "process": {"serviceName": "inline"}},
                {"spanID": "03", "processID": "missing"},
                {"spanID": "04"}
            ],
            "processes": {"p1": {"serviceName": "user-service"}}
        }))
        .unwrap();

        let names: Vec<&str> = trace.spans.iter().map(|s| trace.service_name(s)).collect();
        assert_eq!(names, ["user-service", "inline", "", ""]);
    }

    #[test]
    fn trace_requires_spans() {
        let res: Result<Trace, _> = serde_json::from_str(r#"{"traceID":"abc"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn tag_value_text_stringifies_loose_values() {
        let mut tag = Tag::string("k", "v");
        assert_eq!(tag.value_text(), "v");
        tag.value = serde_json::json!(42);
        assert_eq!(tag.value_text(), "42");
        tag.value = serde_json::json!(true);
        assert_eq!(tag.value_text(), "true");
        tag.value = serde_json::Value::Null;
        assert_eq!(tag.value_text(), "");
    }
}
