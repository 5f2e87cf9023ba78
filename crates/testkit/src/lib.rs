//! JSON fixtures shaped like Tempo's `/api/traces/{id}` responses.

use serde_json::{Value, json};

pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";

/// One OTLP span with the given timestamps as decimal nanosecond strings.
pub fn otlp_span(span_id: &str, parent: Option<&str>, start_ns: &str, end_ns: &str) -> Value {
    let mut span = json!({
        "traceId": TRACE_ID,
        "spanId": span_id,
        "name": format!("op-{span_id}"),
        "kind": "SPAN_KIND_INTERNAL",
        "startTimeUnixNano": start_ns,
        "endTimeUnixNano": end_ns,
        "attributes": [],
        "status": {"code": "STATUS_CODE_UNSET"}
    });
    if let Some(parent) = parent {
        span["parentSpanId"] = json!(parent);
    }
    span
}

/// A batch whose resource names `service`, holding one scope per inner vector.
pub fn otlp_batch(service: &str, scopes: Vec<Vec<Value>>) -> Value {
    let scope_spans: Vec<Value> = scopes
        .into_iter()
        .enumerate()
        .map(|(i, spans)| {
            json!({
                "scope": {"name": format!("scope-{i}")},
                "spans": spans
            })
        })
        .collect();

    json!({
        "resource": {
            "attributes": [
                {"key": "service.name", "value": {"stringValue": service}},
                {"key": "service.version", "value": {"stringValue": "1.0.0"}}
            ]
        },
        "scopeSpans": scope_spans
    })
}

pub fn otlp_document(batches: Vec<Value>) -> Value {
    json!({ "batches": batches })
}

pub fn otlp_single_span(service: &str, span: Value) -> Value {
    otlp_document(vec![otlp_batch(service, vec![vec![span]])])
}

/// A small checkout trace: a root with two children, one of which has a child.
pub fn otlp_checkout_trace() -> Value {
    let mut root = otlp_span("AAAAAAAAAAE=", None, "1700000000000000000", "1700000000250000000");
    root["name"] = json!("POST /api/order/create");
    root["attributes"] = json!([
        {"key": "http.method", "value": {"stringValue": "POST"}},
        {"key": "http.status_code", "value": {"intValue": "200"}}
    ]);

    let mut validate = otlp_span(
        "AAAAAAAAAAI=",
        Some("AAAAAAAAAAE="),
        "1700000000010000000",
        "1700000000030000000",
    );
    validate["name"] = json!("validateOrder");

    let mut payment = otlp_span(
        "AAAAAAAAAAM=",
        Some("AAAAAAAAAAE="),
        "1700000000040000000",
        "1700000000200000000",
    );
    payment["name"] = json!("processPayment");
    payment["attributes"] = json!([
        {"key": "payment.method", "value": {"stringValue": "card"}},
        {"key": "payment.retry", "value": {"boolValue": false}}
    ]);

    let mut charge = otlp_span(
        "AAAAAAAAAAQ=",
        Some("AAAAAAAAAAM="),
        "1700000000050000000",
        "1700000000150500000",
    );
    charge["name"] = json!("chargeCard");

    otlp_document(vec![otlp_batch(
        "trace-demo-service",
        vec![vec![root, validate, payment, charge]],
    )])
}

/// A native Jaeger-style body: no `batches` key, so OTLP decoding rejects it.
pub fn jaeger_trace(trace_id: &str) -> Value {
    json!({
        "traceID": trace_id,
        "spans": [
            {
                "traceID": trace_id,
                "spanID": "00f067aa0ba902b7",
                "operationName": "GET /api/user/profile",
                "startTime": 1700000000000000i64,
                "duration": 1500,
                "tags": [{"key": "user.id", "type": "string", "value": "u-1"}],
                "references": [],
                "process": {"serviceName": "user-service", "tags": []}
            },
            {
                "traceID": trace_id,
                "spanID": "00f067aa0ba902b8",
                "operationName": "fetchPreferences",
                "startTime": 1700000000000200i64,
                "duration": 800,
                "tags": [{"key": "cache.hit", "type": "bool", "value": true}],
                "references": [
                    {"refType": "CHILD_OF", "traceID": trace_id, "spanID": "00f067aa0ba902b7"}
                ],
                "process": {"serviceName": "user-service", "tags": []}
            }
        ]
    })
}

pub fn jaeger_envelope(traces: Vec<Value>) -> Value {
    json!({ "data": traces })
}
