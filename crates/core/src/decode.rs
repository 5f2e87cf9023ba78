use serde::Deserialize;

use crate::convert::convert_otlp_to_jaeger;
use crate::error::{Result, TempolensError};
use crate::model::otlp::OtlpTrace;
use crate::model::{Trace, TraceResponse};

/// Bodies Tempo may send when it answers in Jaeger shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum JaegerBody {
    Envelope(TraceResponse),
    Trace(Trace),
}

/// Decodes a trace-by-ID response body into the unified model.
///
/// OTLP is tried first and converted when it holds at least one batch.
/// Otherwise the same body is decoded as Jaeger JSON as-is. A conversion
/// error after a successful OTLP decode is returned without falling back.
pub fn decode_trace_body(body: &[u8], trace_id: &str) -> Result<Trace> {
    let otlp_err = match serde_json::from_slice::<OtlpTrace>(body) {
        Ok(otlp) if !otlp.batches.is_empty() => {
            tracing::debug!(trace_id, batches = otlp.batches.len(), "decoded otlp body");
            return convert_otlp_to_jaeger(&otlp, trace_id);
        }
        Ok(_) => "document has no batches".to_string(),
        Err(e) => e.to_string(),
    };

    tracing::debug!(trace_id, reason = %otlp_err, "otlp decode rejected; trying jaeger");
    decode_jaeger_body(body, trace_id).map_err(|jaeger_err| {
        TempolensError::Parse(format!(
            "failed to parse tempo response: otlp: {otlp_err}; jaeger: {jaeger_err}"
        ))
    })
}

/// Decodes a Jaeger-shaped body without any conversion.
///
/// Accepts the `{"data": [...]}` envelope or a bare trace object. From an
/// envelope the trace matching `trace_id` wins, falling back to the first.
pub fn decode_jaeger_body(body: &[u8], trace_id: &str) -> Result<Trace> {
    let decoded: JaegerBody =
        serde_json::from_slice(body).map_err(|e| TempolensError::Parse(e.to_string()))?;

    match decoded {
        JaegerBody::Trace(trace) => Ok(trace),
        JaegerBody::Envelope(envelope) => {
            let mut traces = envelope.data;
            if traces.is_empty() {
                return Err(TempolensError::Parse(
                    "response envelope holds no traces".to_string(),
                ));
            }
            let idx = traces
                .iter()
                .position(|t| t.trace_id == trace_id)
                .unwrap_or(0);
            Ok(traces.swap_remove(idx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::UNKNOWN_SERVICE;

    fn bytes(v: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn decodes_and_converts_otlp() {
        let body = bytes(testkit::otlp_checkout_trace());
        let trace = decode_trace_body(&body, testkit::TRACE_ID).unwrap();
        assert_eq!(trace.spans.len(), 4);
        assert_eq!(trace.spans[0].process.service_name, "trace-demo-service");
        assert_eq!(trace.spans[0].duration, 250_000);
    }

    #[test]
    fn falls_back_to_bare_jaeger_trace() {
        let raw = testkit::jaeger_trace("abc");
        let body = bytes(raw.clone());

        let via_pipeline = decode_trace_body(&body, "abc").unwrap();
        let direct: Trace = serde_json::from_value(raw).unwrap();
        assert_eq!(via_pipeline, direct);
        assert_eq!(via_pipeline.spans.len(), 2);
    }

    #[test]
    fn falls_back_to_jaeger_envelope_and_picks_matching_trace() {
        let body = bytes(testkit::jaeger_envelope(vec![
            testkit::jaeger_trace("other"),
            testkit::jaeger_trace("wanted"),
        ]));
        let trace = decode_trace_body(&body, "wanted").unwrap();
        assert_eq!(trace.trace_id, "wanted");

        let trace = decode_trace_body(&body, "missing").unwrap();
        assert_eq!(trace.trace_id, "other");
    }

    #[test]
    fn empty_batches_fall_back_and_fail_when_not_jaeger() {
        let err = decode_trace_body(br#"{"batches": []}"#, "t").unwrap_err();
        assert!(matches!(err, TempolensError::Parse(_)));
        assert!(err.to_string().contains("no batches"));
    }

    #[test]
    fn empty_batches_with_jaeger_fields_decode_as_bare_trace() {
        let body = br#"{
            "batches": [],
            "traceID": "x",
            "spans": [{"traceID": "x", "spanID": "01", "operationName": "root",
                       "startTime": 5, "duration": 7,
                       "process": {"serviceName": "api"}}]
        }"#;

        let trace = decode_trace_body(body, "x").unwrap();
        let direct: Trace = serde_json::from_slice(body).unwrap();
        assert_eq!(trace, direct);
        assert_eq!(trace.spans[0].process.service_name, "api");
    }

    #[test]
    fn empty_envelope_is_a_parse_error() {
        let err = decode_trace_body(br#"{"data": []}"#, "t").unwrap_err();
        assert!(err.to_string().contains("no traces"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = decode_trace_body(b"<html>bad gateway</html>", "t").unwrap_err();
        assert!(matches!(err, TempolensError::Parse(_)));
    }

    #[test]
    fn conversion_errors_do_not_fall_back() {
        let body = bytes(testkit::otlp_single_span(
            "api",
            testkit::otlp_span("s1", None, "not-a-number", "2"),
        ));
        let err = decode_trace_body(&body, "t").unwrap_err();
        assert!(err.to_string().contains("startTimeUnixNano"));
    }

    #[test]
    fn batch_without_resource_uses_unknown_service() {
        let body = br#"{"batches":[{"scopeSpans":[{"spans":[
            {"spanId":"a","name":"x","startTimeUnixNano":"10","endTimeUnixNano":"20"}
        ]}]}]}"#;
        let trace = decode_trace_body(body, "t").unwrap();
        assert_eq!(trace.spans[0].process.service_name, UNKNOWN_SERVICE);
    }
}
