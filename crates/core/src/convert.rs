//! OTLP → Jaeger conversion.
//!
//! The service name is read from the first batch only; documents whose
//! batches come from different services are labelled with the first one.

use crate::error::{Result, TempolensError};
use crate::model::otlp::{AttributeValue, OtlpAttribute, OtlpSpan, OtlpTrace};
use crate::model::{Process, Reference, Span, Tag, Trace};
use crate::time::{nanos_to_micros, parse_unix_nanos};

pub const SERVICE_NAME_KEY: &str = "service.name";
pub const UNKNOWN_SERVICE: &str = "unknown-service";

/// Converts a decoded OTLP document into the unified trace model.
///
/// Span and trace IDs are copied verbatim, whatever encoding the backend used.
/// Every `CHILD_OF` reference points at `trace_id`, the ID that was asked for.
/// A malformed timestamp on any span fails the whole conversion.
pub fn convert_otlp_to_jaeger(source: &OtlpTrace, trace_id: &str) -> Result<Trace> {
    let process = resource_process(source);

    let spans = source
        .batches
        .iter()
        .flat_map(|batch| &batch.scope_spans)
        .flat_map(|scope| &scope.spans)
        .map(|span| convert_span(span, trace_id, &process))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        trace_id,
        batches = source.batches.len(),
        spans = spans.len(),
        service = %process.service_name,
        "converted otlp trace"
    );

    Ok(Trace {
        trace_id: trace_id.to_string(),
        spans,
        processes: Default::default(),
    })
}

fn resource_process(source: &OtlpTrace) -> Process {
    let attributes = source
        .batches
        .first()
        .map(|b| b.resource.attributes.as_slice())
        .unwrap_or_default();

    let service_name = attributes
        .iter()
        .find(|attr| attr.key == SERVICE_NAME_KEY)
        .map(|attr| effective_value(&attr.value))
        .unwrap_or_else(|| UNKNOWN_SERVICE.to_string());

    let tags = attributes
        .iter()
        .filter(|attr| attr.key != SERVICE_NAME_KEY)
        .map(attribute_to_tag)
        .collect();

    Process { service_name, tags }
}

fn convert_span(span: &OtlpSpan, trace_id: &str, process: &Process) -> Result<Span> {
    let start_ns = span_nanos(span, "startTimeUnixNano", &span.start_time_unix_nano)?;
    let end_ns = span_nanos(span, "endTimeUnixNano", &span.end_time_unix_nano)?;

    let references = if span.parent_span_id.is_empty() {
        Vec::new()
    } else {
        vec![Reference::child_of(trace_id, span.parent_span_id.as_str())]
    };

    Ok(Span {
        trace_id: trace_id.to_string(),
        span_id: span.span_id.clone(),
        operation_name: span.name.clone(),
        start_time: nanos_to_micros(start_ns),
        duration: end_ns.saturating_sub(start_ns) / 1_000,
        tags: span.attributes.iter().map(attribute_to_tag).collect(),
        references,
        process: process.clone(),
        process_id: None,
    })
}

fn span_nanos(span: &OtlpSpan, field: &str, raw: &str) -> Result<i64> {
    parse_unix_nanos(raw).map_err(|e| {
        TempolensError::Parse(format!("span {:?} ({}) {field}: {e}", span.span_id, span.name))
    })
}

fn attribute_to_tag(attr: &OtlpAttribute) -> Tag {
    Tag::string(attr.key.as_str(), effective_value(&attr.value))
}

/// Lossy string form used for every tag: booleans and unset values become `""`.
fn effective_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::String(s) => s.clone(),
        AttributeValue::Int(i) => i.to_string(),
        AttributeValue::Bool(_) | AttributeValue::Unset => String::new(),
    }
}
