//! Lookups over a converted trace.
//!
//! Span IDs are assumed unique within a trace; nothing here checks it.

use std::collections::HashMap;

use crate::model::{Span, Trace};

/// First span whose ID equals `span_id` exactly.
pub fn find_span_by_id<'a>(trace: &'a Trace, span_id: &str) -> Option<&'a Span> {
    trace.spans.iter().find(|span| span.span_id == span_id)
}

/// Spans with a `CHILD_OF` reference to `parent_span_id`, in trace order.
pub fn find_child_spans<'a>(trace: &'a Trace, parent_span_id: &str) -> Vec<&'a Span> {
    trace
        .spans
        .iter()
        .filter(|span| span.parent_ids().any(|id| id == parent_span_id))
        .collect()
}

/// Spans without a parent in this trace: true roots plus orphans whose
/// parent was not returned by the backend.
pub fn root_spans(trace: &Trace) -> Vec<&Span> {
    trace
        .spans
        .iter()
        .filter(|span| {
            span.parent_ids()
                .all(|parent| find_span_by_id(trace, parent).is_none())
        })
        .collect()
}

/// Folds a span's tags into a map. Later duplicates overwrite earlier ones.
pub fn extract_attributes(span: &Span) -> HashMap<String, String> {
    let mut attrs = HashMap::with_capacity(span.tags.len());
    for tag in &span.tags {
        attrs.insert(tag.key.clone(), tag.value_text());
    }
    attrs
}
