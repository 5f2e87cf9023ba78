use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use owo_colors::OwoColorize;
use tempolens_core::model::{Span, Trace};
use tempolens_core::{extract_attributes, find_child_spans, format_duration, root_spans};

#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub color: bool,
}

pub fn render_trace_human(trace: &Trace, style: Style) -> String {
    let services: BTreeSet<&str> = trace
        .spans
        .iter()
        .map(|s| trace.service_name(s))
        .collect();
    let services = services.into_iter().collect::<Vec<_>>().join(",");

    let mut out = String::new();
    let _ = writeln!(
        out,
        "TRACE {} duration={} spans={} services={}",
        trace.trace_id,
        format_duration(trace_span_micros(trace)),
        trace.spans.len(),
        services
    );

    let mut seen = HashSet::new();
    for root in root_spans(trace) {
        render_node(&mut out, trace, root, 0, &mut seen, style);
    }
    // Spans caught in a reference cycle have no root; print them at the top.
    for span in &trace.spans {
        if !seen.contains(span.span_id.as_str()) {
            render_node(&mut out, trace, span, 0, &mut seen, style);
        }
    }
    out
}

pub fn render_span_human(trace: &Trace, span: &Span, children: &[&Span], style: Style) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "SPAN {} service={} name={} duration={} start={}",
        span.span_id,
        service_label(trace, span, style),
        span.operation_name,
        format_duration(span.duration),
        format_start(span.start_time)
    );

    let parents: Vec<&str> = span.parent_ids().collect();
    if !parents.is_empty() {
        let _ = writeln!(out, "parent={}", parents.join(","));
    }

    let attrs: BTreeMap<String, String> = extract_attributes(span).into_iter().collect();
    let _ = writeln!(out, "attrs={}", attrs.len());
    for (key, value) in &attrs {
        let _ = writeln!(out, "  {key}={value}");
    }

    out.push_str(&render_children_human(trace, children, style));
    out
}

pub fn render_children_human(trace: &Trace, children: &[&Span], style: Style) -> String {
    let mut out = String::new();
    for child in children {
        let _ = writeln!(
            out,
            "  {} {} ({}) span={}",
            service_label(trace, child, style),
            child.operation_name,
            format_duration(child.duration),
            child.span_id
        );
    }
    let _ = writeln!(out, "-- {} children --", children.len());
    out
}

fn render_node<'a>(
    out: &mut String,
    trace: &'a Trace,
    span: &'a Span,
    depth: usize,
    seen: &mut HashSet<&'a str>,
    style: Style,
) {
    if !seen.insert(span.span_id.as_str()) {
        return;
    }

    let indent = "  ".repeat(depth);
    let _ = writeln!(
        out,
        "{indent}{} {} ({}) start={} span={}",
        service_label(trace, span, style),
        span.operation_name,
        format_duration(span.duration),
        format_start(span.start_time),
        span.span_id
    );

    for child in find_child_spans(trace, &span.span_id) {
        render_node(out, trace, child, depth + 1, seen, style);
    }
}

fn service_label(trace: &Trace, span: &Span, style: Style) -> String {
    let name = trace.service_name(span);
    if style.color {
        name.cyan().to_string()
    } else {
        name.to_string()
    }
}

fn format_start(micros: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Micros, true))
        .unwrap_or_else(|| "-".to_string())
}

/// Wall-clock extent of the trace: earliest start to latest end.
fn trace_span_micros(trace: &Trace) -> i64 {
    let start = trace.spans.iter().map(|s| s.start_time).min();
    let end = trace
        .spans
        .iter()
        .map(|s| s.start_time.saturating_add(s.duration))
        .max();
    match (start, end) {
        (Some(start), Some(end)) => end.saturating_sub(start),
        _ => 0,
    }
}
