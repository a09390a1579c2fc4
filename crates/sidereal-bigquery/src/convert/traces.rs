//! Span flattening. One row per span.

use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::trace::v1::{
    span::{Event, Link, SpanKind},
    status::StatusCode,
    Span, Status,
};
use serde_json::{json, Value};

use super::encode::{
    attributes_to_json, encode_array, encode_attributes, format_timestamp, span_id_hex,
    trace_id_hex,
};
use super::{push_resource_scope, ResourceFields, ScopeFields};
use crate::row::Row;
use crate::schema::traces_schema;
use crate::ConvertError;

/// Convert OTLP trace spans to rows.
///
/// Returns one row per span in resource, scope, span order. An empty request
/// yields an empty vector.
///
/// # Errors
///
/// Returns an error if an attribute value cannot be JSON-encoded or an
/// identifier has an invalid length.
pub fn traces_to_rows(request: &ExportTraceServiceRequest) -> Result<Vec<Row>, ConvertError> {
    let capacity: usize = request
        .resource_spans
        .iter()
        .flat_map(|rs| &rs.scope_spans)
        .map(|ss| ss.spans.len())
        .sum();

    let mut rows = Vec::with_capacity(capacity);
    if capacity == 0 {
        return Ok(rows);
    }

    for resource_spans in &request.resource_spans {
        let resource =
            ResourceFields::new(resource_spans.resource.as_ref(), &resource_spans.schema_url)?;

        for scope_spans in &resource_spans.scope_spans {
            let scope = ScopeFields::new(scope_spans.scope.as_ref(), &scope_spans.schema_url)?;

            for span in &scope_spans.spans {
                rows.push(span_row(span, &resource, &scope)?);
            }
        }
    }

    Ok(rows)
}

fn span_row(span: &Span, resource: &ResourceFields, scope: &ScopeFields) -> Result<Row, ConvertError> {
    let (status_code, status_message) = status_fields(span.status.as_ref());

    let mut row = Row::with_capacity(traces_schema().len());
    row.push("name", span.name.as_str());
    row.push("kind", span_kind_name(span.kind));
    row.push("start_time", format_timestamp(span.start_time_unix_nano));
    row.push("end_time", format_timestamp(span.end_time_unix_nano));
    row.push("status_code", status_code);
    row.push("status_message", status_message);
    row.push("trace_id", trace_id_hex("trace_id", &span.trace_id)?);
    row.push("span_id", span_id_hex("span_id", &span.span_id)?);
    row.push("parent_span_id", span_id_hex("parent_span_id", &span.parent_span_id)?);
    row.push("trace_state", span.trace_state.as_str());
    row.push("dropped_attributes_count", span.dropped_attributes_count);
    row.push("dropped_events_count", span.dropped_events_count);
    row.push("dropped_links_count", span.dropped_links_count);
    row.push("flags", span.flags);
    row.push("attributes", encode_attributes(&span.attributes)?);
    row.push("events", events_to_json(&span.events)?);
    row.push("links", links_to_json(&span.links)?);
    push_resource_scope(&mut row, resource, scope);
    Ok(row)
}

/// Span kind as its short name, e.g. `Server`.
fn span_kind_name(kind: i32) -> &'static str {
    match SpanKind::try_from(kind).unwrap_or(SpanKind::Unspecified) {
        SpanKind::Unspecified => "Unspecified",
        SpanKind::Internal => "Internal",
        SpanKind::Server => "Server",
        SpanKind::Client => "Client",
        SpanKind::Producer => "Producer",
        SpanKind::Consumer => "Consumer",
    }
}

/// Status code name and message. A missing status is `Unset`.
fn status_fields(status: Option<&Status>) -> (&'static str, &str) {
    let Some(status) = status else {
        return ("Unset", "");
    };
    let code = match StatusCode::try_from(status.code).unwrap_or(StatusCode::Unset) {
        StatusCode::Unset => "Unset",
        StatusCode::Ok => "Ok",
        StatusCode::Error => "Error",
    };
    (code, status.message.as_str())
}

/// Encode span events as a JSON array.
pub fn events_to_json(events: &[Event]) -> Result<String, ConvertError> {
    encode_array(events.iter().map(|e| -> Result<Value, ConvertError> {
        let attributes = attributes_to_json(&e.attributes)?;
        Ok(json!({
            "name": e.name,
            "timestamp": format_timestamp(e.time_unix_nano),
            "attributes": attributes,
            "dropped_attributes_count": e.dropped_attributes_count,
        }))
    }))
}

/// Encode span links as a JSON array.
pub fn links_to_json(links: &[Link]) -> Result<String, ConvertError> {
    encode_array(links.iter().map(|l| -> Result<Value, ConvertError> {
        let trace_id = trace_id_hex("links.trace_id", &l.trace_id)?;
        let span_id = span_id_hex("links.span_id", &l.span_id)?;
        let attributes = attributes_to_json(&l.attributes)?;
        Ok(json!({
            "trace_id": trace_id,
            "span_id": span_id,
            "trace_state": l.trace_state,
            "attributes": attributes,
            "dropped_attributes_count": l.dropped_attributes_count,
            "flags": l.flags,
        }))
    }))
}
