//! Log record flattening. One row per record.

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::logs::v1::LogRecord;

use super::encode::{
    any_value_to_text, encode_attributes, format_timestamp, span_id_hex, trace_id_hex,
};
use super::{push_resource_scope, ResourceFields, ScopeFields};
use crate::row::Row;
use crate::schema::logs_schema;
use crate::ConvertError;

/// Convert OTLP log records to rows.
///
/// Returns one row per record in resource, scope, record order. The body is
/// rendered as text whatever its variant: strings pass through, scalars use
/// their display form, bytes are base64 and structured bodies are JSON.
///
/// # Errors
///
/// Returns an error if an attribute or body value cannot be JSON-encoded or
/// an identifier has an invalid length.
pub fn logs_to_rows(request: &ExportLogsServiceRequest) -> Result<Vec<Row>, ConvertError> {
    let capacity: usize = request
        .resource_logs
        .iter()
        .flat_map(|rl| &rl.scope_logs)
        .map(|sl| sl.log_records.len())
        .sum();

    let mut rows = Vec::with_capacity(capacity);
    if capacity == 0 {
        return Ok(rows);
    }

    for resource_logs in &request.resource_logs {
        let resource =
            ResourceFields::new(resource_logs.resource.as_ref(), &resource_logs.schema_url)?;

        for scope_logs in &resource_logs.scope_logs {
            let scope = ScopeFields::new(scope_logs.scope.as_ref(), &scope_logs.schema_url)?;

            for log in &scope_logs.log_records {
                rows.push(log_row(log, &resource, &scope)?);
            }
        }
    }

    Ok(rows)
}

fn log_row(
    log: &LogRecord,
    resource: &ResourceFields,
    scope: &ScopeFields,
) -> Result<Row, ConvertError> {
    let mut row = Row::with_capacity(logs_schema().len());
    row.push("timestamp", format_timestamp(log.time_unix_nano));
    row.push("observed_timestamp", format_timestamp(log.observed_time_unix_nano));
    row.push("severity_number", log.severity_number);
    row.push("severity_text", log.severity_text.as_str());
    row.push("body", any_value_to_text("body", log.body.as_ref())?);
    row.push("trace_id", trace_id_hex("trace_id", &log.trace_id)?);
    row.push("span_id", span_id_hex("span_id", &log.span_id)?);
    row.push("flags", log.flags);
    row.push("dropped_attributes_count", log.dropped_attributes_count);
    row.push("attributes", encode_attributes(&log.attributes)?);
    push_resource_scope(&mut row, resource, scope);
    Ok(row)
}
