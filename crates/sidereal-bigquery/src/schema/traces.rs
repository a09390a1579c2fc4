//! Trace table schema. One row per span.

use super::{Column, ColumnType};

const TRACES_SCHEMA: [Column; 23] = [
    Column::required("name", ColumnType::String),
    Column::required("kind", ColumnType::String),
    Column::required("start_time", ColumnType::Timestamp),
    Column::required("end_time", ColumnType::Timestamp),
    Column::required("status_code", ColumnType::String),
    Column::required("status_message", ColumnType::String),
    Column::required("trace_id", ColumnType::String),
    Column::required("span_id", ColumnType::String),
    Column::required("parent_span_id", ColumnType::String),
    Column::required("trace_state", ColumnType::String),
    Column::required("dropped_attributes_count", ColumnType::Int64),
    Column::required("dropped_events_count", ColumnType::Int64),
    Column::required("dropped_links_count", ColumnType::Int64),
    Column::required("flags", ColumnType::Int64),
    Column::required("attributes", ColumnType::Json),
    Column::required("events", ColumnType::Json),
    Column::required("links", ColumnType::Json),
    // Denormalised resource and scope
    Column::required("resource_attributes", ColumnType::Json),
    Column::required("resource_schema_url", ColumnType::String),
    Column::required("scope_name", ColumnType::String),
    Column::required("scope_version", ColumnType::String),
    Column::required("scope_attributes", ColumnType::Json),
    Column::required("scope_schema_url", ColumnType::String),
];

/// Columns of the trace table, in emission order.
pub fn traces_schema() -> &'static [Column] {
    &TRACES_SCHEMA
}
