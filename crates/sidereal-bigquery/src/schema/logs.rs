//! Log table schema. One row per log record.

use super::{Column, ColumnType};

const LOGS_SCHEMA: [Column; 16] = [
    Column::required("timestamp", ColumnType::Timestamp),
    Column::required("observed_timestamp", ColumnType::Timestamp),
    Column::required("severity_number", ColumnType::Int64),
    Column::required("severity_text", ColumnType::String),
    Column::required("body", ColumnType::String),
    Column::required("trace_id", ColumnType::String),
    Column::required("span_id", ColumnType::String),
    Column::required("flags", ColumnType::Int64),
    Column::required("dropped_attributes_count", ColumnType::Int64),
    Column::required("attributes", ColumnType::Json),
    // Denormalised resource and scope
    Column::required("resource_attributes", ColumnType::Json),
    Column::required("resource_schema_url", ColumnType::String),
    Column::required("scope_name", ColumnType::String),
    Column::required("scope_version", ColumnType::String),
    Column::required("scope_attributes", ColumnType::Json),
    Column::required("scope_schema_url", ColumnType::String),
];

/// Columns of the log table, in emission order.
pub fn logs_schema() -> &'static [Column] {
    &LOGS_SCHEMA
}
