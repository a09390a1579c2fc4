//! Metric table schema.
//!
//! Supports all OTLP metric types: Gauge, Sum, Histogram, ExponentialHistogram,
//! Summary. A single table holds every type, discriminated by `metric_type`,
//! with value columns left null where the type does not define them.
//!
//! # Column groups
//!
//! **Core**: `name`, `description`, `unit`, `metric_type`, `start_timestamp`,
//! `timestamp`, `attributes`, `flags`
//!
//! **Number values**: `value_double` or `value_int` (mutually exclusive, Gauge/Sum)
//!
//! **Distribution values**: `sum`, `count`, `min`, `max` (histograms and summaries)
//!
//! **Aggregation**: `aggregation_temporality`, `is_monotonic` (Sum only)
//!
//! **Exponential buckets**: `scale`, `zero_count`, `positive_offset`,
//! `negative_offset` (ExponentialHistogram only). The positive bucket counts
//! go in `bucket_counts` and the negative ones in `negative_bucket_counts`,
//! each starting at its offset.
//!
//! **Collections** (JSON, `[]` when empty): `bucket_counts`,
//! `negative_bucket_counts`, `explicit_bounds`, `quantiles`, `exemplars`

use super::{Column, ColumnType};

/// Values stored in the `metric_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    /// Gauge: instantaneous measurement.
    Gauge,
    /// Sum: cumulative or delta counter.
    Sum,
    /// Histogram: explicit-bucket distribution.
    Histogram,
    /// ExponentialHistogram: base-2 exponential bucket distribution.
    ExponentialHistogram,
    /// Summary: quantile summary (legacy).
    Summary,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gauge => "GAUGE",
            Self::Sum => "SUM",
            Self::Histogram => "HISTOGRAM",
            Self::ExponentialHistogram => "EXPONENTIAL_HISTOGRAM",
            Self::Summary => "SUMMARY",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const METRICS_SCHEMA: [Column; 31] = [
    Column::required("name", ColumnType::String),
    Column::required("description", ColumnType::String),
    Column::required("unit", ColumnType::String),
    Column::required("metric_type", ColumnType::String),
    Column::required("start_timestamp", ColumnType::Timestamp),
    Column::required("timestamp", ColumnType::Timestamp),
    Column::required("attributes", ColumnType::Json),
    Column::required("flags", ColumnType::Int64),
    Column::nullable("value_double", ColumnType::Float64),
    Column::nullable("value_int", ColumnType::Int64),
    Column::nullable("sum", ColumnType::Float64),
    Column::nullable("count", ColumnType::Int64),
    Column::nullable("min", ColumnType::Float64),
    Column::nullable("max", ColumnType::Float64),
    Column::nullable("aggregation_temporality", ColumnType::String),
    Column::nullable("is_monotonic", ColumnType::Bool),
    Column::nullable("scale", ColumnType::Int64),
    Column::nullable("zero_count", ColumnType::Int64),
    Column::nullable("positive_offset", ColumnType::Int64),
    Column::nullable("negative_offset", ColumnType::Int64),
    Column::required("bucket_counts", ColumnType::Json),
    Column::required("negative_bucket_counts", ColumnType::Json),
    Column::required("explicit_bounds", ColumnType::Json),
    Column::required("quantiles", ColumnType::Json),
    Column::required("exemplars", ColumnType::Json),
    // Denormalised resource and scope
    Column::required("resource_attributes", ColumnType::Json),
    Column::required("resource_schema_url", ColumnType::String),
    Column::required("scope_name", ColumnType::String),
    Column::required("scope_version", ColumnType::String),
    Column::required("scope_attributes", ColumnType::Json),
    Column::required("scope_schema_url", ColumnType::String),
];

/// Columns of the metric table, in emission order.
pub fn metrics_schema() -> &'static [Column] {
    &METRICS_SCHEMA
}
