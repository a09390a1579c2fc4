//! Destination table schemas for telemetry signals.
//!
//! Each signal lands in one flat table. Resource and scope fields are
//! denormalised onto every row, and nested collections (attributes, events,
//! links, buckets, quantiles, exemplars) are stored as JSON text because the
//! destination has no nested-record support in streaming inserts.
//!
//! The column lists here are the source of truth for row shape: converters
//! emit columns in exactly this order.

pub mod logs;
pub mod metrics;
pub mod traces;

pub use logs::logs_schema;
pub use metrics::{metrics_schema, MetricType};
pub use traces::traces_schema;

/// Destination column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// UTF-8 text.
    String,
    /// UTF-8 text holding a JSON document.
    Json,
    /// RFC 3339 timestamp text.
    Timestamp,
    Int64,
    Float64,
    Bool,
}

impl ColumnType {
    /// Destination type name used in table definitions.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String | Self::Json => "STRING",
            Self::Timestamp => "TIMESTAMP",
            Self::Int64 => "INT64",
            Self::Float64 => "FLOAT64",
            Self::Bool => "BOOL",
        }
    }
}

/// A single column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub(crate) const fn required(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub(crate) const fn nullable(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Look up a column by name.
pub fn column<'a>(schema: &'a [Column], name: &str) -> Option<&'a Column> {
    schema.iter().find(|c| c.name == name)
}
