//! Sidereal BigQuery - OTLP to flat row conversion.
//!
//! This crate flattens OpenTelemetry traces, metrics and logs into rows for a
//! columnar, schema-on-write store such as BigQuery:
//! - One row per span, metric data point or log record
//! - Resource and scope fields denormalised onto every row
//! - Attributes and nested collections encoded as canonical JSON text
//! - Fixed column order per signal, with deterministic defaults
//!
//! ## Architecture
//!
//! ```text
//! ExportTraceServiceRequest   ─┐
//! ExportMetricsServiceRequest ─┼→ convert → Vec<Row> → Exporter → RowInserter
//! ExportLogsServiceRequest    ─┘                        (table per signal)
//! ```
//!
//! The converters are pure functions and can be used without the exporter.
//! Streaming rows to the store, creating tables and batching are left to
//! the [`RowInserter`] implementation.

pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod row;
pub mod schema;

#[cfg(test)]
pub mod test_fixtures;

pub use config::ExporterConfig;
pub use convert::{encode_array, encode_attributes, logs_to_rows, metrics_to_rows, traces_to_rows};
pub use error::{ConfigError, ConvertError, ExportError, InsertError};
pub use export::{Exporter, MemoryInserter, RowInserter, Signal};
pub use row::{Row, RowValue};
