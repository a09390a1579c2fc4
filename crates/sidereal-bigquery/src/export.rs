//! Routing converted rows to destination tables.
//!
//! [`Exporter`] converts one OTLP batch with the signal's converter and hands
//! the rows to a [`RowInserter`] under the configured table name. The inserter
//! is the seam for the streaming client; [`MemoryInserter`] keeps rows in
//! memory for tests and local use.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use opentelemetry_proto::tonic::collector::{
    logs::v1::ExportLogsServiceRequest, metrics::v1::ExportMetricsServiceRequest,
    trace::v1::ExportTraceServiceRequest,
};
use tokio::sync::Mutex;

use crate::config::ExporterConfig;
use crate::convert::{logs_to_rows, metrics_to_rows, traces_to_rows};
use crate::error::{ExportError, InsertError};
use crate::row::Row;

/// Telemetry signal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Trace spans.
    Traces,
    /// Metrics (gauges, sums, histograms, summaries).
    Metrics,
    /// Log records.
    Logs,
}

impl Signal {
    /// Get the string representation for use in log fields.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Traces => "traces",
            Self::Metrics => "metrics",
            Self::Logs => "logs",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Destination accepting rows for a named table.
#[async_trait]
pub trait RowInserter: Send + Sync {
    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), InsertError>;
}

/// Converts OTLP batches and inserts the rows.
#[derive(Debug)]
pub struct Exporter<I> {
    config: ExporterConfig,
    inserter: I,
}

impl<I: RowInserter> Exporter<I> {
    pub fn new(config: ExporterConfig, inserter: I) -> Self {
        Self { config, inserter }
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    pub fn inserter(&self) -> &I {
        &self.inserter
    }

    /// Convert and insert a trace batch, returning the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion or the insert fails.
    pub async fn push_traces(
        &self,
        request: &ExportTraceServiceRequest,
    ) -> Result<usize, ExportError> {
        let rows = traces_to_rows(request)?;
        self.insert(Signal::Traces, rows).await
    }

    /// Convert and insert a metric batch, returning the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion or the insert fails.
    pub async fn push_metrics(
        &self,
        request: &ExportMetricsServiceRequest,
    ) -> Result<usize, ExportError> {
        let rows = metrics_to_rows(request)?;
        self.insert(Signal::Metrics, rows).await
    }

    /// Convert and insert a log batch, returning the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion or the insert fails.
    pub async fn push_logs(&self, request: &ExportLogsServiceRequest) -> Result<usize, ExportError> {
        let rows = logs_to_rows(request)?;
        self.insert(Signal::Logs, rows).await
    }

    async fn insert(&self, signal: Signal, rows: Vec<Row>) -> Result<usize, ExportError> {
        let table = self.config.table(signal);

        if rows.is_empty() {
            tracing::debug!(signal = %signal, table = %table, "No rows to insert, skipping");
            return Ok(0);
        }

        let count = rows.len();
        match self.inserter.insert_rows(table, rows).await {
            Ok(()) => {
                tracing::debug!(signal = %signal, table = %table, rows = count, "Inserted rows");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(
                    signal = %signal,
                    table = %table,
                    rows = count,
                    error = %e,
                    "Row insert failed"
                );
                Err(ExportError::Insert {
                    table: table.to_owned(),
                    source: e,
                })
            }
        }
    }
}

/// Inserter that keeps rows in memory, keyed by table.
#[derive(Debug, Clone, Default)]
pub struct MemoryInserter {
    tables: Arc<Mutex<HashMap<String, Vec<Row>>>>,
}

impl MemoryInserter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows inserted into a table so far, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.tables.lock().await;
        tables.get(table).cloned().unwrap_or_default()
    }

    /// Names of tables that have received rows.
    pub async fn tables(&self) -> Vec<String> {
        let tables = self.tables.lock().await;
        let mut names: Vec<_> = tables.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl RowInserter for MemoryInserter {
    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), InsertError> {
        let mut tables = self.tables.lock().await;
        tables.entry(table.to_string()).or_default().extend(rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::TableConfig;
    use crate::test_fixtures::{
        generate_logs, generate_traces, log_batch, memory_exporter, metrics_batch, trace_batch,
        ALL_TYPES_POINT_COUNT,
    };

    struct RejectingInserter;

    #[async_trait]
    impl RowInserter for RejectingInserter {
        async fn insert_rows(&self, table: &str, _rows: Vec<Row>) -> Result<(), InsertError> {
            Err(InsertError::TableNotFound(table.to_string()))
        }
    }

    #[test]
    fn signal_names() {
        assert_eq!(Signal::Traces.to_string(), "traces");
        assert_eq!(Signal::Metrics.as_str(), "metrics");
        assert_eq!(Signal::Logs.as_str(), "logs");
    }

    #[rstest]
    #[tokio::test]
    async fn push_routes_rows_to_default_tables(
        memory_exporter: Exporter<MemoryInserter>,
        trace_batch: ExportTraceServiceRequest,
        metrics_batch: ExportMetricsServiceRequest,
        log_batch: ExportLogsServiceRequest,
    ) {
        let exporter = memory_exporter;

        assert_eq!(exporter.push_traces(&trace_batch).await.unwrap(), 2);
        assert_eq!(
            exporter.push_metrics(&metrics_batch).await.unwrap(),
            ALL_TYPES_POINT_COUNT
        );
        assert_eq!(exporter.push_logs(&log_batch).await.unwrap(), 3);

        let inserter = exporter.inserter();
        assert_eq!(inserter.rows("trace").await.len(), 2);
        assert_eq!(inserter.rows("metric").await.len(), ALL_TYPES_POINT_COUNT);
        assert_eq!(inserter.rows("log").await.len(), 3);
        assert_eq!(inserter.tables().await, ["log", "metric", "trace"]);
    }

    #[rstest]
    #[tokio::test]
    async fn inserted_rows_match_converter_output(
        memory_exporter: Exporter<MemoryInserter>,
        log_batch: ExportLogsServiceRequest,
    ) {
        memory_exporter.push_logs(&log_batch).await.unwrap();

        let expected = logs_to_rows(&log_batch).unwrap();
        assert_eq!(memory_exporter.inserter().rows("log").await, expected);
    }

    #[tokio::test]
    async fn push_uses_configured_table_names() {
        let mut config = ExporterConfig::default();
        config.dataset.table = TableConfig {
            trace: "spans".to_string(),
            metric: "points".to_string(),
            log: "records".to_string(),
        };
        let exporter = Exporter::new(config, MemoryInserter::new());

        exporter.push_traces(&generate_traces(1)).await.unwrap();
        exporter.push_logs(&generate_logs(1)).await.unwrap();

        assert_eq!(exporter.inserter().tables().await, ["records", "spans"]);
    }

    #[tokio::test]
    async fn pushes_accumulate_per_table() {
        let exporter = Exporter::new(ExporterConfig::default(), MemoryInserter::new());

        exporter.push_traces(&generate_traces(2)).await.unwrap();
        exporter.push_traces(&generate_traces(5)).await.unwrap();

        assert_eq!(exporter.inserter().rows("trace").await.len(), 7);
    }

    #[tokio::test]
    async fn empty_batches_are_not_inserted() {
        let exporter = Exporter::new(ExporterConfig::default(), RejectingInserter);

        let traces = ExportTraceServiceRequest {
            resource_spans: vec![],
        };
        let metrics = ExportMetricsServiceRequest {
            resource_metrics: vec![],
        };
        let logs = ExportLogsServiceRequest {
            resource_logs: vec![],
        };

        assert_eq!(exporter.push_traces(&traces).await.unwrap(), 0);
        assert_eq!(exporter.push_metrics(&metrics).await.unwrap(), 0);
        assert_eq!(exporter.push_logs(&logs).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_failure_names_table() {
        let exporter = Exporter::new(ExporterConfig::default(), RejectingInserter);

        let err = exporter.push_logs(&generate_logs(1)).await.unwrap_err();
        match err {
            ExportError::Insert { table, source } => {
                assert_eq!(table, "log");
                assert!(matches!(source, InsertError::TableNotFound(_)));
            }
            other => panic!("expected insert error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn conversion_failure_skips_insert() {
        let exporter = Exporter::new(ExporterConfig::default(), MemoryInserter::new());

        let mut request = generate_traces(1);
        request.resource_spans[0].scope_spans[0].spans[0].trace_id = vec![1, 2, 3];

        let err = exporter.push_traces(&request).await.unwrap_err();
        assert!(matches!(err, ExportError::Convert(_)));
        assert!(exporter.inserter().tables().await.is_empty());
    }
}
