//! Error types for the BigQuery row pipeline.

/// Errors raised while flattening a telemetry batch into rows.
///
/// Well-formed OTLP never produces these. They surface values that have
/// no faithful representation in the destination schema.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A value that cannot be encoded as JSON, such as a NaN double.
    #[error("unsupported value for key {key:?}: {reason}")]
    UnsupportedValue {
        /// Attribute key or column name holding the value.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A trace or span identifier with an impossible byte length.
    #[error("invalid {field}: expected {expected} bytes, got {len}")]
    InvalidId {
        /// Field name, e.g. `trace_id`.
        field: &'static str,
        /// Required identifier width in bytes.
        expected: usize,
        /// Actual byte length received.
        len: usize,
    },

    /// JSON encoding error.
    #[error("JSON encode error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl ConvertError {
    pub(crate) fn unsupported(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by a [`RowInserter`](crate::export::RowInserter).
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    /// The destination table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The destination rejected some or all rows.
    #[error("{rejected} of {total} rows rejected: {message}")]
    Rejected {
        /// Number of rows the destination refused.
        rejected: usize,
        /// Number of rows sent.
        total: usize,
        /// Message reported by the destination.
        message: String,
    },

    /// Transport or backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors from pushing a batch through the [`Exporter`](crate::export::Exporter).
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The batch could not be converted to rows.
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    /// The rows could not be inserted.
    #[error("insert into {table} failed: {source}")]
    Insert {
        table: String,
        #[source]
        source: InsertError,
    },
}

/// Configuration loading error.
#[derive(Debug, thiserror::Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);
