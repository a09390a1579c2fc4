//! Composable test fixtures using rstest.
//!
//! Batch generators build small but fully populated OTLP requests; the
//! fixtures wrap them for injection into `#[rstest]` tests.
//!
//! ```text
//! generate_traces(n)            -> trace_batch
//! generate_metrics_all_types()  -> metrics_batch
//! generate_logs(n)              -> log_batch
//! memory_exporter               (default tables, in-memory inserter)
//! ```

use opentelemetry_proto::tonic::collector::{
    logs::v1::ExportLogsServiceRequest, metrics::v1::ExportMetricsServiceRequest,
    trace::v1::ExportTraceServiceRequest,
};
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue, InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs, SeverityNumber};
use opentelemetry_proto::tonic::metrics::v1::{
    exponential_histogram_data_point::Buckets, metric, number_data_point,
    summary_data_point::ValueAtQuantile, AggregationTemporality, ExponentialHistogram,
    ExponentialHistogramDataPoint, Gauge, Histogram, HistogramDataPoint, Metric, NumberDataPoint,
    ResourceMetrics, ScopeMetrics, Sum, Summary, SummaryDataPoint,
};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::{span, ResourceSpans, ScopeSpans, Span};
use rstest::fixture;

use crate::config::ExporterConfig;
use crate::export::{Exporter, MemoryInserter};

/// 2020-02-11 20:26:12 UTC plus 321ns.
pub const TEST_START_TIME: u64 = 1_581_452_772_000_000_321;

/// 2020-02-11 20:26:13 UTC plus 789ns.
pub const TEST_END_TIME: u64 = 1_581_452_773_000_000_789;

/// Number of rows produced by [`generate_metrics_all_types`].
pub const ALL_TYPES_POINT_COUNT: usize = 6;

pub fn string_kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::StringValue(value.to_string())),
        }),
    }
}

fn test_resource() -> Resource {
    Resource {
        attributes: vec![
            string_kv("service.name", "test-service"),
            string_kv("resource-attr", "resource-attr-val-1"),
        ],
        ..Default::default()
    }
}

fn test_scope() -> InstrumentationScope {
    InstrumentationScope {
        name: "sidereal.test".to_string(),
        version: "0.1.0".to_string(),
        ..Default::default()
    }
}

/// A trace batch with `count` spans under one resource and scope.
///
/// Every span has one event; odd spans are children of the first span.
pub fn generate_traces(count: usize) -> ExportTraceServiceRequest {
    let spans = (0..count)
        .map(|i| {
            let index = u8::try_from(i % 256).unwrap();
            Span {
                trace_id: vec![0x01; 16],
                span_id: vec![index.wrapping_add(1); 8],
                parent_span_id: if i % 2 == 1 { vec![0x01; 8] } else { vec![] },
                name: format!("operationB-{i}"),
                kind: span::SpanKind::Server as i32,
                start_time_unix_nano: TEST_START_TIME,
                end_time_unix_nano: TEST_END_TIME,
                attributes: vec![string_kv("http.method", "GET")],
                events: vec![span::Event {
                    time_unix_nano: TEST_START_TIME,
                    name: "event-with-attr".to_string(),
                    attributes: vec![string_kv("span-event-attr", "span-event-attr-val")],
                    dropped_attributes_count: 2,
                }],
                ..Default::default()
            }
        })
        .collect();

    ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource: Some(test_resource()),
            scope_spans: vec![ScopeSpans {
                scope: Some(test_scope()),
                spans,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

fn metric(name: &str, data: metric::Data) -> Metric {
    Metric {
        name: name.to_string(),
        description: format!("{name} metric"),
        unit: "1".to_string(),
        data: Some(data),
        ..Default::default()
    }
}

fn number_point(value: number_data_point::Value) -> NumberDataPoint {
    NumberDataPoint {
        attributes: vec![string_kv("label-1", "label-value-1")],
        start_time_unix_nano: TEST_START_TIME,
        time_unix_nano: TEST_END_TIME,
        value: Some(value),
        ..Default::default()
    }
}

/// A metric batch with one data point of every metric type.
///
/// Contains an int gauge, a double gauge, a cumulative monotonic sum, a
/// histogram, an exponential histogram and a summary, in that order.
pub fn generate_metrics_all_types() -> ExportMetricsServiceRequest {
    let metrics = vec![
        metric(
            "gauge-int",
            metric::Data::Gauge(Gauge {
                data_points: vec![number_point(number_data_point::Value::AsInt(123))],
            }),
        ),
        metric(
            "gauge-double",
            metric::Data::Gauge(Gauge {
                data_points: vec![number_point(number_data_point::Value::AsDouble(1.23))],
            }),
        ),
        metric(
            "counter-int",
            metric::Data::Sum(Sum {
                data_points: vec![number_point(number_data_point::Value::AsInt(456))],
                aggregation_temporality: AggregationTemporality::Cumulative as i32,
                is_monotonic: true,
            }),
        ),
        metric(
            "histogram",
            metric::Data::Histogram(Histogram {
                data_points: vec![HistogramDataPoint {
                    start_time_unix_nano: TEST_START_TIME,
                    time_unix_nano: TEST_END_TIME,
                    count: 2,
                    sum: Some(15.0),
                    bucket_counts: vec![0, 1, 1],
                    explicit_bounds: vec![1.0, 10.0],
                    ..Default::default()
                }],
                aggregation_temporality: AggregationTemporality::Cumulative as i32,
            }),
        ),
        metric(
            "exponential-histogram",
            metric::Data::ExponentialHistogram(ExponentialHistogram {
                data_points: vec![ExponentialHistogramDataPoint {
                    start_time_unix_nano: TEST_START_TIME,
                    time_unix_nano: TEST_END_TIME,
                    count: 4,
                    sum: Some(7.5),
                    scale: 1,
                    zero_count: 1,
                    positive: Some(Buckets {
                        offset: 0,
                        bucket_counts: vec![1, 2],
                    }),
                    ..Default::default()
                }],
                aggregation_temporality: AggregationTemporality::Delta as i32,
            }),
        ),
        metric(
            "summary",
            metric::Data::Summary(Summary {
                data_points: vec![SummaryDataPoint {
                    start_time_unix_nano: TEST_START_TIME,
                    time_unix_nano: TEST_END_TIME,
                    count: 1,
                    sum: 15.0,
                    quantile_values: vec![ValueAtQuantile {
                        quantile: 0.5,
                        value: 15.0,
                    }],
                    ..Default::default()
                }],
            }),
        ),
    ];

    ExportMetricsServiceRequest {
        resource_metrics: vec![ResourceMetrics {
            resource: Some(test_resource()),
            scope_metrics: vec![ScopeMetrics {
                scope: Some(test_scope()),
                metrics,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

/// A log batch with `count` records under one resource and scope.
pub fn generate_logs(count: usize) -> ExportLogsServiceRequest {
    let log_records = (0..count)
        .map(|i| LogRecord {
            time_unix_nano: TEST_END_TIME,
            observed_time_unix_nano: TEST_END_TIME,
            severity_number: SeverityNumber::Info as i32,
            severity_text: "Info".to_string(),
            body: Some(AnyValue {
                value: Some(any_value::Value::StringValue(format!("log message {i}"))),
            }),
            attributes: vec![string_kv("app", "server")],
            trace_id: vec![0x01; 16],
            span_id: vec![0x02; 8],
            ..Default::default()
        })
        .collect();

    ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            resource: Some(test_resource()),
            scope_logs: vec![ScopeLogs {
                scope: Some(test_scope()),
                log_records,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

/// Two spans under one resource and scope.
#[fixture]
pub fn trace_batch() -> ExportTraceServiceRequest {
    generate_traces(2)
}

/// One data point of each metric type.
#[fixture]
pub fn metrics_batch() -> ExportMetricsServiceRequest {
    generate_metrics_all_types()
}

/// Three log records under one resource and scope.
#[fixture]
pub fn log_batch() -> ExportLogsServiceRequest {
    generate_logs(3)
}

/// Exporter with default table names writing to memory.
#[fixture]
pub fn memory_exporter() -> Exporter<MemoryInserter> {
    Exporter::new(ExporterConfig::default(), MemoryInserter::new())
}
