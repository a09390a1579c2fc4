//! Metric flattening. One row per data point.
//!
//! Every metric type shares one row shape. A single match over the metric's
//! data variant fills a [`PointColumns`] with the values that variant defines;
//! everything else keeps its default (null scalars, empty collections), so
//! the per-variant code never has to spell out the columns it leaves unset.

use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::common::v1::KeyValue;
use opentelemetry_proto::tonic::metrics::v1::{
    exemplar, exponential_histogram_data_point::Buckets, metric::Data, number_data_point,
    summary_data_point::ValueAtQuantile, AggregationTemporality, Exemplar,
    ExponentialHistogramDataPoint, HistogramDataPoint, Metric, NumberDataPoint, SummaryDataPoint,
};
use serde_json::{json, Map, Value};

use super::encode::{
    attributes_to_json, encode_array, encode_attributes, finite_number, format_timestamp,
    span_id_hex, trace_id_hex,
};
use super::{push_resource_scope, ResourceFields, ScopeFields};
use crate::row::Row;
use crate::schema::{metrics_schema, MetricType};
use crate::ConvertError;

/// Convert OTLP metrics to rows.
///
/// Returns one row per data point in resource, scope, metric, point order.
/// Metrics without data points, or without a data variant, contribute no
/// rows.
///
/// # Errors
///
/// Returns an error if an attribute, bound, quantile or exemplar value cannot
/// be JSON-encoded, or an exemplar identifier has an invalid length.
pub fn metrics_to_rows(request: &ExportMetricsServiceRequest) -> Result<Vec<Row>, ConvertError> {
    let capacity: usize = request
        .resource_metrics
        .iter()
        .flat_map(|rm| &rm.scope_metrics)
        .flat_map(|sm| &sm.metrics)
        .map(count_metric_data_points)
        .sum();

    let mut rows = Vec::with_capacity(capacity);
    if capacity == 0 {
        return Ok(rows);
    }

    for resource_metrics in &request.resource_metrics {
        let resource = ResourceFields::new(
            resource_metrics.resource.as_ref(),
            &resource_metrics.schema_url,
        )?;

        for scope_metrics in &resource_metrics.scope_metrics {
            let scope =
                ScopeFields::new(scope_metrics.scope.as_ref(), &scope_metrics.schema_url)?;

            for metric in &scope_metrics.metrics {
                append_metric_rows(&mut rows, metric, &resource, &scope)?;
            }
        }
    }

    Ok(rows)
}

fn count_metric_data_points(metric: &Metric) -> usize {
    match &metric.data {
        Some(Data::Gauge(g)) => g.data_points.len(),
        Some(Data::Sum(s)) => s.data_points.len(),
        Some(Data::Histogram(h)) => h.data_points.len(),
        Some(Data::ExponentialHistogram(e)) => e.data_points.len(),
        Some(Data::Summary(s)) => s.data_points.len(),
        None => 0,
    }
}

/// Column values for one data point.
#[derive(Debug, Default)]
struct PointColumns<'a> {
    start_time_unix_nano: u64,
    time_unix_nano: u64,
    attributes: &'a [KeyValue],
    flags: u32,
    value_double: Option<f64>,
    value_int: Option<i64>,
    sum: Option<f64>,
    count: Option<i64>,
    min: Option<f64>,
    max: Option<f64>,
    aggregation_temporality: Option<&'static str>,
    is_monotonic: Option<bool>,
    scale: Option<i64>,
    zero_count: Option<i64>,
    positive_offset: Option<i64>,
    negative_offset: Option<i64>,
    bucket_counts: &'a [u64],
    negative_bucket_counts: &'a [u64],
    explicit_bounds: &'a [f64],
    quantiles: &'a [ValueAtQuantile],
    exemplars: &'a [Exemplar],
}

impl<'a> PointColumns<'a> {
    fn number(dp: &'a NumberDataPoint) -> Self {
        let (value_double, value_int) = match dp.value {
            Some(number_data_point::Value::AsDouble(d)) => (Some(d), None),
            Some(number_data_point::Value::AsInt(i)) => (None, Some(i)),
            None => (None, None),
        };
        Self {
            start_time_unix_nano: dp.start_time_unix_nano,
            time_unix_nano: dp.time_unix_nano,
            attributes: &dp.attributes,
            flags: dp.flags,
            value_double,
            value_int,
            exemplars: &dp.exemplars,
            ..Self::default()
        }
    }

    fn histogram(dp: &'a HistogramDataPoint) -> Self {
        Self {
            start_time_unix_nano: dp.start_time_unix_nano,
            time_unix_nano: dp.time_unix_nano,
            attributes: &dp.attributes,
            flags: dp.flags,
            sum: Some(dp.sum.unwrap_or_default()),
            count: Some(saturating_i64(dp.count)),
            min: dp.min,
            max: dp.max,
            bucket_counts: &dp.bucket_counts,
            explicit_bounds: &dp.explicit_bounds,
            exemplars: &dp.exemplars,
            ..Self::default()
        }
    }

    /// Positive and negative buckets are kept apart, each with its own
    /// offset, so the bucket index of every count survives the flattening.
    fn exponential_histogram(dp: &'a ExponentialHistogramDataPoint) -> Self {
        let (positive_offset, bucket_counts) = split_buckets(dp.positive.as_ref());
        let (negative_offset, negative_bucket_counts) = split_buckets(dp.negative.as_ref());
        Self {
            start_time_unix_nano: dp.start_time_unix_nano,
            time_unix_nano: dp.time_unix_nano,
            attributes: &dp.attributes,
            flags: dp.flags,
            sum: Some(dp.sum.unwrap_or_default()),
            count: Some(saturating_i64(dp.count)),
            min: dp.min,
            max: dp.max,
            scale: Some(i64::from(dp.scale)),
            zero_count: Some(saturating_i64(dp.zero_count)),
            positive_offset: Some(positive_offset),
            negative_offset: Some(negative_offset),
            bucket_counts,
            negative_bucket_counts,
            exemplars: &dp.exemplars,
            ..Self::default()
        }
    }

    fn summary(dp: &'a SummaryDataPoint) -> Self {
        Self {
            start_time_unix_nano: dp.start_time_unix_nano,
            time_unix_nano: dp.time_unix_nano,
            attributes: &dp.attributes,
            flags: dp.flags,
            sum: Some(dp.sum),
            count: Some(saturating_i64(dp.count)),
            quantiles: &dp.quantile_values,
            ..Self::default()
        }
    }
}

fn append_metric_rows(
    rows: &mut Vec<Row>,
    metric: &Metric,
    resource: &ResourceFields,
    scope: &ScopeFields,
) -> Result<(), ConvertError> {
    let Some(data) = &metric.data else {
        return Ok(());
    };

    match data {
        Data::Gauge(gauge) => {
            for dp in &gauge.data_points {
                let point = PointColumns::number(dp);
                rows.push(metric_row(metric, MetricType::Gauge, point, resource, scope)?);
            }
        }
        Data::Sum(sum) => {
            let temporality = temporality_name(sum.aggregation_temporality);
            for dp in &sum.data_points {
                let point = PointColumns {
                    aggregation_temporality: Some(temporality),
                    is_monotonic: Some(sum.is_monotonic),
                    ..PointColumns::number(dp)
                };
                rows.push(metric_row(metric, MetricType::Sum, point, resource, scope)?);
            }
        }
        Data::Histogram(histogram) => {
            for dp in &histogram.data_points {
                let point = PointColumns::histogram(dp);
                rows.push(metric_row(metric, MetricType::Histogram, point, resource, scope)?);
            }
        }
        Data::ExponentialHistogram(histogram) => {
            for dp in &histogram.data_points {
                let point = PointColumns::exponential_histogram(dp);
                rows.push(metric_row(
                    metric,
                    MetricType::ExponentialHistogram,
                    point,
                    resource,
                    scope,
                )?);
            }
        }
        Data::Summary(summary) => {
            for dp in &summary.data_points {
                let point = PointColumns::summary(dp);
                rows.push(metric_row(metric, MetricType::Summary, point, resource, scope)?);
            }
        }
    }

    Ok(())
}

fn metric_row(
    metric: &Metric,
    metric_type: MetricType,
    point: PointColumns<'_>,
    resource: &ResourceFields,
    scope: &ScopeFields,
) -> Result<Row, ConvertError> {
    let mut row = Row::with_capacity(metrics_schema().len());
    row.push("name", metric.name.as_str());
    row.push("description", metric.description.as_str());
    row.push("unit", metric.unit.as_str());
    row.push("metric_type", metric_type.as_str());
    row.push("start_timestamp", format_timestamp(point.start_time_unix_nano));
    row.push("timestamp", format_timestamp(point.time_unix_nano));
    row.push("attributes", encode_attributes(point.attributes)?);
    row.push("flags", point.flags);
    row.push("value_double", point.value_double);
    row.push("value_int", point.value_int);
    row.push("sum", point.sum);
    row.push("count", point.count);
    row.push("min", point.min);
    row.push("max", point.max);
    row.push("aggregation_temporality", point.aggregation_temporality);
    row.push("is_monotonic", point.is_monotonic);
    row.push("scale", point.scale);
    row.push("zero_count", point.zero_count);
    row.push("positive_offset", point.positive_offset);
    row.push("negative_offset", point.negative_offset);
    row.push("bucket_counts", bucket_counts_to_json(point.bucket_counts)?);
    row.push(
        "negative_bucket_counts",
        bucket_counts_to_json(point.negative_bucket_counts)?,
    );
    row.push("explicit_bounds", explicit_bounds_to_json(point.explicit_bounds)?);
    row.push("quantiles", quantiles_to_json(point.quantiles)?);
    row.push("exemplars", exemplars_to_json(point.exemplars)?);
    push_resource_scope(&mut row, resource, scope);
    Ok(row)
}

/// Aggregation temporality as its short name, e.g. `Cumulative`.
fn temporality_name(temporality: i32) -> &'static str {
    match AggregationTemporality::try_from(temporality)
        .unwrap_or(AggregationTemporality::Unspecified)
    {
        AggregationTemporality::Unspecified => "Unspecified",
        AggregationTemporality::Delta => "Delta",
        AggregationTemporality::Cumulative => "Cumulative",
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Offset and dense counts of one side of an exponential histogram.
///
/// An absent side has offset 0 and no counts.
fn split_buckets(buckets: Option<&Buckets>) -> (i64, &[u64]) {
    buckets.map_or((0, &[][..]), |b| {
        (i64::from(b.offset), b.bucket_counts.as_slice())
    })
}

/// Encode histogram bucket counts as a JSON array of integers.
pub fn bucket_counts_to_json(counts: &[u64]) -> Result<String, ConvertError> {
    encode_array(counts.iter().map(|c| Ok(Value::from(*c))))
}

/// Encode histogram explicit bounds as a JSON array of numbers.
pub fn explicit_bounds_to_json(bounds: &[f64]) -> Result<String, ConvertError> {
    encode_array(bounds.iter().map(|b| finite_number("explicit_bounds", *b)))
}

/// Encode summary quantiles as a JSON array of `{quantile, value}` objects.
pub fn quantiles_to_json(quantiles: &[ValueAtQuantile]) -> Result<String, ConvertError> {
    encode_array(quantiles.iter().map(|q| -> Result<Value, ConvertError> {
        let quantile = finite_number("quantiles.quantile", q.quantile)?;
        let value = finite_number("quantiles.value", q.value)?;
        Ok(json!({ "quantile": quantile, "value": value }))
    }))
}

/// Encode exemplars as a JSON array.
///
/// Each exemplar carries exactly one of `value_double` or `value_int`,
/// matching the row-level value columns.
pub fn exemplars_to_json(exemplars: &[Exemplar]) -> Result<String, ConvertError> {
    encode_array(exemplars.iter().map(|e| -> Result<Value, ConvertError> {
        let mut object = Map::new();
        object.insert(
            "timestamp".to_owned(),
            Value::String(format_timestamp(e.time_unix_nano)),
        );
        match e.value {
            Some(exemplar::Value::AsDouble(d)) => {
                object.insert("value_double".to_owned(), finite_number("exemplars.value", d)?);
            }
            Some(exemplar::Value::AsInt(i)) => {
                object.insert("value_int".to_owned(), Value::from(i));
            }
            None => {}
        }
        object.insert(
            "trace_id".to_owned(),
            Value::String(trace_id_hex("exemplars.trace_id", &e.trace_id)?),
        );
        object.insert(
            "span_id".to_owned(),
            Value::String(span_id_hex("exemplars.span_id", &e.span_id)?),
        );
        object.insert(
            "filtered_attributes".to_owned(),
            attributes_to_json(&e.filtered_attributes)?,
        );
        Ok(Value::Object(object))
    }))
}
