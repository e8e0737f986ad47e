//! OTEL → Influx point conversion (Prometheus v2 schema)
//!
//! Every metric is written to the `prometheus` measurement. The metric name
//! becomes a field key; distributions are flattened into one base point plus
//! one point per cumulative bucket or quantile.

use chrono::{DateTime, TimeZone, Utc};
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::common::v1::{InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::metrics::v1::{
    Histogram, HistogramDataPoint, Metric, NumberDataPoint, Summary, SummaryDataPoint,
    metric::Data, number_data_point,
};
use opentelemetry_proto::tonic::resource::v1::Resource;

use super::error::{ConversionError, ConversionResult, ExpansionStage};
use super::types::{FieldValue, Fields, MetricValueType, Point, PointSink, Tags};
use crate::conversion::conversion_common::{
    attributes_to_tags, format_float, resource_to_tags, scope_to_tags,
};
use crate::conversion::schema::{
    ATTRIBUTE_START_TIME_UNIX_NANO, HISTOGRAM_BOUND_KEY, HISTOGRAM_BUCKET_SUFFIX,
    HISTOGRAM_COUNT_SUFFIX, HISTOGRAM_INF_BOUND, HISTOGRAM_MAX_SUFFIX, HISTOGRAM_MIN_SUFFIX,
    HISTOGRAM_SUM_SUFFIX, SUMMARY_COUNT_SUFFIX, SUMMARY_QUANTILE_KEY, SUMMARY_SUM_SUFFIX,
    field_key,
};

/// Convert every metric of an OTLP export request
///
/// Resources and scopes missing from the request are treated as empty.
/// Conversion stops at the first metric that fails; the number of metrics
/// converted so far is returned on success.
pub fn convert_request<S: PointSink + ?Sized>(
    request: &ExportMetricsServiceRequest,
    sink: &mut S,
) -> ConversionResult<usize> {
    let empty_resource = Resource::default();
    let empty_scope = InstrumentationScope::default();
    let mut converted = 0;

    for resource_metrics in &request.resource_metrics {
        let resource = resource_metrics.resource.as_ref().unwrap_or(&empty_resource);

        for scope_metrics in &resource_metrics.scope_metrics {
            let scope = scope_metrics.scope.as_ref().unwrap_or(&empty_scope);

            for metric in &scope_metrics.metrics {
                convert_metric(resource, scope, metric, sink)?;
                converted += 1;
            }
        }
    }

    Ok(converted)
}

/// Convert a single metric and hand the resulting points to `sink`
///
/// Metric description and unit are not carried over.
pub fn convert_metric<S: PointSink + ?Sized>(
    resource: &Resource,
    scope: &InstrumentationScope,
    metric: &Metric,
    sink: &mut S,
) -> ConversionResult<()> {
    let measurement = metric.name.as_str();
    let ctx = Context { resource, scope };

    match &metric.data {
        Some(Data::Gauge(gauge)) => convert_number_data_points(
            &ctx,
            measurement,
            &gauge.data_points,
            MetricValueType::Gauge,
            ExpansionStage::Gauge,
            sink,
        ),
        Some(Data::Sum(sum)) if sum.is_monotonic => convert_number_data_points(
            &ctx,
            measurement,
            &sum.data_points,
            MetricValueType::Sum,
            ExpansionStage::Sum,
            sink,
        ),
        // A non-monotonic sum is indistinguishable from a gauge downstream
        Some(Data::Sum(sum)) => convert_number_data_points(
            &ctx,
            measurement,
            &sum.data_points,
            MetricValueType::Gauge,
            ExpansionStage::SumAsGauge,
            sink,
        ),
        Some(Data::Histogram(histogram)) => convert_histogram(&ctx, measurement, histogram, sink),
        Some(Data::Summary(summary)) => convert_summary(&ctx, measurement, summary, sink),
        Some(Data::ExponentialHistogram(_)) => Err(ConversionError::UnknownMetricKind(
            "ExponentialHistogram".to_string(),
        )),
        None => Err(ConversionError::UnknownMetricKind("Empty".to_string())),
    }
}

/// Resource and scope shared by every data point of a metric
struct Context<'a> {
    resource: &'a Resource,
    scope: &'a InstrumentationScope,
}

/// Tags, fields and timestamp common to all points of one data point
struct BasePoint {
    tags: Tags,
    fields: Fields,
    timestamp: DateTime<Utc>,
}

impl Context<'_> {
    fn init_point(
        &self,
        attributes: &[KeyValue],
        time_unix_nano: u64,
        start_time_unix_nano: u64,
    ) -> ConversionResult<BasePoint> {
        if time_unix_nano == 0 {
            return Err(ConversionError::MissingTimestamp);
        }
        let nanos = i64::try_from(time_unix_nano)
            .map_err(|_| ConversionError::TimestampOutOfRange(time_unix_nano))?;
        let timestamp = Utc.timestamp_nanos(nanos);

        let mut fields = Fields::new();
        if start_time_unix_nano != 0 {
            let start = i64::try_from(start_time_unix_nano)
                .map_err(|_| ConversionError::TimestampOutOfRange(start_time_unix_nano))?;
            fields.insert(
                ATTRIBUTE_START_TIME_UNIX_NANO.to_string(),
                FieldValue::Integer(start),
            );
        }

        let tags = attributes_to_tags(attributes, Tags::new(), "data point");
        let tags = resource_to_tags(self.resource, tags);
        let tags = scope_to_tags(self.scope, tags);

        Ok(BasePoint {
            tags,
            fields,
            timestamp,
        })
    }
}

fn emit<S: PointSink + ?Sized>(
    sink: &mut S,
    point: Point,
    stage: ExpansionStage,
) -> ConversionResult<()> {
    tracing::trace!(
        value_type = %point.value_type,
        tags = point.tags.len(),
        fields = point.fields.len(),
        "Emitting point"
    );
    sink.accept_point(point)
        .map_err(|source| ConversionError::SinkWriteFailed {
            stage,
            source: source.into(),
        })
}

/// Gauges and sums: one point per data point carrying the metric value
fn convert_number_data_points<S: PointSink + ?Sized>(
    ctx: &Context<'_>,
    measurement: &str,
    data_points: &[NumberDataPoint],
    value_type: MetricValueType,
    stage: ExpansionStage,
    sink: &mut S,
) -> ConversionResult<()> {
    for dp in data_points {
        let BasePoint {
            tags,
            mut fields,
            timestamp,
        } = ctx.init_point(&dp.attributes, dp.time_unix_nano, dp.start_time_unix_nano)?;

        let value = match dp.value {
            Some(number_data_point::Value::AsDouble(v)) => FieldValue::Float(v),
            Some(number_data_point::Value::AsInt(v)) => FieldValue::Integer(v),
            None => {
                tracing::debug!(metric = measurement, %stage, "Skipping data point without value");
                continue;
            }
        };
        fields.insert(measurement.to_string(), value);

        emit(sink, Point::new(tags, fields, timestamp, value_type), stage)?;
    }

    Ok(())
}

/// Bucket counts are valid when empty, when every bucket has a bound, or when
/// only the overflow bucket lacks one
fn validate_buckets(dp: &HistogramDataPoint) -> ConversionResult<()> {
    let buckets = dp.bucket_counts.len();
    let bounds = dp.explicit_bounds.len();
    if buckets > 0 && buckets != bounds && buckets != bounds + 1 {
        return Err(ConversionError::InvalidBucketCardinality {
            bucket_counts: buckets,
            explicit_bounds: bounds,
        });
    }
    Ok(())
}

fn convert_histogram<S: PointSink + ?Sized>(
    ctx: &Context<'_>,
    measurement: &str,
    histogram: &Histogram,
    sink: &mut S,
) -> ConversionResult<()> {
    let stage = ExpansionStage::Histogram;

    for dp in &histogram.data_points {
        let BasePoint {
            tags,
            fields,
            timestamp,
        } = ctx.init_point(&dp.attributes, dp.time_unix_nano, dp.start_time_unix_nano)?;

        validate_buckets(dp)?;

        let mut base_fields = fields.clone();
        base_fields.insert(
            field_key(measurement, HISTOGRAM_COUNT_SUFFIX),
            FieldValue::Float(dp.count as f64),
        );
        base_fields.insert(
            field_key(measurement, HISTOGRAM_SUM_SUFFIX),
            FieldValue::Float(dp.sum.unwrap_or_default()),
        );
        if let Some(min) = dp.min {
            base_fields.insert(
                field_key(measurement, HISTOGRAM_MIN_SUFFIX),
                FieldValue::Float(min),
            );
        }
        if let Some(max) = dp.max {
            base_fields.insert(
                field_key(measurement, HISTOGRAM_MAX_SUFFIX),
                FieldValue::Float(max),
            );
        }
        emit(
            sink,
            Point::new(tags.clone(), base_fields, timestamp, MetricValueType::Histogram),
            stage,
        )?;

        let bucket_key = field_key(measurement, HISTOGRAM_BUCKET_SUFFIX);
        let mut cumulative = 0u64;
        for (i, count) in dp.bucket_counts.iter().enumerate() {
            cumulative = cumulative.saturating_add(*count);

            let bound = match dp.explicit_bounds.get(i) {
                Some(bound) => format_float(*bound),
                None => HISTOGRAM_INF_BOUND.to_string(),
            };

            let mut bucket_tags = tags.clone();
            bucket_tags.insert(HISTOGRAM_BOUND_KEY.to_string(), bound);
            let mut bucket_fields = fields.clone();
            bucket_fields.insert(bucket_key.clone(), FieldValue::Float(cumulative as f64));

            emit(
                sink,
                Point::new(
                    bucket_tags,
                    bucket_fields,
                    timestamp,
                    MetricValueType::Histogram,
                ),
                stage,
            )?;
        }
    }

    Ok(())
}

fn convert_summary<S: PointSink + ?Sized>(
    ctx: &Context<'_>,
    measurement: &str,
    summary: &Summary,
    sink: &mut S,
) -> ConversionResult<()> {
    let stage = ExpansionStage::Summary;

    for dp in &summary.data_points {
        let BasePoint {
            tags,
            fields,
            timestamp,
        } = ctx.init_point(&dp.attributes, dp.time_unix_nano, dp.start_time_unix_nano)?;

        emit(
            sink,
            Point::new(
                tags.clone(),
                summary_base_fields(measurement, &fields, dp),
                timestamp,
                MetricValueType::Summary,
            ),
            stage,
        )?;

        for quantile in &dp.quantile_values {
            let mut quantile_tags = tags.clone();
            quantile_tags.insert(
                SUMMARY_QUANTILE_KEY.to_string(),
                format_float(quantile.quantile),
            );
            let mut quantile_fields = fields.clone();
            quantile_fields.insert(measurement.to_string(), FieldValue::Float(quantile.value));

            emit(
                sink,
                Point::new(
                    quantile_tags,
                    quantile_fields,
                    timestamp,
                    MetricValueType::Summary,
                ),
                stage,
            )?;
        }
    }

    Ok(())
}

fn summary_base_fields(measurement: &str, fields: &Fields, dp: &SummaryDataPoint) -> Fields {
    let mut base = fields.clone();
    base.insert(
        field_key(measurement, SUMMARY_COUNT_SUFFIX),
        FieldValue::Float(dp.count as f64),
    );
    base.insert(
        field_key(measurement, SUMMARY_SUM_SUFFIX),
        FieldValue::Float(dp.sum),
    );
    base
}
