//! Point types handed to sinks by the OTEL → Influx conversion

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::conversion::schema::{
    MEASUREMENT_PROMETHEUS, VALUE_TYPE_GAUGE, VALUE_TYPE_HISTOGRAM, VALUE_TYPE_SUM,
    VALUE_TYPE_SUMMARY,
};

/// Indexed, string valued dimensions of a point
pub type Tags = BTreeMap<String, String>;

/// Typed scalar values of a point
pub type Fields = BTreeMap<String, FieldValue>;

/// A single field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

impl FieldValue {
    /// Numeric value widened to f64
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Float(v) => *v,
            FieldValue::Integer(v) => *v as f64,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

/// Which kind of source metric a point was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricValueType {
    Gauge,
    Sum,
    Histogram,
    Summary,
}

impl MetricValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricValueType::Gauge => VALUE_TYPE_GAUGE,
            MetricValueType::Sum => VALUE_TYPE_SUM,
            MetricValueType::Histogram => VALUE_TYPE_HISTOGRAM,
            MetricValueType::Summary => VALUE_TYPE_SUMMARY,
        }
    }
}

impl fmt::Display for MetricValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flattened point ready for a time-series write protocol
///
/// A point owns its tag and field maps. Points derived from the same data
/// point never share storage, so a sink may keep or mutate what it receives.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: Tags,
    pub fields: Fields,
    pub timestamp: DateTime<Utc>,
    pub value_type: MetricValueType,
}

impl Point {
    /// Create a point in the `prometheus` measurement
    pub fn new(
        tags: Tags,
        fields: Fields,
        timestamp: DateTime<Utc>,
        value_type: MetricValueType,
    ) -> Self {
        Self {
            measurement: MEASUREMENT_PROMETHEUS.to_string(),
            tags,
            fields,
            timestamp,
            value_type,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.fields.get(key).copied()
    }
}

/// Destination for converted points
///
/// The converter calls `accept_point` once per point, in emission order, on
/// the caller's thread. Fields are never empty. Any error aborts conversion of
/// the current metric and is reported to the caller.
pub trait PointSink {
    fn accept_point(&mut self, point: Point) -> anyhow::Result<()>;
}

impl<S: PointSink + ?Sized> PointSink for &mut S {
    fn accept_point(&mut self, point: Point) -> anyhow::Result<()> {
        (**self).accept_point(point)
    }
}

impl PointSink for Vec<Point> {
    fn accept_point(&mut self, point: Point) -> anyhow::Result<()> {
        self.push(point);
        Ok(())
    }
}
