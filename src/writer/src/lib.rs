//! Sinks for converted points
//!
//! [`LineProtocolWriter`] renders points as InfluxDB line protocol and
//! [`PointCollector`] keeps them in memory.

use common::conversion::{Point, PointSink};

pub mod line_protocol;
pub use line_protocol::LineProtocolWriter;

#[derive(thiserror::Error, Debug)]
pub enum WriterError {
    #[error("Field {field:?} has non-finite value {value}")]
    NonFiniteField { field: String, value: f64 },
    #[error("Point has no fields")]
    NoFields,
    #[error("Timestamp of point cannot be represented in {0}")]
    TimestampOverflow(String),
}

/// A sink that keeps every accepted point in arrival order
#[derive(Debug, Default)]
pub struct PointCollector {
    points: Vec<Point>,
}

impl PointCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl PointSink for PointCollector {
    fn accept_point(&mut self, point: Point) -> anyhow::Result<()> {
        self.points.push(point);
        Ok(())
    }
}
