//! InfluxDB line protocol rendering
//!
//! One point becomes one line:
//!
//! ```text
//! measurement[,tag_key=tag_value...] field_key=field_value[,...] timestamp
//! ```
//!
//! Tags and fields are written in key order. Integers carry an `i` suffix,
//! floats use the shortest decimal that round-trips.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::config::{Precision, WriterConfig};
use common::conversion::{FieldValue, Point, PointSink, format_float};

use crate::WriterError;

/// Renders accepted points into an in-memory line protocol buffer
#[derive(Debug, Default)]
pub struct LineProtocolWriter {
    precision: Precision,
    default_tags: BTreeMap<String, String>,
    buffer: String,
    lines: usize,
}

impl LineProtocolWriter {
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            ..Default::default()
        }
    }

    pub fn from_config(config: &WriterConfig) -> Self {
        Self {
            precision: config.precision,
            default_tags: config
                .default_tags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..Default::default()
        }
    }

    /// Number of lines rendered so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Consume the writer and return the rendered text
    pub fn finish(self) -> String {
        self.buffer
    }

    /// Render a single point, newline excluded
    pub fn render(&self, point: &Point) -> Result<String, WriterError> {
        if point.fields.is_empty() {
            return Err(WriterError::NoFields);
        }

        let mut line = String::new();
        escape_into(&mut line, &point.measurement, &[',', ' ']);

        let mut tags = self.default_tags.clone();
        for (key, value) in &point.tags {
            if value.is_empty() {
                tracing::debug!(key, "Skipping point tag with empty value");
                continue;
            }
            tags.insert(key.clone(), value.clone());
        }
        for (key, value) in &tags {
            if key.is_empty() || value.is_empty() {
                tracing::debug!(key, "Skipping tag with empty key or value");
                continue;
            }
            line.push(',');
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            escape_into(&mut line, value, &[',', '=', ' ']);
        }

        let mut separator = ' ';
        for (key, value) in &point.fields {
            line.push(separator);
            separator = ',';
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            match value {
                FieldValue::Float(v) if !v.is_finite() => {
                    return Err(WriterError::NonFiniteField {
                        field: key.clone(),
                        value: *v,
                    });
                }
                FieldValue::Float(v) => line.push_str(&format_float(*v)),
                FieldValue::Integer(v) => {
                    line.push_str(&v.to_string());
                    line.push('i');
                }
            }
        }

        line.push(' ');
        line.push_str(&timestamp(&point.timestamp, self.precision)?.to_string());
        Ok(line)
    }
}

impl PointSink for LineProtocolWriter {
    fn accept_point(&mut self, point: Point) -> anyhow::Result<()> {
        let line = self.render(&point)?;
        self.buffer.push_str(&line);
        self.buffer.push('\n');
        self.lines += 1;
        Ok(())
    }
}

fn timestamp(ts: &DateTime<Utc>, precision: Precision) -> Result<i64, WriterError> {
    match precision {
        Precision::Nanoseconds => ts
            .timestamp_nanos_opt()
            .ok_or_else(|| WriterError::TimestampOverflow(precision.to_string())),
        Precision::Microseconds => Ok(ts.timestamp_micros()),
        Precision::Milliseconds => Ok(ts.timestamp_millis()),
        Precision::Seconds => Ok(ts.timestamp()),
    }
}

/// Escapes `special` plus line breaks, which are never allowed raw
fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => {
                if special.contains(&c) {
                    out.push('\\');
                }
                out.push(c);
            }
        }
    }
}
