use std::fmt;

/// Expansion stage a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionStage {
    Gauge,
    Sum,
    SumAsGauge,
    Histogram,
    Summary,
}

impl fmt::Display for ExpansionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpansionStage::Gauge => "gauge",
            ExpansionStage::Sum => "sum",
            ExpansionStage::SumAsGauge => "sum (as gauge)",
            ExpansionStage::Histogram => "histogram",
            ExpansionStage::Summary => "summary",
        };
        f.write_str(name)
    }
}

/// Errors that abort conversion of a metric
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("metric has no timestamp")]
    MissingTimestamp,

    #[error("metric timestamp {0} is out of range")]
    TimestampOutOfRange(u64),

    /// Unreachable with the generated proto types, whose value oneof is closed
    #[error("unsupported {stage} data point value type")]
    UnsupportedValueType { stage: ExpansionStage },

    #[error("unknown metric type {0:?}")]
    UnknownMetricKind(String),

    #[error(
        "invalid metric histogram bucket counts qty {bucket_counts} vs explicit bounds qty {explicit_bounds}"
    )]
    InvalidBucketCardinality {
        bucket_counts: usize,
        explicit_bounds: usize,
    },

    #[error("failed to write point for {stage}: {source}")]
    SinkWriteFailed {
        stage: ExpansionStage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;
