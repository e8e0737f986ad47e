//! Wire names shared with downstream readers of the Prometheus v2 point schema
//!
//! Every writer and reader of converted points has to agree on these strings
//! byte for byte, so they are only ever referenced through this module.

/// Measurement name carried by every converted point
pub const MEASUREMENT_PROMETHEUS: &str = "prometheus";

/// Field holding the data point start time in nanoseconds
pub const ATTRIBUTE_START_TIME_UNIX_NANO: &str = "start_time_unix_nano";

// Histogram field suffixes, appended to the metric name
pub const HISTOGRAM_COUNT_SUFFIX: &str = "_count";
pub const HISTOGRAM_SUM_SUFFIX: &str = "_sum";
pub const HISTOGRAM_MIN_SUFFIX: &str = "_min";
pub const HISTOGRAM_MAX_SUFFIX: &str = "_max";
pub const HISTOGRAM_BUCKET_SUFFIX: &str = "_bucket";

/// Tag key carrying the upper bound of a cumulative bucket
pub const HISTOGRAM_BOUND_KEY: &str = "le";

/// Bound tag value of the overflow bucket
pub const HISTOGRAM_INF_BOUND: &str = "+Inf";

// Summary field suffixes, appended to the metric name
pub const SUMMARY_COUNT_SUFFIX: &str = "_count";
pub const SUMMARY_SUM_SUFFIX: &str = "_sum";

/// Tag key carrying the quantile of a summary point
pub const SUMMARY_QUANTILE_KEY: &str = "quantile";

/// Tag keys contributed by the instrumentation scope
pub const OTEL_LIBRARY_NAME: &str = "otel.library.name";
pub const OTEL_LIBRARY_VERSION: &str = "otel.library.version";

// Value type names as seen by downstream schema decisions
pub const VALUE_TYPE_GAUGE: &str = "gauge";
pub const VALUE_TYPE_SUM: &str = "sum";
pub const VALUE_TYPE_HISTOGRAM: &str = "histogram";
pub const VALUE_TYPE_SUMMARY: &str = "summary";

/// Build a field key in the metric's namespace, e.g. `latency` + `_bucket`
pub fn field_key(measurement: &str, suffix: &str) -> String {
    let mut key = String::with_capacity(measurement.len() + suffix.len());
    key.push_str(measurement);
    key.push_str(suffix);
    key
}
