//! OTEL metrics → Influx points
//!
//! Flattens OTLP metrics into points of the `prometheus` measurement, the
//! layout Telegraf uses for Prometheus metrics (metric_version = 2).
//!
//! | OTEL Type | Points per data point |
//! |-----------|-----------------------|
//! | Gauge | one point, field `<name>` |
//! | Sum (monotonic) | one point, field `<name>`, value type `sum` |
//! | Sum (non-monotonic) | same as Gauge |
//! | Histogram | `<name>_count`/`_sum`/`_min`/`_max` point plus one `<name>_bucket` point per `le` bound |
//! | Summary | `<name>_count`/`_sum` point plus one `<name>` point per `quantile` |
//!
//! Data point attributes, resource attributes and instrumentation scope
//! become tags, in that order, later sources overwriting earlier ones.

mod error;
mod from_otel;
mod types;

pub use error::{ConversionError, ConversionResult, ExpansionStage};
pub use from_otel::{convert_metric, convert_request};
pub use types::{FieldValue, Fields, MetricValueType, Point, PointSink, Tags};
