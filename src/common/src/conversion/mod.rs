pub mod conversion_common;
pub mod conversion_influx;
pub mod schema;

pub use conversion_common::{
    attribute_value_to_string, format_float, resource_to_tags, scope_to_tags,
};
pub use conversion_influx::{
    ConversionError, ConversionResult, ExpansionStage, FieldValue, Fields, MetricValueType,
    Point, PointSink, Tags, convert_metric, convert_request,
};
