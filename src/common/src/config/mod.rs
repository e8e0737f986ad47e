use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use once_cell::sync::OnceCell;

pub static CONFIG: OnceCell<Configuration> = OnceCell::new();

/// Encoding of OTLP metric payloads read by the CLI
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// OTLP/JSON `ExportMetricsServiceRequest`
    #[default]
    Json,
    /// Binary protobuf `ExportMetricsServiceRequest`
    Protobuf,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Json => f.write_str("json"),
            InputFormat::Protobuf => f.write_str("protobuf"),
        }
    }
}

/// Timestamp precision of rendered line protocol
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "us")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "us",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
        };
        f.write_str(unit)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Payload encoding used when the CLI is not told otherwise
    pub format: InputFormat,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct WriterConfig {
    /// Timestamp precision of emitted lines
    pub precision: Precision,
    /// Tags added to every line unless the point already carries the key
    pub default_tags: HashMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Input decoding configuration
    pub input: InputConfig,
    /// Line protocol writer configuration
    pub writer: WriterConfig,
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::figment(
            Figment::from(Serialized::defaults(Configuration::default()))
                .merge(Toml::file("signalflux.toml")),
        )
    }

    /// Load configuration from an explicit TOML file, still honouring
    /// `SIGNALFLUX__` environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        Self::figment(
            Figment::from(Serialized::defaults(Configuration::default()))
                .merge(Toml::file_exact(path)),
        )
    }

    fn figment(figment: Figment) -> Result<Self, Box<figment::Error>> {
        let config = figment
            .merge(Env::prefixed("SIGNALFLUX__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}
