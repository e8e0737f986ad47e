use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::InputFormat;

/// Common CLI arguments shared across all binaries
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Payload encoding accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Protobuf,
}

impl From<FormatArg> for InputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => InputFormat::Json,
            FormatArg::Protobuf => InputFormat::Protobuf,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Convert an OTLP metrics export into line protocol
    Convert {
        /// File holding an ExportMetricsServiceRequest
        input: PathBuf,
        #[arg(long, value_enum, help = "Payload encoding (defaults to input.format)")]
        format: Option<FormatArg>,
        #[arg(short, long, help = "Write line protocol here instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Show current configuration and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::Configuration;
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Initialize logging based on CLI arguments; `RUST_LOG` wins when set
    pub fn init_logging(args: &CommonArgs) {
        let level = if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Load configuration with optional override from CLI
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
        match config_path {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Configuration::load_from_path(path).context("Failed to load configuration")
            }
            None => Configuration::load().context("Failed to load configuration"),
        }
    }

    /// Render configuration in human-readable or JSON format
    pub fn render_config(config: &Configuration, json: bool) -> Result<String> {
        if json {
            return serde_json::to_string_pretty(config)
                .context("Failed to serialize configuration to JSON");
        }

        let mut out = String::new();
        out.push_str("signalflux configuration:\n");
        out.push_str("=========================\n");
        out.push_str(&format!("Version: {}\n", version_info()));
        out.push_str(&format!("Input format: {}\n", config.input.format));
        out.push_str(&format!("Writer precision: {}\n", config.writer.precision));

        let mut tags: Vec<_> = config.writer.default_tags.iter().collect();
        tags.sort();
        if tags.is_empty() {
            out.push_str("Default tags: none\n");
        } else {
            for (key, value) in tags {
                out.push_str(&format!("Default tag: {key}={value}\n"));
            }
        }
        Ok(out)
    }

    /// Standard version information
    pub fn version_info() -> String {
        format!(
            "{} {} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    #[test]
    fn test_format_arg_maps_to_input_format() {
        assert_eq!(InputFormat::from(FormatArg::Json), InputFormat::Json);
        assert_eq!(InputFormat::from(FormatArg::Protobuf), InputFormat::Protobuf);
    }

    #[test]
    fn test_render_config_text() {
        let mut config = Configuration::default();
        config
            .writer
            .default_tags
            .insert("region".to_string(), "eu".to_string());

        let text = utils::render_config(&config, false).unwrap();
        assert!(text.contains("Input format: json"));
        assert!(text.contains("Writer precision: ns"));
        assert!(text.contains("Default tag: region=eu"));
        assert!(text.contains(&format!("Version: {}", utils::version_info())));
    }

    #[test]
    fn test_render_config_json() {
        let json = utils::render_config(&Configuration::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["input"]["format"], "json");
        assert_eq!(value["writer"]["precision"], "ns");
    }

    #[test]
    fn test_version_info() {
        let version = utils::version_info();
        assert!(version.contains(env!("CARGO_PKG_VERSION")));
    }
}
