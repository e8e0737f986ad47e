use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use common::cli::{CommonArgs, Commands, utils};
use common::config::{CONFIG, InputFormat};
use common::conversion::convert_request;
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use prost::Message;
use writer::LineProtocolWriter;

#[derive(Parser, Debug)]
#[command(name = "signalflux", version, about = "Convert OTLP metrics to InfluxDB line protocol")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(&cli.common);

    let config = utils::load_config(cli.common.config.as_ref())?;
    let config = CONFIG.get_or_init(|| config);

    match cli.command {
        Commands::Config { json } => {
            print!("{}", utils::render_config(config, json)?);
            if json {
                println!();
            }
        }
        Commands::Convert {
            input,
            format,
            output,
        } => {
            let format = format.map(InputFormat::from).unwrap_or(config.input.format);
            let request = read_request(&input, format)?;

            let mut sink = LineProtocolWriter::from_config(&config.writer);
            let converted = convert_request(&request, &mut sink)
                .context("Failed to convert OTLP metric to line protocol")?;
            tracing::info!(
                metrics = converted,
                lines = sink.lines(),
                "Converted {}",
                input.display()
            );

            let text = sink.finish();
            match output {
                Some(path) => fs::write(&path, text)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => std::io::stdout()
                    .lock()
                    .write_all(text.as_bytes())
                    .context("Failed to write to stdout")?,
            }
        }
    }

    Ok(())
}

fn read_request(path: &Path, format: InputFormat) -> Result<ExportMetricsServiceRequest> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    tracing::debug!(%format, bytes = bytes.len(), "Decoding metrics export");

    let request = match format {
        InputFormat::Json => serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid OTLP/JSON in {}", path.display()))?,
        InputFormat::Protobuf => ExportMetricsServiceRequest::decode(bytes.as_slice())
            .with_context(|| format!("Invalid OTLP protobuf in {}", path.display()))?,
    };
    Ok(request)
}
