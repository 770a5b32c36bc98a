//! # WT440H Receiver
//!
//! Decode WT440H wireless sensor readings from a stream of edge timestamps.
//!
//! Edges are read from a file or stdin, one per line (see
//! [`source`](wt440h_rx::source)), decoded into readings and printed to
//! stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{info, warn};

use wt440h_rx::config::Config;
use wt440h_rx::output::{OutputFormat, WriterSink};
use wt440h_rx::pipeline::{bit_channel, FrameProcessor};
use wt440h_rx::source::feed_edges;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(version, about = "Decode WT440H sensor frames from edge timestamps")]
struct Args {
    /// Configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Edge timestamp file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output format, overrides the configuration file
    #[arg(short, long, value_parser = ["text", "jsonl"])]
    format: Option<String>,
}

/// Main entry point for the WT440H receiver
///
/// Runs the edge reader as the producer task and the frame processor as
/// the consumer until the input ends or Ctrl+C is pressed.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- --input capture.txt --format jsonl
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .with_writer(std::io::stderr)
        .init();

    info!("WT440H receiver v{} starting...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(format) = args.format {
        config.output.format = format;
        config.validate()?;
    }

    let timing = config.timing.timing()?;
    let format: OutputFormat = config.output.format.parse()?;
    let processor = FrameProcessor::new(&config)?;
    let (mut handler, rx) = bit_channel(timing, config.pipeline.channel_capacity);

    info!(
        "Decoding {:?} frames, bit length {} ± {} µs",
        config.frame.layout, config.timing.bit_length_us, config.timing.tolerance_us
    );

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    // Producer: edge reader feeding the line decoder
    let producer = tokio::spawn(async move { feed_edges(reader, &mut handler).await });

    // Consumer: frame assembly, parity check and retransmission filter
    let mut sink = WriterSink::new(std::io::stdout(), format);
    let mut interrupted = false;

    // Handle Ctrl+C for graceful shutdown
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down...");
                interrupted = true;
            }
            Err(e) => {
                warn!("Ctrl+C handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let stats = processor.run_until(rx, &mut sink, shutdown).await?;
    info!(
        "Done: {} readings, {} duplicates, {} timing / {} preamble / {} parity rejections",
        stats.readings,
        stats.duplicates,
        stats.timing_errors,
        stats.preamble_errors,
        stats.checksum_errors
    );

    if interrupted {
        producer.abort();
        return Ok(());
    }

    let edges = producer.await.context("Edge reader task failed")??;
    info!("Total edges read: {}", edges);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["wt440h-rx"]);
        assert!(args.config.is_none());
        assert!(args.input.is_none());
        assert!(args.format.is_none());
    }

    #[test]
    fn test_args_all_options() {
        let args = Args::parse_from([
            "wt440h-rx",
            "--config",
            "config/default.toml",
            "--input",
            "edges.txt",
            "--format",
            "jsonl",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("config/default.toml")));
        assert_eq!(args.input, Some(PathBuf::from("edges.txt")));
        assert_eq!(args.format.as_deref(), Some("jsonl"));
    }

    #[test]
    fn test_args_reject_unknown_format() {
        assert!(Args::try_parse_from(["wt440h-rx", "--format", "csv"]).is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }
}
