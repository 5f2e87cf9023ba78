mod output;
mod telemetry;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tempolens_client::TempoClient;
use tempolens_core::config::Config;
use tempolens_core::error::TempolensError;
use tempolens_core::model::{Trace, TraceResponse};
use tempolens_core::{decode_trace_body, find_child_spans, find_span_by_id};

use crate::output::{Style, render_children_human, render_span_human, render_trace_human};
use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "tempolens")]
#[command(about = "Fetch Tempo traces and inspect them as Jaeger-style spans")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, help = "Tempo base URL (default http://localhost:3200)")]
    tempo_url: Option<String>,

    #[arg(long, global = true, help = "Request timeout (e.g. 10s, 500ms)")]
    timeout: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Fetch a trace and print its span tree")]
    Trace { trace_id: String },
    #[command(about = "Inspect one span, its attributes and direct children")]
    Span { trace_id: String, span_id: String },
    #[command(about = "List the direct children of a span")]
    Children { trace_id: String, span_id: String },
    #[command(about = "Convert a saved Tempo response to Jaeger JSON without network access")]
    Convert {
        file: PathBuf,
        #[arg(long)]
        trace_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing();
    let style = Style {
        color: std::io::stdout().is_terminal(),
    };

    match cli.command {
        Commands::Convert { file, trace_id } => {
            let body = tokio::fs::read(&file)
                .await
                .map_err(|e| TempolensError::Io(format!("{}: {e}", file.display())))?;
            let trace = decode_trace_body(&body, &trace_id)
                .with_context(|| format!("convert {}", file.display()))?;
            print_json(&TraceResponse::single(trace))
        }
        Commands::Trace { trace_id } => {
            let trace = fetch(cli.tempo_url, cli.timeout, &trace_id).await?;
            if cli.json {
                print_json(&TraceResponse::single(trace))
            } else {
                print!("{}", render_trace_human(&trace, style));
                Ok(())
            }
        }
        Commands::Span { trace_id, span_id } => {
            let trace = fetch(cli.tempo_url, cli.timeout, &trace_id).await?;
            let span = find_span_by_id(&trace, &span_id).ok_or_else(|| {
                TempolensError::InvalidArgument(format!(
                    "span {span_id} not found in trace {trace_id}"
                ))
            })?;
            if cli.json {
                print_json(span)
            } else {
                let children = find_child_spans(&trace, &span_id);
                print!("{}", render_span_human(&trace, span, &children, style));
                Ok(())
            }
        }
        Commands::Children { trace_id, span_id } => {
            let trace = fetch(cli.tempo_url, cli.timeout, &trace_id).await?;
            let children = find_child_spans(&trace, &span_id);
            if cli.json {
                print_json(&children)
            } else {
                print!("{}", render_children_human(&trace, &children, style));
                Ok(())
            }
        }
    }
}

async fn fetch(
    tempo_url: Option<String>,
    timeout: Option<String>,
    trace_id: &str,
) -> anyhow::Result<Trace> {
    let cfg = Config::load()
        .context("load config")?
        .with_cli_overrides(tempo_url, timeout)?;
    tracing::debug!(tempo_url = %cfg.tempo_url, timeout = ?cfg.fetch_timeout, "config loaded");

    let client = TempoClient::from_config(&cfg)?;
    let trace = client
        .fetch_trace(trace_id)
        .await
        .with_context(|| format!("fetch trace {trace_id}"))?;
    Ok(trace)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
