//! Stagecrew command-line front end.
//!
//! Loads the API key, runs the research, writing and editing stages for one
//! topic, and prints (or saves) the result.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stagecrew::core::PipelineRun;
use stagecrew::credentials::Credentials;
use stagecrew::errors::PipelineError;
use stagecrew::events::LoggingEventSink;
use stagecrew::export::write_download;
use stagecrew::observability::init_subscriber;
use stagecrew::pipeline::PipelineBuilder;
use stagecrew::providers::GeminiGenerator;
use tracing::{debug, info};

use cli::{Cli, OutputFormat};
use render::{render_json, render_summary, render_text};

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing, so `.env` can supply STAGECREW_MODEL.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = init_subscriber(cli.log_format(), cli.log_directive()) {
        eprintln!("warning: {e}");
    }
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env file");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let credentials = Credentials::resolve(|key| std::env::var(key).ok(), Some(&cli.secrets))
        .map_err(PipelineError::from)?;
    info!(source = %credentials.source, "Resolved API key");

    let generator = GeminiGenerator::new(&credentials.api_key, cli.generator_config())
        .map_err(PipelineError::from)?;
    let pipeline = PipelineBuilder::new()
        .generator(Arc::new(generator))
        .event_sink(Arc::new(LoggingEventSink::debug()))
        .build()
        .map_err(PipelineError::from)?;

    let run = pipeline.run(&cli.topic()).await?;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", render_text(&run, cli.show_stages));
            eprintln!("{}", render_summary(&run));
        }
        OutputFormat::Json => {
            println!("{}", render_json(&run).context("failed to serialize run")?);
        }
    }

    if let Some(dir) = &cli.save {
        let path = save(dir, &run)?;
        eprintln!("Saved {}", path.display());
    }

    Ok(())
}

fn save(dir: &Path, run: &PipelineRun) -> anyhow::Result<PathBuf> {
    write_download(dir, run).with_context(|| format!("failed to save to {}", dir.display()))
}

/// Prints the error with a hint and picks the exit code.
fn report(err: &anyhow::Error) -> ExitCode {
    let pipeline_err = err.downcast_ref::<PipelineError>();

    match pipeline_err {
        Some(PipelineError::EmptyInput(e)) => eprintln!("warning: {e}"),
        _ => eprintln!("error: {err:#}"),
    }
    if let Some(hint) = pipeline_err.and_then(PipelineError::hint) {
        eprintln!("hint: {hint}");
    }

    ExitCode::from(exit_code(pipeline_err))
}

fn exit_code(err: Option<&PipelineError>) -> u8 {
    match err {
        Some(PipelineError::EmptyInput(_)) => 2,
        _ => 1,
    }
}
