//! Buildhook entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — flags and environment variables, validated into
//!    a [`jenkins::JenkinsConfig`]. Invalid configuration stops the process
//!    before any record is processed.
//! 2. **Wire observability** — `tracing-subscriber` with a JSON (or pretty)
//!    layer, plus an OpenTelemetry OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct infrastructure** — one [`jenkins::JenkinsClient`] shared by
//!    every invocation.
//! 4. **Select run mode**:
//!    - `serve` (default) — run under the serverless runtime and handle one
//!      object-storage notification per invocation.
//!    - `invoke --event <path|->` — process one notification from disk or
//!      stdin and print the per-record report.

mod config;
mod invoke;
mod serve;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use jenkins::JenkinsClient;
use tracing::info;

use crate::config::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.log_format)?;

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "Buildhook stopped");
    }

    telemetry.shutdown();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let encoding = cli.key_encoding();
    let command = cli.command.clone().unwrap_or(Command::Serve);

    let config = cli
        .jenkins
        .into_config()
        .context("invalid Jenkins configuration")?;
    info!(
        endpoint = config.base_url(),
        job = %config.job_name(),
        timeout_secs = config.timeout().as_secs_f64(),
        ?encoding,
        "Configuration loaded"
    );

    let client = JenkinsClient::new(config).context("failed to create Jenkins client")?;

    match command {
        Command::Serve => serve::run(Arc::new(client), encoding).await,
        Command::Invoke { event } => invoke::run(&client, encoding, &event).await,
    }
}
