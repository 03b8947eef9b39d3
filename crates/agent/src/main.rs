//! Rendezvous - clinic scheduling agent
//!
//! Reads one request per line on stdin (`book ...`, `reschedule ...`,
//! `cancel ...`) and writes the French reply on stdout. Logs go to stderr.
//!
//! `rendezvous check [--write]` verifies the calendar setup instead.

mod check;
mod commands;
mod context;

use anyhow::{Context, Result};
use rendezvous_infra::config;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::context::AgentContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before tracing so RUST_LOG from the file applies
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env file loaded"),
    }

    info!("Starting rendezvous v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load().context("loading configuration")?;
    let ctx = AgentContext::new(config).context("initializing calendar access")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("check") => check::run(&ctx, args.iter().any(|a| a == "--write")).await,
        Some(other) => anyhow::bail!("unknown argument '{other}' (expected: check [--write])"),
        None => serve(&ctx).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("RENDEZVOUS_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}

/// Answer requests from stdin until EOF or Ctrl-C.
async fn serve(ctx: &AgentContext) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        };
        let Some(line) = line else {
            info!("Input closed, shutting down");
            break;
        };

        let reply = match Command::parse(&line) {
            Ok(command) => {
                debug!(request = command.name(), "Handling request");
                command.run(&ctx.orchestrator).await
            }
            Err(commands::CommandError::Empty) => continue,
            Err(err) => {
                warn!(error = %err, "Ignoring request");
                format!("! {err}")
            }
        };

        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
