//! CLI entry point for the fetchd service.

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result, bail};
use clap::Parser;
use fetchd_core::{
    DownloadRequest, DownloadService, ServiceConfig, resolve_default_config_path,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = load_config(&args)?;
    info!(download_dir = %config.download_dir().display(), "fetchd starting");

    // Read requests: from positional args or stdin
    let requests = if args.urls.is_empty() {
        read_stdin_requests()?
    } else {
        args.urls
            .iter()
            .map(|url| DownloadRequest {
                url: url.clone(),
                subdir: args.subdir.clone(),
                filename: args.filename.clone(),
                overwrite: args.overwrite,
            })
            .collect()
    };

    if requests.is_empty() {
        info!("No requests provided. Pipe request lines via stdin or pass URLs as arguments.");
        info!("Example: echo 'https://example.com/file.pdf' | fetchd -d ./downloads");
        return Ok(());
    }

    let service = DownloadService::new(config, usize::from(args.concurrency))?;

    // Print every terminal event as a JSON line for external automation.
    // Lagging only drops the overwritten events; the printer keeps going
    // and stops when the last sender is gone.
    let mut events = service.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "failed to serialize event"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event printer fell behind; some events were not printed");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    info!(requests = requests.len(), "dispatching downloads");
    let handles: Vec<_> = requests.into_iter().map(|r| service.dispatch(r)).collect();

    for handle in handles {
        // Ignore JoinError - task panics are logged but don't fail the batch
        if let Err(e) = handle.await {
            warn!(error = %e, "download task panicked");
        }
    }

    // All tasks are done; drop the last event sender so the printer drains and exits
    drop(service);
    let _ = printer.await;

    Ok(())
}

/// Resolves the service configuration from flags or the default config file.
fn load_config(args: &Args) -> Result<ServiceConfig> {
    let base_dir = std::env::current_dir().context("failed to determine working directory")?;

    if let Some(dir) = &args.download_dir {
        return Ok(ServiceConfig::new(dir.clone(), &base_dir)?);
    }

    if let Some(path) = resolve_default_config_path()
        && path.exists()
    {
        return Ok(ServiceConfig::load(&path, &base_dir)?);
    }

    bail!(
        "no download directory configured; pass --download-dir or set `download_dir` in the config file"
    );
}

/// Reads one request per stdin line: a bare URL or a JSON request object.
fn read_stdin_requests() -> Result<Vec<DownloadRequest>> {
    if io::stdin().is_terminal() {
        return Ok(Vec::new());
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;

    let mut requests = Vec::new();
    for line in buffer.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('{') {
            let request: DownloadRequest = serde_json::from_str(line)
                .with_context(|| format!("invalid request line: {line}"))?;
            requests.push(request);
        } else {
            requests.push(DownloadRequest::new(line));
        }
    }
    Ok(requests)
}
