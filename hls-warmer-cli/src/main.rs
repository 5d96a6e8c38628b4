mod cli;
mod error;
mod output;

use std::io::IsTerminal;
use std::process;
use std::sync::Arc;

use clap::Parser;
use hls_warmer_engine::{StreamScheduler, WarmEvent, Warmer, sanitize};
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::{Args, OutputFormat};
use crate::error::{AppError, Result};
use crate::output::OutputManager;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.debug, args.quiet);

    let urls: Vec<String> = args
        .urls
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .collect();
    if urls.is_empty() {
        return Err(AppError::InvalidInput("no playlist URLs given".to_string()));
    }

    let warmer = Arc::new(Warmer::with_http_config(
        args.warmer_config(),
        &args.http_config(),
    )?);
    let output = OutputManager::new(std::io::stdout().is_terminal(), args.debug);

    // JSON reports own stdout.
    if args.daemon || args.output == OutputFormat::Pretty {
        if let Some(referer) = &args.referer {
            println!("Using Referer: {referer}");
        }
        if let Some(origin) = &args.origin {
            println!("Using Origin: {origin}");
        }
        println!("Playback Session ID: {}", warmer.session_id());
    }

    if args.daemon {
        run_daemon(warmer, urls, &output).await
    } else {
        run_once(&warmer, &urls, &output, args.output).await
    }
}

/// Warms each playlist once, sequentially, printing a report per playlist.
async fn run_once(
    warmer: &Warmer,
    urls: &[String],
    output: &OutputManager,
    format: OutputFormat,
) -> Result<()> {
    let pretty = format == OutputFormat::Pretty;

    for url in urls {
        if pretty {
            println!("\nProcessing {url}...");
        }

        match warmer.warm_playlist(url).await {
            Ok(summary) => {
                println!("{}", output.format_summary(&summary, format)?);
                if pretty {
                    println!("{}", "=".repeat(50));
                }
            }
            Err(e) => {
                warn!(
                    playlist = %url,
                    error = %sanitize(&e.to_string()),
                    "Failed to warm playlist"
                );
            }
        }
    }

    warmer.metrics().log_summary();
    Ok(())
}

/// Runs the scheduler until Ctrl-C or SIGTERM, printing one entry per event.
async fn run_daemon(warmer: Arc<Warmer>, urls: Vec<String>, output: &OutputManager) -> Result<()> {
    let (scheduler, mut events) = StreamScheduler::new(warmer);
    let token = CancellationToken::new();
    tokio::spawn(cancel_on_signal(token.clone()));

    let printer = async {
        while let Some(event) = events.recv().await {
            if let Some(line) = output.format_event(&event) {
                println!("{line}");
            }
            if event == WarmEvent::DaemonStopped {
                break;
            }
        }
    };

    let (result, ()) = tokio::join!(scheduler.run(urls, token), printer);
    result?;
    Ok(())
}

async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                term_signal().await;
            }
        }
        () = term_signal() => {}
    }

    info!("Shutting down gracefully...");
    token.cancel();
}

#[cfg(unix)]
async fn term_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "Failed to register SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn term_signal() {
    std::future::pending::<()>().await;
}

fn init_logging(debug: bool, quiet: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .from_env_lossy()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(debug).with_writer(std::io::stderr))
        .init();
}
