// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SCC gateway daemon (sccd)
//!
//! Single-process coordination gateway: serves the REST surface on
//! loopback, owns the state under `state/` and `artifacts/`, and runs
//! the periodic reaper. Workers are external processes that register,
//! long-poll claims, and post completions over HTTP.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use scc_gateway::{bootstrap, build_router, env};
use std::net::SocketAddr;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("sccd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("sccd {}", env!("CARGO_PKG_VERSION"));
                println!("SCC gateway - local coordination engine for LLM-backed workers");
                println!();
                println!("USAGE:");
                println!("    sccd");
                println!();
                println!("Listens on 127.0.0.1 (GATEWAY_PORT, default 18788) and owns");
                println!("the state/, artifacts/, and map/ trees under SCC_DATA_DIR");
                println!("(default: the working directory).");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: sccd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let data_dir = env::data_dir();
    let _log_guard = setup_logging(&data_dir)?;

    let config = match env::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sccd: configuration error: {e}");
            std::process::exit(1);
        }
    };

    // One gateway per data dir; the lock lives for the process lifetime.
    let _lock = match bootstrap::acquire_instance_lock(&data_dir) {
        Ok(lock) => lock,
        Err(_) => {
            eprintln!("sccd is already running for {}", data_dir.display());
            std::process::exit(1);
        }
    };

    let port = config.gateway_port;
    let state = bootstrap::build_state(config, &data_dir);
    let reaper = bootstrap::spawn_reaper(&state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, data_dir = %data_dir.display(), "gateway listening");

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    info!("gateway stopped");
    Ok(())
}

const LOG_ROTATE_BYTES: u64 = 10 * 1024 * 1024;

/// Console + file logging. The file appender is non-blocking; the
/// returned guard must live until exit so buffered lines flush.
fn setup_logging(
    data_dir: &std::path::Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>> {
    let state_dir = data_dir.join("state");
    std::fs::create_dir_all(&state_dir)?;
    rotate_log_if_needed(&state_dir.join("gateway.log"));
    let appender = tracing_appender::rolling::never(&state_dir, "gateway.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()?;
    Ok(guard)
}

/// Move an oversized log aside so the file never grows unbounded.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let Ok(meta) = std::fs::metadata(log_path) else {
        return;
    };
    if meta.len() > LOG_ROTATE_BYTES {
        let _ = std::fs::rename(log_path, log_path.with_extension("log.old"));
    }
}

async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "SIGTERM handler unavailable");
            return std::future::pending().await;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("SIGINT received, shutting down"),
        _ = sigterm.recv() => info!("SIGTERM received, shutting down"),
    }
}
