//! Application entry point for the `aero-guardian` backend service.
//!
//! This binary orchestrates the full startup sequence for the air-quality
//! pipeline, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Spawning the generator and transformer loops on their timers
//! - Mounting all API routes via the `routes` gateway
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `AERO_COMPONENTS` (optional) – which components this process runs
//!   (default: `generator,transformer,api`)
//! - `AERO_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AERO_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! The full configuration surface is documented in `config::load_from_env`.
//! The three components share no in-memory state; when split across
//! processes they coordinate only through the two store files.

use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

use aero_guardian::{config, generator, routes, transformer};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();
    let cfg = Arc::new(cfg);

    if cfg.components.generator {
        tracing::info!(
            "Starting generator (every {}s)",
            cfg.generator_interval.as_secs()
        );
        tokio::spawn(generator::run(Arc::clone(&cfg)));
    }

    if cfg.components.transformer {
        tracing::info!(
            "Starting transformer (every {}s)",
            cfg.transformer_interval.as_secs()
        );
        tokio::spawn(transformer::run(Arc::clone(&cfg)));
    }

    if cfg.components.api {
        // Build app from routes gateway
        let app: Router = routes::router(Arc::clone(&cfg));

        let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
        tracing::info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;
    } else {
        // Timer loops run until the process is stopped externally
        std::future::pending::<()>().await;
    }

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AERO_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `AERO_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked. It installs the subscriber globally
/// for the lifetime of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("AERO_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AERO_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AERO_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
