//! respview - terminal viewer for HTTP response bodies
//!
//! Classifies a response body by its content type and shows it as
//! highlighted text, JSON, a JSON table, XML or raw text.

mod app;
mod body;
mod error;
mod preview;
mod render;
mod tui;

use std::io::{IsTerminal, Read};
use std::panic;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{execute, terminal};
use tokio::sync::broadcast;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::{App, Config};
use crate::body::ResponsePayload;
use crate::error::{ConfigError, PayloadError, UserHint, ViewerError};

/// Terminal viewer for HTTP response bodies
#[derive(Parser, Debug)]
#[command(name = "respview")]
#[command(author, version, about = "Terminal viewer for HTTP response bodies", long_about = None)]
struct Cli {
    /// Body file to show ("-" or omitted reads stdin when it is piped)
    input: Option<String>,

    /// Content type of the body (guessed from the file extension if omitted)
    #[arg(short = 't', long, env = "RESPVIEW_CONTENT_TYPE")]
    content_type: Option<String>,

    /// Charset used to decode the body
    #[arg(long, env = "RESPVIEW_CHARSET")]
    charset: Option<String>,

    /// The input is a JSON-wrapped payload (string, null, byte array or Buffer object)
    #[arg(long)]
    wrapped: bool,

    /// Configuration file path
    #[arg(short, long, env = "RESPVIEW_CONFIG")]
    config: Option<String>,

    /// Run in headless mode (no TUI)
    #[arg(long, env = "RESPVIEW_HEADLESS")]
    headless: bool,

    /// Export the body instead of printing it (headless mode)
    #[arg(long, requires = "headless")]
    export: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RESPVIEW_LOG_LEVEL")]
    log_level: String,

    /// Log file path (enables file logging)
    #[arg(long, env = "RESPVIEW_LOG_FILE")]
    log_file: Option<String>,

    /// Enable JSON structured logging
    #[arg(long, env = "RESPVIEW_LOG_JSON")]
    log_json: bool,

    /// Generate default configuration and exit
    #[arg(long)]
    generate_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate_config: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{}", describe(&err));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return generate_default_config();
    }

    // Set up panic hook for terminal restoration
    setup_panic_hook();

    // Initialize logging
    init_logging(&cli)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting respview");

    // Load and validate configuration
    let config = load_config(&cli)?;

    if cli.validate_config {
        tracing::info!("Configuration is valid");
        println!("Configuration is valid");
        return Ok(());
    }

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(handle_signals(shutdown_tx));

    let result = run_app(cli, config, shutdown_rx).await;

    tracing::info!("respview shutting down");
    result
}

/// Message for a failed run, with a hint where one exists
fn describe(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<ViewerError>() {
        return e.user_message();
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return format!("Configuration problem: {}", e.user_hint());
    }
    format!("Error: {:#}", err)
}

/// Set up panic hook to restore terminal state
fn setup_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        // Try to restore terminal state
        let _ = terminal::disable_raw_mode();
        let _ = execute!(std::io::stdout(), terminal::LeaveAlternateScreen);

        // Call original panic hook
        original_hook(panic_info);
    }));
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.headless && cli.log_file.is_none() {
        // Console logging for headless mode; stdout carries the body
        if cli.log_json {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            subscriber.with(fmt::layer().with_writer(std::io::stderr)).init();
        }
        return Ok(());
    }

    // File logging, so the TUI keeps the terminal to itself
    let file_appender = match &cli.log_file {
        Some(log_path) if log_path.contains('/') || log_path.contains('\\') => {
            let path = Path::new(log_path);
            let dir = path.parent().unwrap_or(Path::new("."));
            let filename = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("respview.log");
            RollingFileAppender::new(Rotation::DAILY, dir, filename)
        }
        other => {
            let log_dir = Config::data_dir()
                .map(|d| d.join("logs"))
                .unwrap_or_else(|_| std::path::PathBuf::from("."));
            std::fs::create_dir_all(&log_dir).ok();
            let filename = other.as_deref().unwrap_or("respview.log");
            RollingFileAppender::new(Rotation::DAILY, log_dir, filename)
        }
    };

    if cli.log_json {
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false);
        subscriber.with(file_layer).init();
    } else {
        let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
        subscriber.with(file_layer).init();
    }

    Ok(())
}

/// Load and validate configuration
fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::load(cli.config.as_deref())?;
    config.validate()?;
    Ok(config)
}

/// Generate default configuration file
fn generate_default_config() -> Result<()> {
    let config = Config::default();
    let toml = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

    println!("{}", toml);
    Ok(())
}

/// Handle shutdown signals
async fn handle_signals(shutdown_tx: broadcast::Sender<()>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, initiating shutdown"),
        Err(e) => {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
    }
    let _ = shutdown_tx.send(());
}

/// Read the body the user asked for
fn load_payload(cli: &Cli) -> Result<ResponsePayload, ViewerError> {
    let bytes = match cli.input.as_deref() {
        Some("-") | None if !std::io::stdin().is_terminal() => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|source| PayloadError::ReadError {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            buf
        }
        Some("-") | None => return Ok(ResponsePayload::Absent),
        Some(path) => std::fs::read(path).map_err(|source| PayloadError::ReadError {
            path: path.to_string(),
            source,
        })?,
    };

    if cli.wrapped {
        let text = String::from_utf8_lossy(&bytes);
        return ResponsePayload::from_json(&text)
            .map_err(|e| PayloadError::InvalidWrapped(e.to_string()).into());
    }

    Ok(ResponsePayload::Bytes(bytes))
}

/// Content type for a body file without an explicit one
fn guess_content_type(input: Option<&str>) -> Option<&'static str> {
    let ext = Path::new(input?).extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "json" => "application/json",
        "xml" | "svg" => "application/xml",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "md" => "text/markdown",
        "txt" | "log" => "text/plain",
        _ => return None,
    };
    Some(content_type)
}

/// Run the main application
async fn run_app(
    cli: Cli,
    config: Config,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let payload = load_payload(&cli)?;
    let content_type = cli
        .content_type
        .clone()
        .or_else(|| guess_content_type(cli.input.as_deref()).map(str::to_string));

    let mut app = App::new(config)?;
    app.load(payload, content_type.as_deref(), cli.charset.as_deref());

    if cli.headless {
        tracing::info!("Running in headless mode");
        return app.run_headless(cli.export);
    }

    tokio::select! {
        result = app.run_tui() => result?,
        _ = shutdown_rx.recv() => {
            tracing::info!("Shutdown signal received, closing TUI");
        }
    }

    Ok(())
}
