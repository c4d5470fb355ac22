mod api;
mod collaborators;
mod config;
mod doctor_cmd;
mod extract_cmd;
mod scan_cmd;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use freshscan_core::ScanError;
use freshscan_logging::init_logger;

use api::AppState;
use config::Config;

#[derive(Parser)]
#[command(name = "freshscan")]
#[command(about = "Find expiration dates on product photos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one image request ({"image_base64": ...}) and print the detected items
    Scan {
        /// Read the request from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Resolve the expiration date in plain OCR text
    Extract {
        /// Read the text from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Reference date (YYYY-MM-DD) used to reject past dates
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Start the HTTP scan server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check that OCR and object detection are usable
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();
    init_logger(&config.log_level, config.log_dir.as_deref(), config.log_json);

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Scan { input } => scan_cmd::run(&config, input.as_deref()).await,
        Commands::Extract { input, today } => {
            extract_cmd::run(&config, input.as_deref(), today).await
        }
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await
        }
        Commands::Doctor => doctor_cmd::run(&config).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// Print the failure on stderr and pick the process exit status.
fn report(err: &anyhow::Error) -> ExitCode {
    let (line, code) = error_report(err);
    eprintln!("{line}");
    ExitCode::from(code)
}

/// The `{"error": ...}` line and exit code for a failed command.
fn error_report(err: &anyhow::Error) -> (String, u8) {
    let (message, code) = match err.downcast_ref::<ScanError>() {
        Some(scan_err) => (scan_err.to_string(), scan_err.exit_code()),
        None => (format!("An unexpected error occurred: {err:#}"), 1),
    };
    (json!({ "error": message }).to_string(), code)
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        detector = ?config.detector,
        "Starting freshscan server"
    );

    let pipeline = collaborators::build_pipeline(&config)?;
    let state = Arc::new(AppState { pipeline });

    let app = api::build_router(state, config.max_body_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "freshscan server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use serde_json::Value;

    fn parse(line: &str) -> Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn scan_errors_keep_their_message_and_code() {
        let (line, code) = error_report(&anyhow::Error::from(ScanError::undecodable("bad")));
        assert_eq!(parse(&line)["error"], "Failed to decode base64 image.");
        assert_eq!(code, 3);
    }

    #[test]
    fn unexpected_errors_are_still_json() {
        let err = Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
            .context("failed to read /nonexistent")
            .unwrap_err();
        let (line, code) = error_report(&err);
        assert_eq!(
            parse(&line)["error"],
            "An unexpected error occurred: failed to read /nonexistent: gone"
        );
        assert_eq!(code, 1);
    }
}
