//! llm-relay CLI
//!
//! Starts, stops and inspects the shared relay service, and runs client tools
//! against it.

use clap::Parser;
use gateway_telemetry::{init_logging, LogFormat, LogGuard, LoggingConfig};

mod cli;
mod commands;
mod output;
mod service;

use cli::Cli;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = init_tracing(cli.verbose, cli.json);

    if let Err(e) = cli.execute().await {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Initialize stderr logging based on verbosity and format.
fn init_tracing(verbose: u8, json: bool) -> Option<LogGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let format = if json { LogFormat::Json } else { LogFormat::Text };
    let config = LoggingConfig::new(level)
        .with_format(format)
        .with_target(verbose > 1);

    init_logging(&config)
        .map_err(|e| output::warning(&format!("Logging disabled: {e}")))
        .ok()
}
