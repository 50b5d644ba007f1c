//! # llm-relay service
//!
//! Background relay process, normally spawned by `llm-relay start` or
//! `llm-relay exec`.
//!
//! ## Usage
//!
//! ```bash
//! # Serve with the configuration under ~/.llm-relay
//! llm-relay-server
//!
//! # Serve from another home directory, logging to stderr
//! LLM_RELAY_HOME=/tmp/relay LLM_RELAY_LOG=stderr llm-relay-server
//! ```

use anyhow::Context;
use gateway_config::{ConfigLoader, RelayHome};
use gateway_lifecycle::{ServiceCoordinator, StateStore, SystemProcess};
use gateway_server::{shutdown_signal, AppState, Server, ServerConfig};
use gateway_telemetry::{init_logging, LoggingConfig};
use tracing::{error, info, warn};

/// Set to `stderr` to log to the terminal instead of the home log file
const LOG_TARGET_ENV: &str = "LLM_RELAY_LOG";

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = format!("{e:#}"), "Relay service failed");
        eprintln!("llm-relay-server: {e:#}");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run() -> anyhow::Result<()> {
    let home = RelayHome::resolve()?;
    home.ensure()
        .with_context(|| format!("Failed to create {}", home.root().display()))?;

    let config = ConfigLoader::from_home(&home).load().await?;

    let mut logging = LoggingConfig::new(&config.log_level);
    if std::env::var(LOG_TARGET_ENV).as_deref() != Ok("stderr") {
        logging = logging.with_file(home.log_file());
    }
    let _log_guard = init_logging(&logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        home = %home.root().display(),
        providers = config.providers.len(),
        auth = config.secret().is_some(),
        "Starting llm-relay service"
    );

    let server_config = ServerConfig::new()
        .with_host(&config.host)
        .with_port(config.port);
    let state = AppState::from_config(config)?;

    let server = Server::bind(&server_config, state)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.bind_address()))?;

    server
        .run_until(async {
            shutdown_signal().await;
        })
        .await
        .context("Server error")?;

    release_state(&home);
    Ok(())
}

/// Remove the service record if it still names this process
fn release_state(home: &RelayHome) {
    let store = StateStore::new(home.state_file(), home.lock_file());
    let process = SystemProcess::new(std::env::current_exe().unwrap_or_default());
    let coordinator = ServiceCoordinator::new(store, process);

    match coordinator.clear_if_owned(std::process::id()) {
        Ok(true) => info!("Service record removed"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "Failed to remove service record"),
    }
}
