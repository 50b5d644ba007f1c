//! Locating, spawning and probing the background relay service.

use anyhow::{bail, Context, Result};
use gateway_config::{home::HOME_ENV, Config, ConfigLoader, RelayHome};
use gateway_lifecycle::{ServiceCoordinator, StateStore, SystemProcess};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{debug, warn};

/// File name of the service binary next to this executable
pub const SERVER_BIN_NAME: &str = "llm-relay-server";

/// How long a freshly spawned service gets to answer `/health`
pub const HEALTH_WAIT: Duration = Duration::from_secs(10);

const HEALTH_POLL: Duration = Duration::from_millis(100);

/// Coordinator over the real process table
pub type Coordinator = ServiceCoordinator<SystemProcess>;

/// Everything a command needs to reach the shared service
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Relay home directory
    pub home: RelayHome,
    /// Service binary
    pub server_bin: PathBuf,
}

impl ServiceContext {
    /// Resolve the home directory and service binary
    pub fn resolve(home: Option<PathBuf>, server_bin: Option<PathBuf>) -> Result<Self> {
        let home = match home {
            Some(dir) => RelayHome::new(dir),
            None => RelayHome::resolve()?,
        };

        let server_bin = match server_bin {
            Some(path) => path,
            None => std::env::current_exe()
                .context("Failed to locate the current executable")?
                .with_file_name(SERVER_BIN_NAME),
        };

        Ok(Self { home, server_bin })
    }

    /// Configuration loader for this home
    pub fn loader(&self) -> ConfigLoader {
        ConfigLoader::from_home(&self.home)
    }

    /// Load and validate the configuration document
    pub async fn load_config(&self) -> Result<Config> {
        Ok(self.loader().load().await?)
    }

    /// Coordinator spawning the service binary with this home
    pub fn coordinator(&self) -> Result<Arc<Coordinator>> {
        self.home
            .ensure()
            .with_context(|| format!("Failed to create {}", self.home.root().display()))?;

        let store = StateStore::new(self.home.state_file(), self.home.lock_file());
        let process = SystemProcess::new(&self.server_bin)
            .with_env(HOME_ENV, self.home.root().display().to_string());
        Ok(Arc::new(ServiceCoordinator::new(store, process)))
    }
}

/// Whether `GET {base}/health` answers 2xx
pub async fn is_healthy(client: &reqwest::Client, base_url: &str) -> bool {
    match client.get(format!("{base_url}/health")).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            debug!(error = %e, "Health probe failed");
            false
        }
    }
}

/// Poll `/health` until it answers or `timeout` passes
pub async fn wait_until_healthy(base_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(HEALTH_POLL * 10)
        .build()
        .context("Failed to build HTTP client")?;

    let deadline = Instant::now() + timeout;
    loop {
        if is_healthy(&client, base_url).await {
            return Ok(());
        }
        if Instant::now() >= deadline {
            bail!("Relay service did not answer at {base_url} within {timeout:?}");
        }
        tokio::time::sleep(HEALTH_POLL).await;
    }
}

/// A client invocation was stopped by Ctrl+C or SIGTERM
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interrupted by {0}")]
pub struct Interrupted(pub &'static str);

/// Ctrl+C and SIGTERM listeners
///
/// Handlers are installed by [`Interrupts::register`], which replaces the
/// default action of terminating the process. Register before counting an
/// attachment so no signal can skip the detach.
#[derive(Debug)]
pub struct Interrupts {
    interrupt: Option<Signal>,
    terminate: Option<Signal>,
}

impl Interrupts {
    /// Install the handlers
    pub fn register() -> Self {
        Self {
            interrupt: listen(SignalKind::interrupt(), "SIGINT"),
            terminate: listen(SignalKind::terminate(), "SIGTERM"),
        }
    }

    /// Resolves with the signal name once either signal arrives
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            () = next(&mut self.interrupt) => "ctrl+c",
            () = next(&mut self.terminate) => "sigterm",
        }
    }
}

fn listen(kind: SignalKind, name: &str) -> Option<Signal> {
    signal(kind)
        .map_err(|e| warn!(error = %e, signal = name, "Failed to install signal handler"))
        .ok()
}

async fn next(signal: &mut Option<Signal>) {
    match signal {
        Some(stream) => {
            stream.recv().await;
        }
        None => std::future::pending().await,
    }
}
