//! Start command - launches the relay service in the background.

use anyhow::{Context, Result};
use clap::Args;
use gateway_lifecycle::{
    AttachGuard, LifecycleResult, ProcessControl, ServiceCoordinator, StartOutcome, StopMode,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::output::{self, OutputFormat, Report};
use crate::service::{self, Interrupted, Interrupts, ServiceContext, HEALTH_WAIT};

/// Arguments for the start command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Seconds to wait for the service to answer `/health`
    #[arg(long, default_value_t = HEALTH_WAIT.as_secs())]
    pub wait: u64,
}

/// Start output for JSON.
#[derive(Debug, Serialize)]
pub struct StartOutput {
    pub pid: u32,
    pub refcount: u32,
    pub spawned: bool,
    pub url: String,
}

/// Ensure the service runs with one more client counted, then wait until it
/// answers `/health`
///
/// The attachment is owned by the returned guard from the moment it is
/// counted, so a failed or interrupted wait releases it again. A service this
/// call spawned that never becomes healthy is force-stopped; one that was
/// already running is left alone.
pub async fn start_attached<P, S>(
    coordinator: &Arc<ServiceCoordinator<P>>,
    url: &str,
    wait: Duration,
    interrupt: S,
) -> Result<(StartOutcome, AttachGuard<P>)>
where
    P: ProcessControl + 'static,
    S: Future<Output = &'static str>,
{
    let handle = Arc::clone(coordinator);
    let outcome = tokio::task::spawn_blocking(move || handle.start(1))
        .await
        .context("Start task panicked")??;
    let guard = AttachGuard::adopt(Arc::clone(coordinator));

    let ready = tokio::select! {
        ready = service::wait_until_healthy(url, wait) => ready,
        signal = interrupt => Err(Interrupted(signal).into()),
    };

    if let Err(e) = ready {
        let spawned = matches!(outcome, StartOutcome::Spawned { .. });
        let handle = Arc::clone(coordinator);
        let cleanup = tokio::task::spawn_blocking(move || -> LifecycleResult<()> {
            let detached = guard.release();
            if spawned {
                handle.stop(StopMode::Force)?;
            }
            detached.map(|_| ())
        })
        .await;

        if !matches!(cleanup, Ok(Ok(()))) {
            warn!(pid = outcome.pid(), "Failed to release relay service after a failed start");
        }
        return Err(e);
    }

    Ok((outcome, guard))
}

/// Execute the start command.
///
/// The attachment taken here stays counted until `llm-relay stop`.
pub async fn execute(args: StartArgs, context: &ServiceContext, format: OutputFormat) -> Result<()> {
    let config = context.load_config().await?;
    let url = config.service_url();
    let coordinator = context.coordinator()?;
    let mut interrupts = Interrupts::register();

    let (outcome, guard) = start_attached(
        &coordinator,
        &url,
        Duration::from_secs(args.wait),
        interrupts.recv(),
    )
    .await
    .with_context(|| {
        format!(
            "Relay service failed to start; see {}",
            context.home.log_file().display()
        )
    })?;
    guard.keep();

    let (pid, refcount, spawned) = match outcome {
        StartOutcome::Spawned { pid, refcount } => (pid, refcount, true),
        StartOutcome::Attached { pid, refcount } => (pid, refcount, false),
    };

    let message = if spawned {
        format!("Relay service started on {url} (pid {pid})")
    } else {
        format!("Relay service already running on {url} (pid {pid})")
    };

    Report::new(
        StartOutput {
            pid,
            refcount,
            spawned,
            url: url.clone(),
        },
        message,
    )
    .print(format)?;

    if format == OutputFormat::Text {
        output::key_value("Clients", &refcount.to_string());
        output::key_value("Log", &context.home.log_file().display().to_string());
    }
    Ok(())
}
