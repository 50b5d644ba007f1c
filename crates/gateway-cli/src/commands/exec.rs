//! Exec command - runs a client tool against the shared relay service.
//!
//! The invocation counts as one attachment for as long as the tool runs. The
//! attachment is released on every exit path: normal exit, Ctrl+C or SIGTERM
//! (also while waiting for the service to come up), or an error while
//! launching the tool.

use anyhow::{Context, Result};
use clap::Args;
use gateway_config::Config;
use gateway_lifecycle::{DetachOutcome, StopMode, StopOutcome};
use secrecy::ExposeSecret;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::commands::start::start_attached;
use crate::output;
use crate::service::{Interrupted, Interrupts, ServiceContext, HEALTH_WAIT};

/// Exit code after Ctrl+C or SIGTERM
const INTERRUPTED_EXIT: i32 = 130;

/// Placeholder key handed to tools when the relay has no secret
pub const PLACEHOLDER_KEY: &str = "llm-relay";

/// Arguments for the exec command.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Command and arguments to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Environment pointing an OpenAI-compatible tool at the relay
pub fn client_env(config: &Config) -> Vec<(&'static str, String)> {
    let url = config.service_url();
    let key = config
        .secret()
        .map_or_else(|| PLACEHOLDER_KEY.to_string(), |s| s.expose_secret().clone());

    vec![
        ("LLM_RELAY_URL", url.clone()),
        ("OPENAI_BASE_URL", format!("{url}/v1")),
        ("OPENAI_API_KEY", key),
        ("API_TIMEOUT_MS", config.timeout_ms.to_string()),
    ]
}

enum Ended {
    Exited(ExitStatus),
    Signalled(&'static str),
}

/// Execute the exec command.
pub async fn execute(args: ExecArgs, context: &ServiceContext) -> Result<()> {
    let config = context.load_config().await?;
    let url = config.service_url();
    let coordinator = context.coordinator()?;
    let mut interrupts = Interrupts::register();

    let guard = match start_attached(&coordinator, &url, HEALTH_WAIT, interrupts.recv()).await {
        Ok((_, guard)) => guard,
        Err(e) => {
            if let Some(Interrupted(signal)) = e.downcast_ref::<Interrupted>() {
                info!(signal, "Exec interrupted before the tool started");
                std::process::exit(INTERRUPTED_EXIT);
            }
            return Err(e);
        }
    };

    let ended = run_tool(&args.command, &config, &mut interrupts).await;

    let release = tokio::task::spawn_blocking(move || {
        let detached = guard.release()?;
        let stopped = match detached {
            DetachOutcome::Detached { .. } => Some(coordinator.stop(StopMode::Graceful)?),
            DetachOutcome::Stopped { .. } | DetachOutcome::NotRunning => None,
        };
        Ok::<_, gateway_lifecycle::LifecycleError>((detached, stopped))
    })
    .await
    .context("Detach task panicked")?;

    match release {
        Ok((detached, stopped)) => log_release(detached, stopped),
        Err(e) => output::warning(&format!("Failed to detach from relay service: {e}")),
    }

    match ended? {
        Ended::Exited(status) => match exit_code(status) {
            0 => Ok(()),
            code => std::process::exit(code),
        },
        Ended::Signalled(signal) => {
            info!(signal, "Exec interrupted");
            std::process::exit(INTERRUPTED_EXIT);
        }
    }
}

/// Exit code mirroring how the tool ended, `128 + n` when killed by signal `n`
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

fn log_release(detached: DetachOutcome, stopped: Option<StopOutcome>) {
    match (detached, stopped) {
        (DetachOutcome::Stopped { pid }, _) | (_, Some(StopOutcome::Stopped { pid })) => {
            debug!(pid, "Last client exited, relay service stopped");
        }
        (_, Some(StopOutcome::Deferred { refcount })) => {
            debug!(refcount, "Relay service kept for other clients");
        }
        _ => {}
    }
}

/// Run the tool until it exits or a termination signal arrives
async fn run_tool(
    command: &[String],
    config: &Config,
    interrupts: &mut Interrupts,
) -> Result<Ended> {
    let (program, rest) = command
        .split_first()
        .context("No command given")?;

    let mut child = Command::new(program)
        .args(rest)
        .envs(client_env(config))
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to run {program}"))?;

    debug!(program = %program, pid = ?child.id(), "Client tool started");

    tokio::select! {
        status = child.wait() => {
            Ok(Ended::Exited(status.with_context(|| format!("Failed to wait for {program}"))?))
        }
        signal = interrupts.recv() => {
            if let Err(e) = child.start_kill() {
                warn!(error = %e, "Failed to stop client tool");
            }
            let _ = tokio::time::timeout(Duration::from_secs(5), child.wait()).await;
            Ok(Ended::Signalled(signal))
        }
    }
}
