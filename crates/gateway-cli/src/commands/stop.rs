//! Stop command.

use anyhow::Result;
use clap::Args;
use gateway_lifecycle::{DetachOutcome, StopMode, StopOutcome};
use serde::Serialize;

use crate::output::{OutputFormat, Report};
use crate::service::ServiceContext;

/// Arguments for the stop command.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Stop even while clients are attached
    #[arg(short, long)]
    pub force: bool,
}

/// Stop output for JSON.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StopOutput {
    Stopped { pid: u32 },
    Deferred { refcount: u32 },
    NotRunning,
}

/// Execute the stop command.
///
/// A graceful stop first releases the attachment taken by `start`, then stops
/// once nothing else is attached.
pub fn execute(args: &StopArgs, context: &ServiceContext, format: OutputFormat) -> Result<()> {
    let coordinator = context.coordinator()?;

    let outcome = if args.force {
        coordinator.stop(StopMode::Force)?
    } else {
        match coordinator.detach()? {
            DetachOutcome::Stopped { pid } => StopOutcome::Stopped { pid },
            DetachOutcome::NotRunning => StopOutcome::NotRunning,
            DetachOutcome::Detached { .. } => coordinator.stop(StopMode::Graceful)?,
        }
    };

    let (data, message) = match outcome {
        StopOutcome::Stopped { pid } => (
            StopOutput::Stopped { pid },
            format!("Relay service stopped (pid {pid})"),
        ),
        StopOutcome::Deferred { refcount } => (
            StopOutput::Deferred { refcount },
            format!("Stop deferred until {refcount} attached client(s) exit"),
        ),
        StopOutcome::NotRunning => (
            StopOutput::NotRunning,
            "No relay service is running".to_string(),
        ),
    };

    Report::new(data, message).print(format)
}
