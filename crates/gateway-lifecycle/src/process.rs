//! OS process primitives: spawn detached, check liveness, signal.

use crate::error::{LifecycleError, LifecycleResult};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Result of signalling a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// SIGTERM was delivered
    Signalled,
    /// The process no longer existed
    AlreadyGone,
}

/// The three process operations the coordinator needs
pub trait ProcessControl: Send + Sync {
    /// Start the service detached from the caller and return its pid
    fn spawn(&self) -> LifecycleResult<u32>;

    /// Whether a process with this pid exists
    fn is_alive(&self, pid: u32) -> bool;

    /// Ask the process to shut down
    fn terminate(&self, pid: u32) -> LifecycleResult<Termination>;
}

/// Real processes via `std::process` and `nix`
#[derive(Debug, Clone)]
pub struct SystemProcess {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl SystemProcess {
    /// Launch `program` when spawning
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Add an argument
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable for the child
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

fn to_pid(pid: u32) -> Option<Pid> {
    i32::try_from(pid).ok().filter(|&p| p > 0).map(Pid::from_raw)
}

impl ProcessControl for SystemProcess {
    fn spawn(&self) -> LifecycleResult<u32> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|source| LifecycleError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let pid = child.id();
        info!(pid, program = %self.program.display(), "Spawned relay service");

        // Reap the child if it exits while this process is still around.
        std::thread::spawn(move || {
            let status = child.wait();
            debug!(pid, ?status, "Relay service exited");
        });

        Ok(pid)
    }

    fn is_alive(&self, pid: u32) -> bool {
        let Some(pid) = to_pid(pid) else {
            return false;
        };
        match kill(pid, None) {
            Ok(()) | Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    fn terminate(&self, pid: u32) -> LifecycleResult<Termination> {
        let Some(target) = to_pid(pid) else {
            return Ok(Termination::AlreadyGone);
        };
        match kill(target, Signal::SIGTERM) {
            Ok(()) => Ok(Termination::Signalled),
            Err(Errno::ESRCH) => Ok(Termination::AlreadyGone),
            Err(source) => Err(LifecycleError::Signal { pid, source }),
        }
    }
}
