//! Reference-counted service coordinator.
//!
//! Every operation takes the state lock, discards a record whose pid is no
//! longer alive, applies its change and releases the lock. A graceful stop
//! while clients are attached is recorded and carried out by the detach that
//! brings the count to zero.

use crate::error::{LifecycleError, LifecycleResult};
use crate::process::{ProcessControl, Termination};
use crate::state::{ServiceState, StateLock, StateStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What `start` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new service process was spawned
    Spawned {
        /// Service pid
        pid: u32,
        /// Reference count after the start
        refcount: u32,
    },
    /// A live service was already recorded
    Attached {
        /// Service pid
        pid: u32,
        /// Reference count after the start
        refcount: u32,
    },
}

impl StartOutcome {
    /// Service pid
    #[must_use]
    pub fn pid(&self) -> u32 {
        match self {
            Self::Spawned { pid, .. } | Self::Attached { pid, .. } => *pid,
        }
    }
}

/// What `detach` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    /// The count was decremented and the service keeps running
    Detached {
        /// Reference count after the detach
        refcount: u32,
    },
    /// The last holder left while a stop was pending
    Stopped {
        /// Pid of the stopped service
        pid: u32,
    },
    /// No live service was recorded
    NotRunning,
}

/// How hard to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Stop only once no client is attached
    Graceful,
    /// Stop regardless of attached clients
    Force,
}

/// What `stop` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The service was signalled and its record removed
    Stopped {
        /// Pid of the stopped service
        pid: u32,
    },
    /// Clients are still attached; the stop will run on the last detach
    Deferred {
        /// Attached clients
        refcount: u32,
    },
    /// No live service was recorded
    NotRunning,
}

/// Observed service status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// No live service
    NotRunning,
    /// A live service is recorded
    Running {
        /// Service pid
        pid: u32,
        /// Attached clients
        refcount: u32,
        /// A graceful stop is pending
        stop_requested: bool,
    },
}

/// Coordinates the shared background service across client processes
#[derive(Debug)]
pub struct ServiceCoordinator<P> {
    store: StateStore,
    process: P,
}

impl<P: ProcessControl> ServiceCoordinator<P> {
    /// Create a coordinator
    pub fn new(store: StateStore, process: P) -> Self {
        Self { store, process }
    }

    /// Process primitives in use
    pub fn process(&self) -> &P {
        &self.process
    }

    /// Live record under the lock, discarding stale or corrupt ones
    fn live_state(&self, lock: &StateLock<'_>) -> LifecycleResult<Option<ServiceState>> {
        let state = match lock.load() {
            Ok(state) => state,
            Err(LifecycleError::CorruptState { path, message }) => {
                warn!(path = %path.display(), %message, "Discarding corrupt service state");
                lock.clear()?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match state {
            Some(state) if self.process.is_alive(state.pid) => Ok(Some(state)),
            Some(state) => {
                info!(pid = state.pid, "Recorded service is not alive, discarding state");
                lock.clear()?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Signal the service and remove its record
    fn shut_down(&self, lock: &StateLock<'_>, pid: u32) -> LifecycleResult<()> {
        match self.process.terminate(pid) {
            Ok(Termination::Signalled) => info!(pid, "Stopped relay service"),
            Ok(Termination::AlreadyGone) => {
                warn!(pid, "Relay service was already gone");
            }
            Err(e) => {
                lock.clear()?;
                return Err(e);
            }
        }
        lock.clear()
    }

    /// Ensure a service runs and account for `clients` new attachments
    ///
    /// Spawns only when no live service is recorded; the spawn happens under
    /// the lock so concurrent starts never launch two services.
    pub fn start(&self, clients: u32) -> LifecycleResult<StartOutcome> {
        let clients = clients.max(1);
        let lock = self.store.lock()?;

        if let Some(mut state) = self.live_state(&lock)? {
            state.refcount = state.refcount.saturating_add(clients);
            state.stop_requested = false;
            lock.save(&state)?;
            debug!(pid = state.pid, refcount = state.refcount, "Attached to running service");
            return Ok(StartOutcome::Attached {
                pid: state.pid,
                refcount: state.refcount,
            });
        }

        let pid = self.process.spawn()?;
        let state = ServiceState::new(pid, clients);
        lock.save(&state)?;
        Ok(StartOutcome::Spawned {
            pid,
            refcount: state.refcount,
        })
    }

    /// Register one more client of a running service
    ///
    /// # Errors
    /// Returns `NotRunning` if no live service is recorded
    pub fn attach(&self) -> LifecycleResult<u32> {
        let lock = self.store.lock()?;
        let mut state = self.live_state(&lock)?.ok_or(LifecycleError::NotRunning)?;

        state.refcount = state.refcount.saturating_add(1);
        lock.save(&state)?;
        debug!(pid = state.pid, refcount = state.refcount, "Client attached");
        Ok(state.refcount)
    }

    /// Release one client
    ///
    /// Saturates at zero. When the count reaches zero with a stop pending,
    /// the service is terminated.
    pub fn detach(&self) -> LifecycleResult<DetachOutcome> {
        let lock = self.store.lock()?;
        let Some(mut state) = self.live_state(&lock)? else {
            return Ok(DetachOutcome::NotRunning);
        };

        state.refcount = state.refcount.saturating_sub(1);
        debug!(pid = state.pid, refcount = state.refcount, "Client detached");

        if state.refcount == 0 && state.stop_requested {
            self.shut_down(&lock, state.pid)?;
            return Ok(DetachOutcome::Stopped { pid: state.pid });
        }

        lock.save(&state)?;
        Ok(DetachOutcome::Detached {
            refcount: state.refcount,
        })
    }

    /// Stop the service
    ///
    /// A graceful stop with clients attached is recorded and returns
    /// `Deferred`; a forced stop ignores the count.
    pub fn stop(&self, mode: StopMode) -> LifecycleResult<StopOutcome> {
        let lock = self.store.lock()?;
        let Some(mut state) = self.live_state(&lock)? else {
            return Ok(StopOutcome::NotRunning);
        };

        if mode == StopMode::Graceful && state.refcount > 0 {
            state.stop_requested = true;
            lock.save(&state)?;
            info!(
                pid = state.pid,
                refcount = state.refcount,
                "Stop deferred until attached clients exit"
            );
            return Ok(StopOutcome::Deferred {
                refcount: state.refcount,
            });
        }

        self.shut_down(&lock, state.pid)?;
        Ok(StopOutcome::Stopped { pid: state.pid })
    }

    /// Current status
    pub fn status(&self) -> LifecycleResult<ServiceStatus> {
        let lock = self.store.lock()?;
        Ok(match self.live_state(&lock)? {
            Some(state) => ServiceStatus::Running {
                pid: state.pid,
                refcount: state.refcount,
                stop_requested: state.stop_requested,
            },
            None => ServiceStatus::NotRunning,
        })
    }

    /// Remove the record if it still names `pid`
    ///
    /// Called by the service itself on graceful shutdown.
    pub fn clear_if_owned(&self, pid: u32) -> LifecycleResult<bool> {
        let lock = self.store.lock()?;
        let owned = matches!(lock.load(), Ok(Some(state)) if state.pid == pid);
        if owned {
            lock.clear()?;
        }
        Ok(owned)
    }
}

/// One client attachment, released on drop
///
/// Dropping the guard detaches; if that leaves no clients and a stop is
/// pending the service is terminated.
#[derive(Debug)]
pub struct AttachGuard<P: ProcessControl> {
    coordinator: Arc<ServiceCoordinator<P>>,
    released: bool,
}

impl<P: ProcessControl> AttachGuard<P> {
    /// Wrap an attachment that has already been counted
    pub fn adopt(coordinator: Arc<ServiceCoordinator<P>>) -> Self {
        Self {
            coordinator,
            released: false,
        }
    }

    /// Attach and wrap the attachment
    pub fn attach(coordinator: Arc<ServiceCoordinator<P>>) -> LifecycleResult<Self> {
        coordinator.attach()?;
        Ok(Self::adopt(coordinator))
    }

    /// Detach now and report the outcome
    pub fn release(mut self) -> LifecycleResult<DetachOutcome> {
        self.released = true;
        self.coordinator.detach()
    }

    /// Leave the attachment counted after the guard is gone
    ///
    /// Used by `start`, whose attachment outlives the invocation and is
    /// released by a later `stop`.
    pub fn keep(mut self) {
        self.released = true;
    }
}

impl<P: ProcessControl> Drop for AttachGuard<P> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.coordinator.detach() {
            warn!(error = %e, "Failed to detach from relay service");
        }
    }
}
