//! # Gateway Lifecycle
//!
//! Keeps exactly one relay service alive for any number of short-lived client
//! invocations.
//!
//! Clients share nothing but the relay home directory. The service record
//! (pid, reference count, pending stop) lives in one JSON file, and every
//! read-modify-write of it runs under an exclusive `flock` on a sibling lock
//! file, so two invocations attaching at once never lose an increment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod coordinator;
pub mod error;
pub mod process;
pub mod state;

pub use coordinator::{
    AttachGuard, DetachOutcome, ServiceCoordinator, ServiceStatus, StartOutcome, StopMode,
    StopOutcome,
};
pub use error::{LifecycleError, LifecycleResult};
pub use process::{ProcessControl, SystemProcess, Termination};
pub use state::{ServiceState, StateStore};
