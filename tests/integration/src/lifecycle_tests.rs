//! Service lifecycle tests against real child processes
//!
//! `sleep` stands in for the relay service; the coordinator only cares that a
//! pid is alive and answers SIGTERM.

use gateway_lifecycle::{
    AttachGuard, DetachOutcome, ProcessControl, ServiceCoordinator, ServiceStatus, StartOutcome,
    StateStore, StopMode, StopOutcome, SystemProcess,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn coordinator(dir: &TempDir) -> Arc<ServiceCoordinator<SystemProcess>> {
    let store = StateStore::new(dir.path().join("service.json"), dir.path().join("service.lock"));
    Arc::new(ServiceCoordinator::new(
        store,
        SystemProcess::new("sleep").with_arg("30"),
    ))
}

fn wait_until_dead(process: &SystemProcess, pid: u32) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if !process.is_alive(pid) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn test_last_detach_stops_after_graceful_stop() {
    let dir = tempfile::tempdir().unwrap();
    let coordinator = coordinator(&dir);

    let StartOutcome::Spawned { pid, refcount } = coordinator.start(1).unwrap() else {
        panic!("expected a fresh service");
    };
    assert_eq!(refcount, 1);
    assert!(coordinator.process().is_alive(pid));

    let second = AttachGuard::attach(Arc::clone(&coordinator)).unwrap();
    assert_eq!(
        coordinator.stop(StopMode::Graceful).unwrap(),
        StopOutcome::Deferred { refcount: 2 }
    );

    assert_eq!(
        second.release().unwrap(),
        DetachOutcome::Detached { refcount: 1 }
    );
    assert!(coordinator.process().is_alive(pid));

    assert_eq!(coordinator.detach().unwrap(), DetachOutcome::Stopped { pid });
    assert!(wait_until_dead(coordinator.process(), pid));
    assert_eq!(coordinator.status().unwrap(), ServiceStatus::NotRunning);
}

#[test]
fn test_second_start_attaches_to_same_service() {
    let dir = tempfile::tempdir().unwrap();
    let first = coordinator(&dir);
    let second = coordinator(&dir);

    let pid = first.start(1).unwrap().pid();
    assert_eq!(
        second.start(1).unwrap(),
        StartOutcome::Attached { pid, refcount: 2 }
    );

    assert_eq!(
        first.stop(StopMode::Force).unwrap(),
        StopOutcome::Stopped { pid }
    );
    assert!(wait_until_dead(first.process(), pid));
}

#[test]
fn test_dead_service_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let coordinator = coordinator(&dir);

    let pid = coordinator.start(1).unwrap().pid();
    coordinator.process().terminate(pid).unwrap();
    assert!(wait_until_dead(coordinator.process(), pid));

    let StartOutcome::Spawned { pid: replacement, refcount } = coordinator.start(1).unwrap() else {
        panic!("expected the stale record to be replaced");
    };
    assert_ne!(replacement, pid);
    assert_eq!(refcount, 1);

    coordinator.stop(StopMode::Force).unwrap();
}

#[test]
fn test_dropped_guard_detaches() {
    let dir = tempfile::tempdir().unwrap();
    let coordinator = coordinator(&dir);

    let pid = coordinator.start(1).unwrap().pid();
    {
        let _guard = AttachGuard::attach(Arc::clone(&coordinator)).unwrap();
        assert!(matches!(
            coordinator.status().unwrap(),
            ServiceStatus::Running { refcount: 2, .. }
        ));
    }
    assert_eq!(
        coordinator.status().unwrap(),
        ServiceStatus::Running {
            pid,
            refcount: 1,
            stop_requested: false
        }
    );

    coordinator.stop(StopMode::Force).unwrap();
}
