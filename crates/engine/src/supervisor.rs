// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process registry: one OS child per task, killable as a group.

use crate::{RUN_TASK_ENV, STORAGE_ROOT_ENV, TASK_ID_ENV};
use modhost_core::{Error, TaskId};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

/// Tracks one live child: its pid (== its process group id, see below) and a
/// latch the waiter thread trips when the child has exited.
struct ChildHandle {
    pid: i32,
    exited: (Mutex<bool>, Condvar),
}

impl ChildHandle {
    fn new(pid: i32) -> Self {
        Self {
            pid,
            exited: (Mutex::new(false), Condvar::new()),
        }
    }

    fn mark_exited(&self) {
        let (lock, cvar) = &self.exited;
        *lock.lock() = true;
        cvar.notify_all();
    }

    fn wait_for_exit(&self) {
        let (lock, cvar) = &self.exited;
        let mut done = lock.lock();
        while !*done {
            cvar.wait(&mut done);
        }
    }
}

/// In-memory mapping from `TaskId` to its live child, maintained under its
/// own mutex (`processesMapLock` in the original design). An entry exists
/// iff that task is RUNNING and was spawned by this host instance.
#[derive(Clone, Default)]
pub struct Supervisor {
    registry: Arc<Mutex<HashMap<TaskId, Arc<ChildHandle>>>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-executes `exe` as a new, independently killable OS child that will
    /// run exactly one task.
    ///
    /// The child establishes its own process group (`pgid == pid`) so every
    /// descendant it transitively spawns can be signaled as a unit. Insertion
    /// into the registry happens immediately after spawn returns, before the
    /// child necessarily reaches the callback.
    pub fn spawn(&self, exe: &Path, task_id: TaskId, storage_root: &Path) -> Result<(), Error> {
        self.spawn_with_args(exe, &[], task_id, storage_root)
    }

    /// Like [`Supervisor::spawn`] but lets callers (tests, mainly) pass extra
    /// argv entries through to the child. Production re-exec never needs
    /// this — the task is identified entirely by environment variables.
    pub fn spawn_with_args(
        &self,
        exe: &Path,
        args: &[&str],
        task_id: TaskId,
        storage_root: &Path,
    ) -> Result<(), Error> {
        let mut child = Command::new(exe)
            .args(args)
            .env(RUN_TASK_ENV, "1")
            .env(TASK_ID_ENV, task_id.as_str())
            .env(STORAGE_ROOT_ENV, storage_root)
            .process_group(0)
            .spawn()
            .map_err(|e| Error::internal(format!("failed to spawn task child: {e}")))?;

        let pid = child.id() as i32;
        let handle = Arc::new(ChildHandle::new(pid));
        self.registry.lock().insert(task_id.clone(), handle.clone());
        tracing::info!(task_id = %task_id, pid, "spawned");

        let registry = self.registry.clone();
        std::thread::spawn(move || {
            // Only this thread ever waits on `child` — sharing a `Child`
            // between a waiter thread and a killer would race two `waitpid`
            // calls on the same pid. `kill` below blocks on `wait_for_exit`
            // instead of calling `wait` itself.
            let _ = child.wait();
            handle.mark_exited();
            // `kill` deregisters synchronously before returning, so if this
            // task was killed, the entry is already gone by the time we get
            // here; `remove` is then a harmless no-op.
            registry.lock().remove(&task_id);
        });

        Ok(())
    }

    /// Sends `SIGTERM` to the entire process group of `task_id`'s child,
    /// blocks until it has exited, and deregisters it. Fails with `NotFound`
    /// if no such task is registered (never spawned, already completed
    /// naturally, or already killed).
    ///
    /// Deregistration happens here, synchronously, rather than being left to
    /// the waiter thread's reap — callers (and the test suite) can rely on
    /// `is_registered` going false the instant `kill` returns.
    pub fn kill(&self, task_id: &TaskId) -> Result<(), Error> {
        let handle = self.registry.lock().get(task_id).cloned();
        let Some(handle) = handle else {
            return Err(Error::not_found(format!(
                "task with ID: '{task_id}' not found or already completed"
            )));
        };

        signal::killpg(Pid::from_raw(handle.pid), Signal::SIGTERM).map_err(|e| {
            Error::not_found(format!("unable to find the process for ID: '{task_id}': {e}"))
        })?;

        handle.wait_for_exit();
        self.registry.lock().remove(task_id);
        tracing::info!(task_id = %task_id, "killed");
        Ok(())
    }

    /// Whether `task_id` currently has a live child tracked by this host.
    pub fn is_registered(&self, task_id: &TaskId) -> bool {
        self.registry.lock().contains_key(task_id)
    }
}
