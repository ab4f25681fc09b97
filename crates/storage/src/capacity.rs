// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity gate
//!
//! Guards `maxTasks` (0 means unbounded) under a mutex. The gate exposes one
//! operation, `reserve`: under the lock it counts live entries in `running/`,
//! refuses if at capacity, and otherwise creates `running/<task_id>` itself —
//! creating the directory *inside* the critical section is the act of
//! reservation, since the next count will see it. There is no release
//! operation: the reservation is consumed when the directory is renamed out
//! of `running/` at completion.
//!
//! The capacity check and the directory creation happen unconditionally
//! through the same path regardless of whether `max_tasks` is bounded —
//! unifying what the original module host did only in the bounded case, per
//! the "unify these paths" open question.

use crate::layout::StorageRoot;
use modhost_core::{Error, TaskId};
use parking_lot::Mutex;
use std::path::PathBuf;

pub struct CapacityGate {
    max_tasks: usize,
    lock: Mutex<()>,
}

impl CapacityGate {
    pub fn new(max_tasks: usize) -> Self {
        Self {
            max_tasks,
            lock: Mutex::new(()),
        }
    }

    pub fn max_tasks(&self) -> usize {
        self.max_tasks
    }

    /// Reserves a RUNNING slot for `task_id`, creating its directory.
    ///
    /// Returns the path of the freshly created `running/<task_id>` directory
    /// on success, or `ErrorKind::CapacityExceeded` if the host is saturated.
    pub fn reserve(&self, storage: &StorageRoot, task_id: &TaskId) -> Result<PathBuf, Error> {
        let _guard = self.lock.lock();

        let running = storage.count_running();
        if self.max_tasks > 0 && running >= self.max_tasks {
            return Err(Error::capacity_exceeded(format!(
                "Capacity limit exceeded: {running}/{} running tasks, retry later.",
                self.max_tasks
            )));
        }

        let dir = storage.running_task_dir(task_id);
        std::fs::create_dir(&dir).map_err(|e| {
            Error::internal(format!("failed to create task directory: {e}"))
        })?;
        tracing::info!(task_id = %task_id, "reserved");
        Ok(dir)
    }
}
