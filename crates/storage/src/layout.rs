// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage layout manager
//!
//! Owns the on-disk directory tree: `logs/`, `running/`, `completed/`. The
//! host does not recover in-flight tasks across restarts, so the tree is
//! wiped and recreated every time a host starts.

use modhost_core::{Error, TaskId};
use std::path::{Path, PathBuf};

/// The three well-known subdirectories under a module's storage root.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    root: PathBuf,
}

impl StorageRoot {
    /// Resets `root` to an empty `logs/ running/ completed/` tree.
    ///
    /// If `root` already exists it is recursively removed first. Failure to
    /// initialize storage is fatal — the caller should abort startup.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        if root.exists() {
            std::fs::remove_dir_all(&root).map_err(|e| {
                Error::internal(format!(
                    "failed to remove existing storage root {}: {e}",
                    root.display()
                ))
            })?;
        }
        std::fs::create_dir_all(&root)
            .map_err(|e| Error::internal(format!("failed to create storage root: {e}")))?;

        let layout = Self { root };
        for dir in [layout.logs_dir(), layout.running_dir(), layout.completed_dir()] {
            std::fs::create_dir(&dir)
                .map_err(|e| Error::internal(format!("failed to create {}: {e}", dir.display())))?;
        }
        Ok(layout)
    }

    /// Wraps an existing storage root without touching it.
    ///
    /// Used by the task-child process, which only ever reads and writes
    /// within a single task directory and must never re-wipe the tree its
    /// sibling tasks are running in.
    pub fn attach(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn running_dir(&self) -> PathBuf {
        self.root.join("running")
    }

    pub fn completed_dir(&self) -> PathBuf {
        self.root.join("completed")
    }

    pub fn running_task_dir(&self, id: &TaskId) -> PathBuf {
        self.running_dir().join(id.as_str())
    }

    pub fn completed_task_dir(&self, id: &TaskId) -> PathBuf {
        self.completed_dir().join(id.as_str())
    }

    pub fn log_path(&self, id: &TaskId) -> PathBuf {
        self.logs_dir().join(format!("{id}.txt"))
    }

    /// Number of immediate children of `running/` whose name begins with `t_`.
    ///
    /// This is the authoritative count of RUNNING tasks the capacity gate and
    /// `/info` both consult.
    pub fn count_running(&self) -> usize {
        count_task_entries(&self.running_dir())
    }
}

pub(crate) fn count_task_entries(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(TaskId::looks_like_task_name)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_creates_the_three_subdirectories() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("data");
        let layout = StorageRoot::init(&root).unwrap();
        assert!(layout.logs_dir().is_dir());
        assert!(layout.running_dir().is_dir());
        assert!(layout.completed_dir().is_dir());
    }

    #[test]
    fn init_wipes_preexisting_content() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("data");
        std::fs::create_dir_all(root.join("running/t_stale")).unwrap();

        let layout = StorageRoot::init(&root).unwrap();
        assert_eq!(layout.count_running(), 0);
    }

    #[test]
    fn count_running_only_counts_t_prefixed_entries() {
        let dir = tempdir().unwrap();
        let layout = StorageRoot::init(dir.path().join("data")).unwrap();
        std::fs::create_dir(layout.running_dir().join("t_a")).unwrap();
        std::fs::create_dir(layout.running_dir().join("t_b")).unwrap();
        std::fs::create_dir(layout.running_dir().join("not-a-task")).unwrap();
        assert_eq!(layout.count_running(), 2);
    }

    #[test]
    fn path_helpers_are_pure() {
        let dir = tempdir().unwrap();
        let layout = StorageRoot::init(dir.path().join("data")).unwrap();
        let id = TaskId::from_raw("t_fixed");
        assert_eq!(
            layout.running_task_dir(&id),
            layout.running_dir().join("t_fixed")
        );
        assert_eq!(
            layout.completed_task_dir(&id),
            layout.completed_dir().join("t_fixed")
        );
        assert_eq!(layout.log_path(&id), layout.logs_dir().join("t_fixed.txt"));
    }
}
