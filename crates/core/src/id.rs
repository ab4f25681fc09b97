// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identity

use std::borrow::Borrow;
use std::fmt;

/// The prefix every task directory name (and therefore every `TaskId`) carries.
///
/// The registry uses this prefix to distinguish task directories from any
/// other entry that might end up under `running/`.
pub const TASK_ID_PREFIX: &str = "t_";

/// Opaque task identity of the form `t_<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh, globally unique task id.
    pub fn new() -> Self {
        Self(format!("{TASK_ID_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    /// Wraps an existing string as a `TaskId` without validation.
    ///
    /// Used when reconstructing an id from a path component already known to
    /// live under `running/` or `completed/`.
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a directory/file name looks like a task id, per the `t_` prefix rule.
    pub fn looks_like_task_name(name: &str) -> bool {
        name.starts_with(TASK_ID_PREFIX)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
