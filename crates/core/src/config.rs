// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host configuration
//!
//! Mirrors the parameters a module author supplies when starting the host
//! (api version, module identity, storage root, concurrency cap) plus the
//! network settings the CLI can override at launch.

use std::path::PathBuf;

/// Configuration a module author supplies when embedding the host.
///
/// `storage_path`, `max_tasks`, and the default host/port are compiled into
/// the module binary by its author, the same way the original module
/// host took them as parameters to its `start()` call. Network settings can
/// still be overridden on the command line (`-H`, `-P`, `-D`); see
/// `modhost-server::cli`.
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    pub api_version: String,
    pub module_name: String,
    pub implementation_name: String,
    /// Absolute or relative path to the storage root; wiped and recreated at startup.
    pub storage_path: PathBuf,
    /// Maximum number of simultaneously RUNNING tasks. `0` means unbounded.
    pub max_tasks: usize,
    pub default_host: String,
    pub default_port: u16,
}

impl ModuleConfig {
    /// `storage_path` defaults to `./data`; override it with
    /// [`ModuleConfig::with_storage_path`] or `-s/--storage-path`.
    pub fn new(
        api_version: impl Into<String>,
        module_name: impl Into<String>,
        implementation_name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            module_name: module_name.into(),
            implementation_name: implementation_name.into(),
            storage_path: PathBuf::from("./data"),
            max_tasks: 0,
            default_host: "0.0.0.0".to_string(),
            default_port: 5000,
        }
    }

    pub fn with_storage_path(mut self, storage_path: impl Into<PathBuf>) -> Self {
        self.storage_path = storage_path.into();
        self
    }

    pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_unbounded_capacity_and_data_storage_path() {
        let cfg = ModuleConfig::new("1.0", "hw-estimation", "fpl");
        assert_eq!(cfg.max_tasks, 0);
        assert_eq!(cfg.storage_path, PathBuf::from("./data"));
        assert_eq!(cfg.default_host, "0.0.0.0");
        assert_eq!(cfg.default_port, 5000);
    }

    #[test]
    fn builder_methods_override_defaults() {
        let cfg = ModuleConfig::new("1.0", "m", "impl")
            .with_storage_path("/tmp/data")
            .with_max_tasks(2)
            .with_default_port(5022);
        assert_eq!(cfg.storage_path, PathBuf::from("/tmp/data"));
        assert_eq!(cfg.max_tasks, 2);
        assert_eq!(cfg.default_port, 5022);
    }
}
