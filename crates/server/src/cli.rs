// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line flags
//!
//! The only settings a module's operator can override at launch: host,
//! port, and debug verbosity. Everything else (api version, module name,
//! storage root, capacity) is the module author's own [`modhost_core::ModuleConfig`].

use clap::Parser;
use modhost_core::ModuleConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "modhost", about = "A module host for long-running compute tasks")]
pub struct Cli {
    /// Hostname to bind the HTTP server to.
    #[arg(short = 'H', long = "host")]
    pub host: Option<String>,

    /// Port to bind the HTTP server to.
    #[arg(short = 'P', long = "port")]
    pub port: Option<u16>,

    /// Enable verbose HTTP debug logging.
    #[arg(short = 'D', long = "debug")]
    pub debug: bool,

    /// Overrides the module's compiled-in storage root.
    #[arg(short = 's', long = "storage-path")]
    pub storage_path: Option<std::path::PathBuf>,

    /// Overrides the module's compiled-in maximum concurrent RUNNING tasks.
    #[arg(short = 'm', long = "max-tasks")]
    pub max_tasks: Option<usize>,

    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    #[arg(long = "module-name")]
    pub module_name: Option<String>,

    #[arg(long = "implementation-name")]
    pub implementation_name: Option<String>,
}

impl Cli {
    /// Resolves `host`/`port` against the module's configured defaults.
    pub fn resolve(&self, config: &ModuleConfig) -> (String, u16) {
        (
            self.host.clone().unwrap_or_else(|| config.default_host.clone()),
            self.port.unwrap_or(config.default_port),
        )
    }

    /// Applies any flags that override the module author's compiled-in
    /// [`ModuleConfig`], letting one host binary stand in for any module
    /// without recompiling.
    pub fn apply_overrides(&self, mut config: ModuleConfig) -> ModuleConfig {
        if let Some(storage_path) = &self.storage_path {
            config.storage_path = storage_path.clone();
        }
        if let Some(max_tasks) = self.max_tasks {
            config.max_tasks = max_tasks;
        }
        if let Some(api_version) = &self.api_version {
            config.api_version = api_version.clone();
        }
        if let Some(module_name) = &self.module_name {
            config.module_name = module_name.clone();
        }
        if let Some(implementation_name) = &self.implementation_name {
            config.implementation_name = implementation_name.clone();
        }
        config
    }
}
