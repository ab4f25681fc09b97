// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single entry point a module author's `main` calls.
//!
//! `run` dispatches on whether this process was re-executed to run one task
//! ([`modhost_engine::is_task_child`]) or should come up as the HTTP host.
//! Both paths share the same binary; only the environment differs.

use crate::cli::Cli;
use crate::http::{router, AppState};
use clap::Parser;
use modhost_core::{ModuleConfig, TaskCallback};
use modhost_storage::StorageRoot;
use tracing_subscriber::EnvFilter;

/// Runs the module host. Never returns: either it serves HTTP until the
/// process is killed, or it runs a single task to completion and exits.
pub fn run(callback: TaskCallback, config: ModuleConfig) -> ! {
    if modhost_engine::is_task_child() {
        // Re-exec'd task children never parse CLI flags, so they log at the
        // default level regardless of whether the host was started with
        // `-D/--debug` — the lifecycle events they emit (`"completed"`) are
        // the same either way.
        setup_logging(false);
        modhost_engine::child::run_as_task_child(callback);
    }

    let cli = Cli::parse();
    setup_logging(cli.debug);
    let config = cli.apply_overrides(config);

    let Ok(exe) = std::env::current_exe() else {
        eprintln!("failed to resolve the current executable path");
        std::process::exit(1);
    };

    let storage = match StorageRoot::init(&config.storage_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to initialize storage root: {e}");
            std::process::exit(1);
        }
    };

    let (host, port) = cli.resolve(&config);
    let debug = cli.debug;
    let state = AppState::new(config, storage, exe);
    let app = router(state, debug);

    let Ok(runtime) = tokio::runtime::Runtime::new() else {
        eprintln!("failed to start the async runtime");
        std::process::exit(1);
    };

    let exit_code = runtime.block_on(async move {
        let addr = format!("{host}:{port}");
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(%addr, %e, "failed to bind");
                return 1;
            }
        };
        tracing::info!(%addr, "module host listening");
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(%e, "server exited with an error");
            return 1;
        }
        0
    });

    std::process::exit(exit_code);
}

fn setup_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
