// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! i3pmd: the i3/Sway project daemon.

use tracing::error;
use tracing_subscriber::EnvFilter;

use i3pm_daemon::env;
use i3pm_daemon::lifecycle;

fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = env::state_dir();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let appender = tracing_appender::rolling::daily(&log_dir, "daemon.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        None
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _guard = init_tracing();

    if let Err(e) = lifecycle::run().await {
        error!(error = %e, "daemon failed");
        eprintln!("i3pmd: {e}");
        std::process::exit(e.exit_code());
    }
}
