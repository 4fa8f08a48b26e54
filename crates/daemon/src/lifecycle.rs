// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: startup, task supervision, shutdown.
//!
//! Task tree under one cancellation token: the engine loop, the WM
//! event pump (with its reconnect loop), the control-socket listener,
//! the health probe and the launch expirer. Shutdown cancels the token
//! and gives each task a short grace period.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use fs2::FileExt;
use i3pm_config::ConfigPaths;
use i3pm_core::{SystemClock, WmEvent};

use crate::engine::{Engine, EngineConfig, EngineMsg};
use crate::env;
use crate::ipc::{IpcError, ReconnectConfig, SwayClient};
use crate::launch::LaunchRegistry;
use crate::listener::{bind_socket, Listener};
use crate::recovery;
use crate::subproc::ProcessSpawner;

/// Startup failures. `exit_code` maps them onto the documented codes.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another daemon instance holds the lock at {0}")]
    AlreadyRunning(std::path::PathBuf),

    #[error("cannot bind control socket: {0}")]
    SocketBind(std::io::Error),

    #[error("cannot reach the window manager: {0}")]
    WmUnavailable(#[from] IpcError),

    #[error("recovery left unresolved errors: {0:?}")]
    RecoveryIncomplete(Vec<String>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LifecycleError {
    /// 0 healthy, 1 warning, 2 critical.
    pub fn exit_code(&self) -> i32 {
        match self {
            LifecycleError::RecoveryIncomplete(_) => 1,
            _ => 2,
        }
    }
}

/// Run the daemon until SIGINT/SIGTERM.
pub async fn run() -> Result<(), LifecycleError> {
    let state_dir = env::state_dir();
    std::fs::create_dir_all(&state_dir)?;

    // Exclusive pid lock before anything else.
    let lock_path = state_dir.join("daemon.pid");
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| LifecycleError::AlreadyRunning(lock_path.clone()))?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let _lock_file: File = lock_file;

    let cancel = CancellationToken::new();

    // WM connection first: without it there is nothing to manage.
    let (client, event_rx) =
        SwayClient::connect(ReconnectConfig::default(), cancel.clone()).await?;
    let client = Arc::new(client);

    // Engine and registry.
    let paths = ConfigPaths::resolve();
    let clock = SystemClock;
    let registry = Arc::new(LaunchRegistry::new(clock.clone(), env::launch_timeout()));
    LaunchRegistry::spawn_expirer(Arc::clone(&registry), cancel.clone());

    let mut engine = Engine::new(
        Arc::clone(&client),
        Arc::new(ProcessSpawner),
        clock,
        EngineConfig { paths },
        Arc::clone(&registry),
    );

    // Startup recovery: fix what can be fixed, then demand a clean pass.
    let report = recovery::recover(&mut engine).await;
    if !report.is_valid {
        return Err(LifecycleError::RecoveryIncomplete(report.errors));
    }
    for warning in &report.warnings {
        warn!(warning = warning.as_str(), "startup");
    }

    // Control socket.
    let socket_path = env::socket_path();
    let socket = bind_socket(&socket_path).map_err(LifecycleError::SocketBind)?;

    let (engine_tx, engine_rx) = mpsc::channel::<EngineMsg>(256);
    let engine_task = tokio::spawn(engine.run(engine_rx));

    let listener = Listener::new(socket, socket_path, engine_tx.clone(), cancel.clone());
    let listener_task = tokio::spawn(listener.run());

    // Health probe flips the connection down; the pump reacts.
    {
        let engine_tx = engine_tx.clone();
        client.spawn_monitor(move || {
            let _ = engine_tx.try_send(EngineMsg::ConnectionDown);
        });
    }

    let pump_task = tokio::spawn(event_pump(
        Arc::clone(&client),
        event_rx,
        engine_tx.clone(),
        cancel.clone(),
    ));

    info!(pid = std::process::id(), "daemon started");

    wait_for_signal().await;
    info!("shutdown signal received");

    // Orderly teardown: cancel siblings, then nudge the engine loop.
    cancel.cancel();
    client.disconnect().await;
    let _ = engine_tx.send(EngineMsg::Shutdown).await;

    let grace = env::shutdown_grace();
    for (name, task) in [
        ("pump", pump_task),
        ("listener", listener_task),
        ("engine", engine_task),
    ] {
        if tokio::time::timeout(grace, task).await.is_err() {
            warn!(task = name, "task did not stop within grace period");
        }
    }

    info!("daemon stopped");
    Ok(())
}

/// Pump WM events into the engine; on stream loss run the reconnect
/// loop and resume with the fresh subscription.
async fn event_pump(
    client: Arc<SwayClient>,
    mut event_rx: mpsc::Receiver<WmEvent>,
    engine_tx: mpsc::Sender<EngineMsg>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return,
            event = event_rx.recv() => event,
        };
        match event {
            Some(event) => {
                if engine_tx.send(EngineMsg::Event(event)).await.is_err() {
                    return;
                }
            }
            None => {
                // Event stream died: tell the engine, then reconnect.
                let _ = engine_tx.send(EngineMsg::ConnectionDown).await;
                match client.reconnect().await {
                    Ok((tree, new_rx)) => {
                        event_rx = new_rx;
                        if engine_tx.send(EngineMsg::Reconnected(tree)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "reconnect attempts exhausted; exiting");
                        std::process::exit(2);
                    }
                }
            }
        }
    }
}

async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            error!(error = %e, "cannot install SIGTERM handler");
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}
