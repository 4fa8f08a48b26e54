// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The real WM connection.
//!
//! Two Unix streams: one request/reply channel guarded by a mutex, one
//! subscribed event channel drained by a reader task. A monitor task
//! probes `get_tree` every 5 s; on failure the connection flips down
//! and a reconnect loop with exponential backoff takes over. While
//! down, commands queue up to a bounded depth (oldest dropped) and
//! drain after reconnect.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use i3pm_core::{OutputEvent, TickEvent, WindowEvent, WmEvent, WorkspaceEvent};

use super::codec::{self, event_type, Frame, MessageType};
use super::tree::{OutputInfo, TreeNode, WorkspaceInfo};
use super::{IpcError, SwayApi};
use crate::env;

/// Backoff policy for reconnect attempts.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Per-attempt connect timeout.
    pub attempt_timeout: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2,
            max_attempts: env::reconnect_max_attempts(),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

/// Commands held while the connection is down.
const COMMAND_QUEUE_DEPTH: usize = 64;

const SUBSCRIBE_PAYLOAD: &str = r#"["window", "workspace", "output", "tick"]"#;

struct RequestChannel {
    stream: UnixStream,
}

impl RequestChannel {
    async fn roundtrip(&mut self, message_type: MessageType, payload: &[u8]) -> Result<Frame, IpcError> {
        let (mut reader, mut writer) = self.stream.split();
        codec::write_frame(&mut writer, message_type, payload).await?;
        // Replies arrive in request order on this channel; events only
        // flow on the subscription stream.
        codec::read_frame(&mut reader).await
    }
}

struct ClientShared {
    socket_path: PathBuf,
    request: Mutex<Option<RequestChannel>>,
    connected: AtomicBool,
    pending_commands: Mutex<VecDeque<String>>,
    request_timeout: Duration,
}

/// Handle to the WM connection, cloneable across tasks.
pub struct SwayClient {
    shared: Arc<ClientShared>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
}

impl SwayClient {
    /// Discover the socket and open both channels, returning the client
    /// and the stream of subscribed events.
    pub async fn connect(
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<(Self, mpsc::Receiver<WmEvent>), IpcError> {
        let socket_path = discover_socket().await?;
        info!(socket = %socket_path.display(), "connecting to WM");

        let request = open_request_channel(&socket_path).await?;
        let event_stream = open_event_channel(&socket_path).await?;

        let shared = Arc::new(ClientShared {
            socket_path,
            request: Mutex::new(Some(request)),
            connected: AtomicBool::new(true),
            pending_commands: Mutex::new(VecDeque::new()),
            request_timeout: env::ipc_timeout(),
        });

        let (event_tx, event_rx) = mpsc::channel(256);
        let client = Self { shared, reconnect, cancel };
        client.spawn_event_reader(event_stream, event_tx);
        Ok((client, event_rx))
    }

    /// Spawn the background health probe. Runs until cancelled; on a
    /// failed probe the connection flips down and `on_down` fires.
    pub fn spawn_monitor<F>(&self, on_down: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        let interval = env::probe_interval();
        let timeout = env::probe_timeout();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                if !shared.connected.load(Ordering::SeqCst) {
                    continue;
                }
                let probe = roundtrip_value(&shared, MessageType::GetTree, b"", timeout).await;
                if let Err(e) = probe {
                    warn!(error = %e, "health probe failed; marking connection down");
                    shared.connected.store(false, Ordering::SeqCst);
                    on_down();
                }
            }
        });
    }

    /// Reconnect with exponential backoff. On success the event stream
    /// is re-subscribed and a fresh tree is returned for index rebuild.
    pub async fn reconnect(&self) -> Result<(TreeNode, mpsc::Receiver<WmEvent>), IpcError> {
        let mut delay = self.reconnect.initial_delay;
        let mut attempt: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(IpcError::Disconnected);
            }
            attempt += 1;
            if let Some(max) = self.reconnect.max_attempts {
                if attempt > max {
                    error!(attempts = max, "reconnect attempts exhausted");
                    return Err(IpcError::Disconnected);
                }
            }

            info!(attempt, delay_secs = delay.as_secs_f64(), "reconnecting to WM");
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(IpcError::Disconnected),
                _ = tokio::time::sleep(delay) => {}
            }

            match self.try_reconnect().await {
                Ok(result) => {
                    info!(attempt, "reconnected to WM");
                    return Ok(result);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "reconnect attempt failed");
                    delay = (delay * self.reconnect.multiplier).min(self.reconnect.max_delay);
                }
            }
        }
    }

    async fn try_reconnect(&self) -> Result<(TreeNode, mpsc::Receiver<WmEvent>), IpcError> {
        let timeout = self.reconnect.attempt_timeout;
        let socket_path = discover_socket().await.unwrap_or_else(|_| self.shared.socket_path.clone());

        let request = tokio::time::timeout(timeout, open_request_channel(&socket_path))
            .await
            .map_err(|_| IpcError::Timeout)??;
        let event_stream = tokio::time::timeout(timeout, open_event_channel(&socket_path))
            .await
            .map_err(|_| IpcError::Timeout)??;

        *self.shared.request.lock().await = Some(request);
        self.shared.connected.store(true, Ordering::SeqCst);

        let (event_tx, event_rx) = mpsc::channel(256);
        self.spawn_event_reader(event_stream, event_tx);

        self.drain_pending().await;

        let tree = self.get_tree().await?;
        Ok((tree, event_rx))
    }

    async fn drain_pending(&self) {
        let drained: Vec<String> = {
            let mut pending = self.shared.pending_commands.lock().await;
            pending.drain(..).collect()
        };
        if drained.is_empty() {
            return;
        }
        info!(count = drained.len(), "draining queued commands after reconnect");
        for command in drained {
            if let Err(e) = self.run_command(&command).await {
                warn!(command = command.as_str(), error = %e, "queued command failed");
            }
        }
    }

    /// Cooperative teardown: cancels the reader and monitor tasks and
    /// drops the request channel.
    pub async fn disconnect(&self) {
        self.cancel.cancel();
        self.shared.connected.store(false, Ordering::SeqCst);
        *self.shared.request.lock().await = None;
    }

    fn spawn_event_reader(&self, mut stream: UnixStream, tx: mpsc::Sender<WmEvent>) {
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                let frame = tokio::select! {
                    _ = cancel.cancelled() => return,
                    frame = codec::read_frame(&mut stream) => frame,
                };
                match frame {
                    Ok(frame) if frame.is_event() => {
                        if let Some(event) = decode_event(&frame) {
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(_) => {} // subscribe ack or stray reply
                    Err(e) => {
                        warn!(error = %e, "event stream error; marking connection down");
                        shared.connected.store(false, Ordering::SeqCst);
                        // Closing the channel signals the supervisor.
                        return;
                    }
                }
            }
        });
    }
}

#[async_trait]
impl SwayApi for SwayClient {
    async fn run_command(&self, command: &str) -> Result<(), IpcError> {
        if !self.is_connected() {
            let mut pending = self.shared.pending_commands.lock().await;
            if pending.len() >= COMMAND_QUEUE_DEPTH {
                let dropped = pending.pop_front();
                warn!(dropped = ?dropped, "command queue full; dropping oldest");
            }
            pending.push_back(command.to_string());
            debug!(command, "queued command while disconnected");
            return Err(IpcError::Disconnected);
        }

        let value = roundtrip_value(
            &self.shared,
            MessageType::RunCommand,
            command.as_bytes(),
            self.shared.request_timeout,
        )
        .await?;

        // Reply is a list of {success, error?} records.
        if let Some(results) = value.as_array() {
            for result in results {
                if result.get("success").and_then(Value::as_bool) != Some(true) {
                    let message = result
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string();
                    return Err(IpcError::CommandFailed(message));
                }
            }
        }
        Ok(())
    }

    async fn get_tree(&self) -> Result<TreeNode, IpcError> {
        let value = roundtrip_value(
            &self.shared,
            MessageType::GetTree,
            b"",
            self.shared.request_timeout,
        )
        .await?;
        serde_json::from_value(value).map_err(|e| IpcError::Protocol(format!("get_tree: {e}")))
    }

    async fn get_workspaces(&self) -> Result<Vec<WorkspaceInfo>, IpcError> {
        let value = roundtrip_value(
            &self.shared,
            MessageType::GetWorkspaces,
            b"",
            self.shared.request_timeout,
        )
        .await?;
        serde_json::from_value(value)
            .map_err(|e| IpcError::Protocol(format!("get_workspaces: {e}")))
    }

    async fn get_outputs(&self) -> Result<Vec<OutputInfo>, IpcError> {
        let value = roundtrip_value(
            &self.shared,
            MessageType::GetOutputs,
            b"",
            self.shared.request_timeout,
        )
        .await?;
        serde_json::from_value(value).map_err(|e| IpcError::Protocol(format!("get_outputs: {e}")))
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }
}

async fn roundtrip_value(
    shared: &ClientShared,
    message_type: MessageType,
    payload: &[u8],
    timeout: Duration,
) -> Result<Value, IpcError> {
    let mut guard = shared.request.lock().await;
    let Some(channel) = guard.as_mut() else {
        return Err(IpcError::Disconnected);
    };

    let frame = match tokio::time::timeout(timeout, channel.roundtrip(message_type, payload)).await
    {
        Ok(Ok(frame)) => frame,
        Ok(Err(e)) => {
            shared.connected.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Err(_) => {
            shared.connected.store(false, Ordering::SeqCst);
            return Err(IpcError::Timeout);
        }
    };

    serde_json::from_slice(&frame.payload)
        .map_err(|e| IpcError::Protocol(format!("bad reply payload: {e}")))
}

async fn open_request_channel(socket_path: &Path) -> Result<RequestChannel, IpcError> {
    let stream = UnixStream::connect(socket_path).await?;
    Ok(RequestChannel { stream })
}

/// Open a stream and subscribe it to the event set.
async fn open_event_channel(socket_path: &Path) -> Result<UnixStream, IpcError> {
    let mut stream = UnixStream::connect(socket_path).await?;
    let (mut reader, mut writer) = stream.split();
    codec::write_frame(&mut writer, MessageType::Subscribe, SUBSCRIBE_PAYLOAD.as_bytes()).await?;
    let ack = codec::read_frame(&mut reader).await?;
    let ok = serde_json::from_slice::<Value>(&ack.payload)
        .ok()
        .and_then(|v| v.get("success").and_then(Value::as_bool))
        .unwrap_or(false);
    if !ok {
        return Err(IpcError::Protocol("subscribe rejected".to_string()));
    }
    Ok(stream)
}

fn decode_event(frame: &Frame) -> Option<WmEvent> {
    let result = match frame.event_type() {
        event_type::WINDOW => {
            serde_json::from_slice::<WindowEvent>(&frame.payload).map(WmEvent::Window)
        }
        event_type::WORKSPACE => {
            serde_json::from_slice::<WorkspaceEvent>(&frame.payload).map(WmEvent::Workspace)
        }
        event_type::OUTPUT => {
            serde_json::from_slice::<OutputEvent>(&frame.payload).map(WmEvent::Output)
        }
        event_type::TICK => serde_json::from_slice::<TickEvent>(&frame.payload).map(WmEvent::Tick),
        other => {
            debug!(event_type = other, "ignoring unsubscribed event");
            return None;
        }
    };
    match result {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "undecodable event payload");
            None
        }
    }
}

/// `I3SOCK`/`SWAYSOCK`, else ask the binaries.
async fn discover_socket() -> Result<PathBuf, IpcError> {
    if let Some(path) = env::wm_socket_from_env() {
        return Ok(path);
    }
    for binary in ["i3", "sway"] {
        if let Some(path) = socket_path_from(binary).await {
            return Ok(path);
        }
    }
    Err(IpcError::SocketNotFound)
}

async fn socket_path_from(binary: &str) -> Option<PathBuf> {
    let output = tokio::process::Command::new(binary)
        .arg("--get-socketpath")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8(output.stdout).ok()?;
    let path = path.trim();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}
