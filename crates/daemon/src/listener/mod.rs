// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane listener.
//!
//! Accepts connections on the Unix socket and handles each on its own
//! task. A connection reads newline-delimited JSON-RPC requests; every
//! request is forwarded into the engine mailbox so side effects stay
//! serialized on the engine's executor, and the reply is written back
//! as one line. Notifications get no response.

pub(crate) mod methods;

use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tokio::net::UnixListener;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use i3pm_wire::{
    read_request, write_response, ProtocolError, RpcError, RpcRequest, RpcResponse,
};

use crate::engine::EngineMsg;
use crate::env;

/// Bind the control socket, replacing a stale file from a dead daemon.
pub fn bind_socket(path: &Path) -> std::io::Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    UnixListener::bind(path)
}

/// The accept loop. Runs until cancelled.
pub struct Listener {
    socket: UnixListener,
    socket_path: PathBuf,
    engine_tx: mpsc::Sender<EngineMsg>,
    cancel: CancellationToken,
}

impl Listener {
    pub fn new(
        socket: UnixListener,
        socket_path: PathBuf,
        engine_tx: mpsc::Sender<EngineMsg>,
        cancel: CancellationToken,
    ) -> Self {
        Self { socket, socket_path, engine_tx, cancel }
    }

    pub async fn run(self) {
        info!(socket = %self.socket_path.display(), "control socket listening");
        loop {
            let accepted = tokio::select! {
                _ = self.cancel.cancelled() => break,
                accepted = self.socket.accept() => accepted,
            };
            match accepted {
                Ok((stream, _)) => {
                    let engine_tx = self.engine_tx.clone();
                    let cancel = self.cancel.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, engine_tx, cancel).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept failed"),
            }
        }
        // Clean shutdown removes the socket file.
        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            debug!(error = %e, "socket file removal failed");
        }
        info!("control socket closed");
    }
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::ConnectionClosed => debug!("client disconnected"),
        ProtocolError::Timeout => warn!("connection timed out"),
        other => error!(error = %other, "connection error"),
    }
}

async fn handle_connection(
    stream: tokio::net::UnixStream,
    engine_tx: mpsc::Sender<EngineMsg>,
    cancel: CancellationToken,
) -> Result<(), ProtocolError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let timeout = env::ipc_timeout();

    loop {
        let request = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            request = read_request(&mut reader, timeout) => request,
        };
        let request = match request {
            Ok(Some(request)) => request,
            Ok(None) => {
                // Undecodable line: answer with a parse error and move on.
                let response =
                    RpcResponse::error(None, RpcError::parse_error("request is not valid JSON-RPC"));
                write_response(&mut writer, &response).await?;
                continue;
            }
            Err(ProtocolError::Timeout) => continue, // idle connection
            Err(e) => return Err(e),
        };

        let response = route(&engine_tx, request).await;
        if let Some(response) = response {
            write_response(&mut writer, &response).await?;
        }
    }
}

/// Forward a request to the engine and await its reply. Notifications
/// are forwarded but produce no response line.
async fn route(
    engine_tx: &mpsc::Sender<EngineMsg>,
    request: RpcRequest,
) -> Option<RpcResponse> {
    let is_notification = request.is_notification();
    let id = request.id.clone();
    let (reply_tx, reply_rx) = oneshot::channel();

    if engine_tx.send(EngineMsg::Rpc { request, reply: reply_tx }).await.is_err() {
        if is_notification {
            return None;
        }
        return Some(RpcResponse::error(id, RpcError::internal("daemon is shutting down")));
    }

    match reply_rx.await {
        Ok(response) if is_notification => {
            debug!("dropping response to notification");
            let _ = response;
            None
        }
        Ok(response) => Some(response),
        Err(_) => {
            if is_notification {
                None
            } else {
                Some(RpcResponse::error(id, RpcError::internal("engine dropped the request")))
            }
        }
    }
}
