// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC 2.0 envelopes and line framing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Requests larger than this are rejected as parse errors.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

pub const ERR_PARSE: i64 = -32700;
pub const ERR_INVALID_REQUEST: i64 = -32600;
pub const ERR_METHOD_NOT_FOUND: i64 = -32601;
pub const ERR_INVALID_PARAMS: i64 = -32602;
pub const ERR_INTERNAL: i64 = -32603;

/// Errors from connection framing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,

    #[error("request timeout")]
    Timeout,

    #[error("request line exceeds {MAX_LINE_BYTES} bytes")]
    Oversized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request id: JSON-RPC allows numbers and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    String(String),
}

/// An incoming request line, already JSON-decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn new(id: i64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(RpcId::Number(id)),
            method: method.into(),
            params,
        }
    }

    /// Notifications carry no id and get no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Decode `params` into a typed struct, mapping failures to the
    /// invalid-params error with the decode message attached.
    pub fn parse_params<T: serde::de::DeserializeOwned>(&self) -> Result<T, RpcError> {
        let value = self.params.clone().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| RpcError::invalid_params(format!("invalid params: {e}")))
    }
}

/// A structured RPC error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ERR_PARSE, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ERR_INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(ERR_METHOD_NOT_FOUND, format!("unknown method: {method}"))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ERR_INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ERR_INTERNAL, message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// An outgoing response line. Exactly one of `result`/`error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn result(id: Option<RpcId>, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    pub fn error(id: Option<RpcId>, error: RpcError) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: None, error: Some(error) }
    }
}

/// Read one request line with a timeout.
///
/// The read itself is capped at [`MAX_LINE_BYTES`]: an unterminated or
/// oversized line stops buffering at the cap and errors instead of
/// growing without bound. Returns `Ok(None)` for lines that fail to
/// decode — the caller answers those with a parse error rather than
/// dropping the connection.
pub async fn read_request<R>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Option<RpcRequest>, ProtocolError>
where
    R: AsyncBufReadExt + Unpin,
{
    // Cap leaves room for the payload plus its newline; a line still
    // unterminated at the cap is oversized.
    let mut limited = reader.take(MAX_LINE_BYTES as u64 + 2);
    let mut line = String::new();
    let n = tokio::time::timeout(timeout, limited.read_line(&mut line))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    if n == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    let payload = line.trim_end();
    if payload.len() > MAX_LINE_BYTES {
        return Err(ProtocolError::Oversized);
    }
    Ok(serde_json::from_str(payload).ok())
}

/// Write one newline-terminated response.
pub async fn write_response<W>(
    writer: &mut W,
    response: &RpcResponse,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_vec(response).map_err(|e| {
        ProtocolError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod rpc_tests;
