// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! i3-ipc wire framing.
//!
//! Frame layout: 6-byte magic `i3-ipc`, u32 LE payload length, u32 LE
//! message type, then the JSON payload. Events set the high bit of the
//! type field.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::IpcError;

pub const MAGIC: &[u8; 6] = b"i3-ipc";

/// High bit marks an event frame.
pub const EVENT_MASK: u32 = 0x8000_0000;

/// Payloads larger than this are treated as protocol corruption.
const MAX_PAYLOAD: u32 = 64 * 1024 * 1024;

/// Request/reply message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    RunCommand = 0,
    GetWorkspaces = 1,
    Subscribe = 2,
    GetOutputs = 3,
    GetTree = 4,
    GetMarks = 5,
    GetVersion = 7,
    SendTick = 10,
}

/// Event types, after masking off the event bit.
pub mod event_type {
    pub const WORKSPACE: u32 = 0;
    pub const OUTPUT: u32 = 1;
    pub const WINDOW: u32 = 3;
    pub const TICK: u32 = 7;
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_type: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn is_event(&self) -> bool {
        self.message_type & EVENT_MASK != 0
    }

    /// Event type with the event bit cleared.
    pub fn event_type(&self) -> u32 {
        self.message_type & !EVENT_MASK
    }
}

/// Write one frame.
pub async fn write_frame<W>(
    writer: &mut W,
    message_type: MessageType,
    payload: &[u8],
) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = Vec::with_capacity(14 + payload.len());
    frame.extend_from_slice(MAGIC);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&(message_type as u32).to_le_bytes());
    frame.extend_from_slice(payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame, validating the magic.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, IpcError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 14];
    reader.read_exact(&mut header).await?;

    if &header[0..6] != MAGIC {
        return Err(IpcError::Protocol("bad magic in frame header".to_string()));
    }

    let length = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
    let message_type = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);

    if length > MAX_PAYLOAD {
        return Err(IpcError::Protocol(format!("frame payload too large: {length} bytes")));
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload).await?;

    Ok(Frame { message_type, payload })
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod codec_tests;
