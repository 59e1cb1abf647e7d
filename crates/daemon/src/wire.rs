// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON wire format for the telemetry socket.
//!
//! Agents write one telemetry event per line. A client whose line is
//! `{"type":"subscribe"}` instead receives live notifications and dispatch
//! instructions, one per line, until it disconnects.

use patrol_adapters::{DispatchRequest, Notification};
use patrol_core::TelemetryEvent;
use serde::Serialize;
use thiserror::Error;

/// Maximum accepted line length in bytes
pub const MAX_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("line exceeds {MAX_LINE_BYTES} bytes")]
    TooLong,
    #[error("line is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

/// A line received from a client
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Subscribe,
    Telemetry(TelemetryEvent),
}

/// A line sent to subscribers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Notification(Notification),
    Dispatch(DispatchRequest),
}

pub fn decode_line(line: &str) -> Result<Inbound, WireError> {
    if line.len() > MAX_LINE_BYTES {
        return Err(WireError::TooLong);
    }
    let value: serde_json::Value = serde_json::from_str(line)?;
    if value.get("type").and_then(|t| t.as_str()) == Some("subscribe") {
        return Ok(Inbound::Subscribe);
    }
    Ok(Inbound::Telemetry(serde_json::from_value(value)?))
}

/// Decode a raw line as read off the socket, newline already stripped.
pub fn decode_bytes(line: &[u8]) -> Result<Inbound, WireError> {
    if line.len() > MAX_LINE_BYTES {
        return Err(WireError::TooLong);
    }
    decode_line(std::str::from_utf8(line)?)
}

/// Serialize with a trailing newline
pub fn encode_line(message: &Outbound) -> Result<String, WireError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
