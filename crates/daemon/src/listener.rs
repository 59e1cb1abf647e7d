// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the telemetry socket.
//!
//! Each connection is handled in its own task. Telemetry lines are routed
//! to the engine; a subscribing connection additionally receives the
//! outbound stream.
//!
//! Lines are read with a hard cap of [`wire::MAX_LINE_BYTES`]. An overlong
//! line is skipped through its terminating newline without buffering it.

use patrol_engine::{RouterError, RouterHandle};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use patrol_daemon::wire::{self, Inbound, Outbound};

/// Listener task for accepting socket connections.
pub struct Listener {
    socket: UnixListener,
    router: RouterHandle,
    outbound: broadcast::Sender<Outbound>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Router(#[from] RouterError),
}

impl Listener {
    pub fn new(
        socket: UnixListener,
        router: RouterHandle,
        outbound: broadcast::Sender<Outbound>,
    ) -> Self {
        Self {
            socket,
            router,
            outbound,
        }
    }

    /// Run the accept loop, spawning a task for each connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let router = self.router.clone();
                    let outbound = self.outbound.clone();
                    tokio::spawn(async move {
                        match handle_connection(stream, router, outbound).await {
                            Ok(()) => debug!("Client disconnected"),
                            Err(ConnectionError::Router(e)) => warn!("Dropping connection: {}", e),
                            Err(e) => error!("Connection error: {}", e),
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection until it closes.
async fn handle_connection(
    stream: UnixStream,
    router: RouterHandle,
    outbound: broadcast::Sender<Outbound>,
) -> Result<(), ConnectionError> {
    let (reader, writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut writer = Some(writer);
    let mut subscription = None;

    let result = async {
        loop {
            let line = match read_frame(&mut reader).await? {
                Frame::Line(line) => line,
                Frame::Oversized => {
                    warn!(limit = wire::MAX_LINE_BYTES, "discarding oversized line");
                    continue;
                }
                Frame::Closed => break,
            };
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match wire::decode_bytes(&line) {
                Ok(Inbound::Telemetry(event)) => router.route(event).await?,
                Ok(Inbound::Subscribe) => {
                    if let Some(writer) = writer.take() {
                        debug!("client subscribed to outbound stream");
                        subscription = Some(tokio::spawn(stream_outbound(
                            writer,
                            outbound.subscribe(),
                        )));
                    }
                }
                Err(e) => warn!(error = %e, "discarding malformed line"),
            }
        }
        Ok::<(), ConnectionError>(())
    }
    .await;

    if let Some(task) = subscription {
        task.abort();
    }
    result
}

/// One newline-delimited unit read from a client
#[derive(Debug, PartialEq)]
enum Frame {
    Line(Vec<u8>),
    Oversized,
    Closed,
}

/// Read the next line, holding at most one byte past the limit in memory.
async fn read_frame<R>(reader: &mut R) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let limit = wire::MAX_LINE_BYTES as u64 + 1;
    let mut buf = Vec::new();
    let read = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if read == 0 {
        return Ok(Frame::Closed);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        return Ok(Frame::Line(buf));
    }
    if buf.len() <= wire::MAX_LINE_BYTES {
        // Final line without a newline
        return Ok(Frame::Line(buf));
    }

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                break;
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
    Ok(Frame::Oversized)
}

/// Write outbound messages to a subscriber until it goes away.
async fn stream_outbound(mut writer: OwnedWriteHalf, mut rx: broadcast::Receiver<Outbound>) {
    loop {
        let message = match rx.recv().await {
            Ok(message) => message,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "subscriber lagged, messages dropped");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        };
        let line = match wire::encode_line(&message) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            debug!(error = %e, "subscriber disconnected");
            return;
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
