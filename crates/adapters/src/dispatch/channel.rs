// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch adapter that forwards instructions over an mpsc channel.
//!
//! The daemon hands the receiving end to whatever launches missions.

use super::{DispatchAdapter, DispatchError, DispatchRequest};
use async_trait::async_trait;
use tokio::sync::mpsc;

#[derive(Clone, Debug)]
pub struct ChannelDispatchAdapter {
    tx: mpsc::Sender<DispatchRequest>,
}

impl ChannelDispatchAdapter {
    pub fn new(tx: mpsc::Sender<DispatchRequest>) -> Self {
        Self { tx }
    }

    /// Create an adapter together with the receiver for its instructions.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DispatchRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl DispatchAdapter for ChannelDispatchAdapter {
    async fn start_mission(&self, request: DispatchRequest) -> Result<(), DispatchError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| DispatchError::Unavailable("dispatch receiver closed".to_string()))
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
