// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{DispatchAdapter, DispatchError, DispatchRequest};
use async_trait::async_trait;

/// Dispatch adapter that accepts and discards every instruction
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpDispatchAdapter;

impl NoOpDispatchAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DispatchAdapter for NoOpDispatchAdapter {
    async fn start_mission(&self, _request: DispatchRequest) -> Result<(), DispatchError> {
        Ok(())
    }
}
