// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Re-drive policy for transient store failures

use patrol_storage::StoreError;
use std::future::Future;
use std::time::Duration;

/// Bounded retries with linear backoff. Only transient errors are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first; 0 disables retrying
    pub attempts: u32,
    /// Delay before retry `n` is `backoff * n`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 0,
            backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub async fn run<T, F, Fut>(&self, step: &'static str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(e) if e.is_transient() && attempt < self.attempts => {
                    attempt += 1;
                    tracing::warn!(step, attempt, error = %e, "transient failure, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
