// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps agent identifiers and installation names to stored entities

use crate::error::EngineError;
use patrol_core::{AgentId, Installation, Lookup, Robot};
use patrol_storage::Store;

#[derive(Clone)]
pub struct IdentityResolver<S> {
    store: S,
}

impl<S: Store> IdentityResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Robot registered for `agent_id`, if any. Unknown agents are not an error.
    pub async fn robot(&self, agent_id: &AgentId) -> Result<Lookup<Robot>, EngineError> {
        Ok(self.store.robot_by_agent(agent_id).await?)
    }

    /// Like [`robot`](Self::robot), but absence becomes `RobotNotFound`.
    pub async fn require_robot(&self, agent_id: &AgentId) -> Result<Robot, EngineError> {
        self.robot(agent_id)
            .await?
            .found_or_else(|| EngineError::RobotNotFound(agent_id.to_string()))
    }

    pub async fn installation(&self, name: &str) -> Result<Lookup<Installation>, EngineError> {
        Ok(self.store.installation_by_name(name).await?)
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
