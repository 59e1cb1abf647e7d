// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot status and robot info handlers

use super::super::Runtime;
use crate::error::EngineError;
use patrol_adapters::{DispatchAdapter, NotifyAdapter};
use patrol_core::{AgentId, Clock, IdGen, RobotInfo, RobotStatus, SchedulerSignal};
use patrol_storage::Store;

impl<S, N, D, C, G> Runtime<S, N, D, C, G>
where
    S: Store,
    N: NotifyAdapter,
    D: DispatchAdapter,
    C: Clock,
    G: IdGen,
{
    pub(crate) async fn handle_robot_status(
        &self,
        agent_id: &AgentId,
        status: RobotStatus,
    ) -> Result<Option<SchedulerSignal>, EngineError> {
        let robot = self.identity.require_robot(agent_id).await?;
        self.reconciler.reconcile_status(&robot, status).await
    }

    /// Robot info only refreshes the registry. A robot created here waits
    /// for its first status report before it is offered work.
    pub(crate) async fn handle_robot_info(
        &self,
        info: &RobotInfo,
    ) -> Result<Option<SchedulerSignal>, EngineError> {
        let robot = self.identity.robot(&info.agent_id).await?;
        self.reconciler.reconcile_info(robot, info).await?;
        Ok(None)
    }
}
