// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission run status handler

use super::super::Runtime;
use crate::error::EngineError;
use crate::mission_run::Advance;
use patrol_adapters::{DispatchAdapter, NotifyAdapter};
use patrol_core::{Clock, ExternalMissionId, IdGen, SchedulerSignal};
use patrol_storage::Store;

impl<S, N, D, C, G> Runtime<S, N, D, C, G>
where
    S: Store,
    N: NotifyAdapter,
    D: DispatchAdapter,
    C: Clock,
    G: IdGen,
{
    /// Advance the run; a terminal transition yields the completion signal.
    ///
    /// The duration recompute keeps running in the background.
    pub(crate) async fn handle_mission_status(
        &self,
        mission_id: &ExternalMissionId,
        raw_status: &str,
    ) -> Result<Option<SchedulerSignal>, EngineError> {
        match self.missions.advance_status(mission_id, raw_status).await? {
            Advance::Applied {
                completion: Some(completion),
                ..
            } => Ok(Some(completion.signal)),
            Advance::Applied { .. } | Advance::Unchanged(_) | Advance::Ignored { .. } => Ok(None),
        }
    }
}
