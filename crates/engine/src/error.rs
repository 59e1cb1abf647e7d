// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use patrol_adapters::DispatchError;
use patrol_core::ParseError;
use patrol_storage::StoreError;
use thiserror::Error;

/// Errors from telemetry handling and scheduling.
///
/// None of these stop event processing: the router logs them and moves on.
/// [`is_not_found`](EngineError::is_not_found) separates expected
/// conditions (warn) from unexpected ones (error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    UnrecognizedStatus(ParseError),
    #[error(transparent)]
    UnrecognizedStepType(ParseError),
    #[error("mission run not found: {0}")]
    RunNotFound(String),
    #[error("robot not found: {0}")]
    RobotNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("inspection step not found: {0}")]
    StepNotFound(String),
    #[error("mission definition not found: {0}")]
    DefinitionNotFound(String),
    #[error("installation not found: {0}")]
    InstallationNotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl EngineError {
    /// Absent entity: expected, logged at warn, never retried.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::RunNotFound(_)
                | EngineError::RobotNotFound(_)
                | EngineError::TaskNotFound(_)
                | EngineError::StepNotFound(_)
                | EngineError::DefinitionNotFound(_)
                | EngineError::InstallationNotFound(_)
        )
    }

    /// Rejected at the boundary before anything was applied.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::UnrecognizedStatus(_)
                | EngineError::UnrecognizedStepType(_)
                | EngineError::InvalidArgument(_)
        )
    }
}
