// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use patrol_core::test_support::{installation, robot};
use patrol_storage::MemoryStore;

#[tokio::test]
async fn unknown_agent_is_not_found_not_error() {
    let resolver = IdentityResolver::new(MemoryStore::default());
    let lookup = resolver.robot(&AgentId::new("R7")).await.unwrap();
    assert_eq!(lookup, Lookup::NotFound);

    let err = resolver.require_robot(&AgentId::new("R7")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn resolves_robot_and_installation() {
    let store = MemoryStore::default();
    store.insert_robot(robot("robot-1", "R7", "SITE-A")).await.unwrap();
    store.insert_installation(installation("SITE-A")).await.unwrap();
    let resolver = IdentityResolver::new(store);

    let found = resolver.require_robot(&AgentId::new("R7")).await.unwrap();
    assert_eq!(found.id, "robot-1");
    assert!(resolver.installation("site-a").await.unwrap().is_found());
    assert!(!resolver.installation("SITE-B").await.unwrap().is_found());
}

#[tokio::test]
async fn store_failures_propagate() {
    let store = MemoryStore::default();
    store.fail_next("robot_by_agent", 1);
    let resolver = IdentityResolver::new(store);
    let err = resolver.robot(&AgentId::new("R7")).await.unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));
    assert!(!err.is_not_found());
}
