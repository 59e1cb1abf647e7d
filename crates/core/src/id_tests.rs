// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_display_matches_inner_string() {
    let id = TestId::new("robot-7");
    assert_eq!(id.to_string(), "robot-7");
    assert_eq!(id.as_str(), "robot-7");
}

#[test]
fn define_id_compares_against_str() {
    let id: TestId = "R7".into();
    assert_eq!(id, "R7");
    assert_eq!(id, *"R7");
}

#[test]
fn define_id_borrows_as_str_for_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::new("k"), 42);
    assert_eq!(map.get("k"), Some(&42));

    let id = TestId::new("key");
    let borrowed: &str = id.borrow();
    assert_eq!(borrowed, "key");
}

#[test]
fn define_id_serializes_transparently() {
    let id = TestId::new("serde-test");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"serde-test\"");
    let parsed: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn generate_uses_the_given_generator() {
    let id_gen = SequentialIdGen::new("robot");
    assert_eq!(TestId::generate(&id_gen), "robot-1");
    assert_eq!(TestId::generate(&id_gen), "robot-2");
}

#[test]
fn uuid_gen_creates_unique_ids() {
    let id1 = UuidIdGen.next();
    let id2 = UuidIdGen.next();
    assert_ne!(id1, id2);
    assert_eq!(id1.len(), 36);
}

#[test]
fn sequential_gen_clones_share_a_counter() {
    let id_gen1 = SequentialIdGen::new("shared");
    let id_gen2 = id_gen1.clone();
    assert_eq!(id_gen1.next(), "shared-1");
    assert_eq!(id_gen2.next(), "shared-2");
    assert_eq!(id_gen1.next(), "shared-3");
}
