// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Duration;
use patrol_core::test_support::{
    definition, epoch, mission_run, robot, step, task,
};
use patrol_core::{StepType, TaskType};

fn state_with_run() -> FleetState {
    let mut state = FleetState::default();
    state.insert_robot(robot("robot-1", "R7", "SITE-A"));
    let mut run = mission_run("run-1", "M100", "robot-1");
    let mut t = task("T1", TaskType::Inspection);
    t.steps.push(step("S1", StepType::TakeImage));
    run.tasks.push(t);
    state.runs.insert(run.id.clone(), run);
    state
}

#[test]
fn robot_by_agent_and_installation_by_name() {
    let mut state = state_with_run();
    state
        .installations
        .insert("SITE-A".into(), Installation::new("SITE-A", "Johan Sverdrup"));

    assert!(state.robot_by_agent(&AgentId::new("R7")).is_some());
    assert!(state.robot_by_agent(&AgentId::new("R8")).is_none());
    assert!(state.installation_by_name("johan sverdrup").is_some());
    assert!(state.installation_by_name("site-a").is_some());
    assert!(state.installation_by_name("SITE-B").is_none());
}

#[test]
fn run_by_external_prefers_live_run() {
    let mut state = state_with_run();
    let mut old = mission_run("run-0", "M100", "robot-1");
    old.status = MissionStatus::Failed;
    old.created_at = epoch() + Duration::hours(1);
    state.runs.insert(old.id.clone(), old);

    let found = state.run_by_external(&ExternalMissionId::new("M100")).unwrap();
    assert_eq!(found.id, "run-1");
}

#[test]
fn transition_run_is_compare_and_set() {
    let mut state = state_with_run();
    let id = MissionRunId::new("run-1");
    let at = epoch() + Duration::minutes(5);

    let applied = state
        .transition_run(&id, MissionStatus::Pending, MissionStatus::InProgress, at)
        .unwrap();
    let RunTransition::Applied(run) = applied else {
        panic!("expected applied transition");
    };
    assert_eq!(run.started_at, Some(at));
    assert_eq!(run.ended_at, None);

    let stale = state
        .transition_run(&id, MissionStatus::Pending, MissionStatus::Failed, at)
        .unwrap();
    assert!(matches!(stale, RunTransition::Stale(r) if r.status == MissionStatus::InProgress));

    let done = state
        .transition_run(&id, MissionStatus::InProgress, MissionStatus::Failed, at)
        .unwrap();
    assert!(matches!(done, RunTransition::Applied(r) if r.ended_at == Some(at)));

    assert!(state
        .transition_run(&MissionRunId::new("nope"), MissionStatus::Pending, MissionStatus::Failed, at)
        .is_none());
}

#[test]
fn clear_mission_only_clears_matching_run() {
    let mut state = state_with_run();
    let robot_id = RobotId::new("robot-1");
    state.assign_mission(&robot_id, &MissionRunId::new("run-2")).unwrap();

    assert_eq!(state.clear_mission(&robot_id, &MissionRunId::new("run-1")), Some(false));
    assert_eq!(state.clear_mission(&robot_id, &MissionRunId::new("run-2")), Some(true));
    assert!(state.robots[&robot_id].current_mission_run.is_none());
    assert_eq!(state.clear_mission(&RobotId::new("ghost"), &MissionRunId::new("run-2")), None);
}

#[test]
fn task_and_step_updates_report_changes() {
    let mut state = state_with_run();
    let at = epoch();
    let task_id = ExternalTaskId::new("T1");
    let step_id = ExternalStepId::new("S1");

    assert_eq!(state.update_task_status(&task_id, TaskStatus::InProgress, at), Some(true));
    assert_eq!(state.update_task_status(&task_id, TaskStatus::InProgress, at), Some(false));
    assert_eq!(
        state.update_task_status(&ExternalTaskId::new("T9"), TaskStatus::Failed, at),
        None
    );

    assert_eq!(state.update_step_status(&step_id, StepStatus::Successful), Some(true));
    assert_eq!(state.update_step_status(&step_id, StepStatus::Successful), Some(false));
    assert_eq!(state.update_step_status(&ExternalStepId::new("S9"), StepStatus::Failed), None);

    let t = &state.runs[&MissionRunId::new("run-1")].tasks[0];
    assert_eq!(t.started_at, Some(at));
    assert_eq!(t.steps[0].status, StepStatus::Successful);
}

#[test]
fn add_skip_prunes_past_exceptions() {
    let mut state = FleetState::default();
    let def = definition("def-1", "SITE-A");
    state.definitions.insert(def.id.clone(), def);
    let id = MissionDefinitionId::new("def-1");

    let yesterday = SkipException::at(epoch() - Duration::days(1));
    let tomorrow = SkipException::at(epoch() + Duration::days(1));
    state.definitions.get_mut(&id).unwrap().skip_exceptions.push(yesterday);

    let updated = state.add_skip(&id, tomorrow, epoch()).unwrap();
    assert_eq!(updated.skip_exceptions, vec![tomorrow]);

    let again = state.add_skip(&id, tomorrow, epoch()).unwrap();
    assert_eq!(again.skip_exceptions.len(), 1);
}

#[test]
fn dispatch_marker_claims_each_occurrence_once() {
    let mut state = FleetState::default();
    let def = definition("def-1", "SITE-A");
    state.definitions.insert(def.id.clone(), def);
    let id = MissionDefinitionId::new("def-1");
    let first = epoch() + Duration::hours(8);
    let second = first + Duration::days(1);

    assert_eq!(state.mark_dispatched(&id, first), Some(true));
    assert_eq!(state.mark_dispatched(&id, first), Some(false));
    assert_eq!(state.mark_dispatched(&id, second), Some(true));

    assert_eq!(state.release_dispatched(&id, second, Some(first)), Some(true));
    assert_eq!(state.definitions[&id].last_dispatched, Some(first));
    assert_eq!(state.release_dispatched(&id, second, Some(first)), Some(false));
    assert_eq!(state.mark_dispatched(&id, second), Some(true));
}

#[test]
fn robot_claim_holds_until_released_assigned_or_stale() {
    let mut state = state_with_run();
    let robot_id = RobotId::new("robot-1");
    let morning = epoch() + Duration::hours(8);
    let claim = PendingDispatch {
        definition_id: MissionDefinitionId::new("def-1"),
        occurrence: morning,
        dispatched_at: morning,
    };
    let other = PendingDispatch {
        definition_id: MissionDefinitionId::new("def-2"),
        ..claim.clone()
    };

    assert_eq!(state.claim_robot(&robot_id, claim.clone(), epoch()), Some(true));
    assert_eq!(state.claim_robot(&robot_id, other.clone(), epoch()), Some(false));
    assert_eq!(state.release_robot(&robot_id, &other), Some(false));
    assert_eq!(state.release_robot(&robot_id, &claim), Some(true));
    assert!(state.robots[&robot_id].pending_dispatch.is_none());

    assert_eq!(state.claim_robot(&robot_id, claim.clone(), epoch()), Some(true));
    let later = morning + Duration::hours(1);
    assert_eq!(state.claim_robot(&robot_id, other.clone(), later), Some(true));
    assert_eq!(state.robots[&robot_id].pending_dispatch, Some(other));

    state.assign_mission(&robot_id, &MissionRunId::new("run-1")).unwrap();
    assert!(state.robots[&robot_id].pending_dispatch.is_none());
    assert_eq!(state.claim_robot(&RobotId::new("ghost"), claim, epoch()), None);
}

#[test]
fn terminal_runs_for_model_newest_first() {
    let mut state = state_with_run();
    let mut other = robot("robot-2", "R8", "SITE-A");
    other.robot_type = "anymal".into();
    state.insert_robot(other);

    for (i, robot_id) in [(1, "robot-1"), (2, "robot-1"), (3, "robot-2")] {
        let mut run = mission_run(&format!("done-{i}"), &format!("X{i}"), robot_id);
        run.status = MissionStatus::Successful;
        run.ended_at = Some(epoch() + Duration::hours(i));
        state.runs.insert(run.id.clone(), run);
    }

    let runs = state.terminal_runs_for_model("taurob", 10);
    let ids: Vec<_> = runs.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["done-2", "done-1"]);
    assert_eq!(state.terminal_runs_for_model("taurob", 1).len(), 1);
}

#[test]
fn robot_patch_applies_only_set_fields() {
    let mut state = state_with_run();
    let id = RobotId::new("robot-1");
    let patch = RobotPatch {
        port: Some(4000),
        current_area: Some(Some(AreaId::new("deck-a"))),
        ..RobotPatch::default()
    };
    assert!(!patch.is_empty());
    let robot = state.patch_robot(&id, patch).unwrap();
    assert_eq!(robot.port, 4000);
    assert_eq!(robot.host, "10.0.0.7");
    assert_eq!(robot.current_area, Some(AreaId::new("deck-a")));
    assert!(RobotPatch::default().is_empty());
}
