//! Integration tests for lifecycle objects.
//!
//! These tests verify that a lifecycle object:
//! - Moves through its conditions and publishes each change
//! - Rejects operations from illegal conditions without changing state
//! - Waits for all opening actions before becoming ready
//! - Cascades close to registered children, even before it is ready

mod common;

use common::*;
use sk_core::lifecycle::{Lifecycle, Manageable};
use sk_core::scheduler::Scheduler;
use sk_protocol::{Condition, Settings};
use tokio::sync::mpsc;

#[test]
fn test_full_lifecycle_publishes_every_condition() {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new().with_events(events_tx);
    let j = journal();
    let object = Manageable::instantiate(
        &scheduler,
        (Settings::default().with_name_tag("hud"), Probe::new("hud", &j)),
    );

    assert!(object.open());
    assert!(object.pause());
    assert!(object.resume());
    assert!(object.close());

    let events = drain(&mut events_rx);
    assert_eq!(
        conditions_of(&events, "hud"),
        vec![
            Condition::Opening,
            Condition::Running,
            Condition::Paused,
            Condition::Running,
            Condition::Finished,
        ]
    );
    assert_eq!(
        entries(&j),
        vec!["hud:open", "hud:ready", "hud:pause", "hud:resume", "hud:close"]
    );
}

#[test]
fn test_illegal_operations_are_rejected() {
    let scheduler = Scheduler::new();
    let j = journal();
    let object = Manageable::instantiate(&scheduler, (Settings::default(), Probe::new("obj", &j)));

    assert!(!object.pause());
    assert!(!object.resume());
    assert!(!object.close());
    assert_eq!(object.condition(), Condition::Created);

    object.open();
    assert!(!object.open());
    assert!(!object.resume());
    assert_eq!(object.condition(), Condition::Running);

    object.close();
    assert!(!object.close());
    assert!(!object.pause());
    assert!(!object.open());
    assert_eq!(object.condition(), Condition::Finished);
    assert_eq!(entries(&j), vec!["obj:open", "obj:ready", "obj:close"]);
}

#[test]
fn test_open_hook_failure_is_terminal() {
    let scheduler = Scheduler::new();
    let j = journal();
    let object = Manageable::instantiate(
        &scheduler,
        (Settings::default(), Probe::new("obj", &j).failing_open()),
    );

    assert!(!object.open());
    assert!(object.is_failed());

    // A failed object still has to be closed; it stays Failed.
    assert!(object.close());
    assert_eq!(object.condition(), Condition::Failed);
    assert_eq!(entries(&j), vec!["obj:open", "obj:close"]);
}

#[test]
fn test_resume_hook_failure_fails_object() {
    let scheduler = Scheduler::new();
    let j = journal();
    let object = Manageable::instantiate(
        &scheduler,
        (Settings::default(), Probe::new("obj", &j).failing_resume()),
    );
    object.open();
    object.pause();

    assert!(!object.resume());
    assert!(object.is_failed());
    assert!(!object.pause());
}

#[test]
fn test_opening_waits_for_every_action() {
    let scheduler = Scheduler::new();
    let j = journal();
    let probe = Probe::new("loader", &j)
        .with_opening_action(1, true)
        .with_opening_action(3, true);
    let object = Manageable::instantiate(&scheduler, (Settings::default(), probe));

    // open() succeeds before readiness is known.
    assert!(object.open());
    assert_eq!(object.condition(), Condition::Opening);

    run_frames(&scheduler, 2);
    assert_eq!(object.condition(), Condition::Opening);
    assert!(!object.is_end_open());

    run_frames(&scheduler, 1);
    assert!(object.is_running());
    assert_eq!(entries(&j), vec!["loader:open", "loader:ready"]);
}

#[test]
fn test_late_opening_failure_fails_object_without_ready() {
    let scheduler = Scheduler::new();
    let j = journal();
    let probe = Probe::new("loader", &j)
        .with_opening_action(1, true)
        .with_opening_action(2, true)
        .with_opening_action(3, false);
    let object = Manageable::instantiate(&scheduler, (Settings::default(), probe));
    object.open();

    run_frames(&scheduler, 2);
    assert_eq!(object.condition(), Condition::Opening);

    run_frames(&scheduler, 1);
    assert!(object.is_failed());

    run_frames(&scheduler, 3);
    assert!(object.is_failed());
    assert!(!entries(&j).contains(&"loader:ready".to_string()));
}

#[test]
fn test_close_before_ready_cascades_and_ignores_late_readiness() {
    let scheduler = Scheduler::new();
    let j = journal();
    let child = Manageable::instantiate(&scheduler, (Settings::default(), Probe::new("child", &j)));
    let parent_hooks = Probe::new("parent", &j)
        .with_opening_action(5, true)
        .with_child(child.clone());
    let parent = Manageable::instantiate(&scheduler, (Settings::default(), parent_hooks));

    parent.open();
    assert!(child.is_running());
    assert_eq!(parent.condition(), Condition::Opening);

    assert!(parent.close());
    assert_eq!(parent.condition(), Condition::Finished);
    assert_eq!(child.condition(), Condition::Finished);

    run_frames(&scheduler, 6);
    assert_eq!(parent.condition(), Condition::Finished);
    assert_eq!(
        entries(&j),
        vec!["parent:open", "child:open", "child:ready", "parent:close", "child:close"]
    );
}

#[test]
fn test_cascade_close_follows_registration_order() {
    let scheduler = Scheduler::new();
    let j = journal();
    let mut parent_hooks = Probe::new("parent", &j);
    for label in ["a", "b", "c"] {
        let child = Manageable::instantiate(&scheduler, (Settings::default(), Probe::new(label, &j)));
        parent_hooks = parent_hooks.with_child(child);
    }
    let parent = Manageable::instantiate(&scheduler, (Settings::default(), parent_hooks));
    parent.open();
    j.borrow_mut().clear();

    parent.close();

    assert_eq!(
        entries(&j),
        vec!["parent:close", "a:close", "b:close", "c:close"]
    );
}

#[test]
fn test_child_closed_elsewhere_is_not_closed_twice() {
    let scheduler = Scheduler::new();
    let j = journal();
    let child = Manageable::instantiate(&scheduler, (Settings::default(), Probe::new("child", &j)));
    let parent = Manageable::instantiate(
        &scheduler,
        (Settings::default(), Probe::new("parent", &j).with_child(child.clone())),
    );
    parent.open();

    child.close();
    parent.close();

    let closes = entries(&j)
        .iter()
        .filter(|entry| entry.as_str() == "child:close")
        .count();
    assert_eq!(closes, 1);
}

#[test]
fn test_opening_actions_only_accepted_from_open_hook() {
    let scheduler = Scheduler::new();
    let object = Manageable::instantiate(&scheduler, Settings::default());
    object.open();

    assert!(!object.context().add_opening_act(|| async { true }));
}

#[test]
fn test_auto_closer_rejected_after_close() {
    let scheduler = Scheduler::new();
    let parent = Manageable::instantiate(&scheduler, Settings::default());
    let child = Manageable::instantiate(&scheduler, Settings::default());
    parent.open();
    parent.close();

    assert!(!parent.context().set_auto_closer(child.clone(), true));
    assert_eq!(child.condition(), Condition::Created);
}

#[test]
fn test_self_tick_starts_after_opening() {
    let scheduler = Scheduler::new();
    let j = journal();
    let settings = Settings::default().with_self_tick(true);
    let object = Manageable::instantiate(
        &scheduler,
        (settings, Probe::new("ticker", &j).with_opening_action(2, true)),
    );
    object.open();

    run_frames(&scheduler, 2);
    assert!(object.is_running());
    assert_eq!(object.hooks().ticks.get(), 0);

    run_frames(&scheduler, 2);
    assert_eq!(object.hooks().ticks.get(), 2);

    object.close();
    run_frames(&scheduler, 2);
    assert_eq!(object.hooks().ticks.get(), 2);
    assert_eq!(scheduler.pending(), 0);
}
