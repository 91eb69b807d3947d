//! Assertion helpers over published events and hook journals.

use sk_protocol::{Condition, Event};
use tokio::sync::mpsc::UnboundedReceiver;

/// Collect every event published so far.
#[allow(dead_code)]
pub fn drain(events_rx: &mut UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = events_rx.try_recv() {
        events.push(event);
    }
    events
}

/// Conditions an object named `name` went through, in order.
#[allow(dead_code)]
pub fn conditions_of(events: &[Event], name: &str) -> Vec<Condition> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ConditionChanged {
                name: n, condition, ..
            } if n == name => Some(*condition),
            _ => None,
        })
        .collect()
}

/// Stack depth after every push and pop, in order.
#[allow(dead_code)]
pub fn stack_depths(events: &[Event]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::StatePushed { depth, .. } | Event::StatePopped { depth, .. } => Some(*depth),
            _ => None,
        })
        .collect()
}

/// Outcomes reported through `MachineFinished`.
#[allow(dead_code)]
pub fn finish_outcomes(events: &[Event]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::MachineFinished { success, .. } => Some(*success),
            _ => None,
        })
        .collect()
}

/// Assert that `expected` appears in `journal` as a subsequence.
#[allow(dead_code)]
pub fn assert_in_order(journal: &[String], expected: &[&str]) {
    let mut remaining = expected.iter().peekable();
    for entry in journal {
        if remaining.peek().is_some_and(|next| **next == entry.as_str()) {
            remaining.next();
        }
    }
    let missing: Vec<_> = remaining.collect();
    assert!(
        missing.is_empty(),
        "Journal {journal:?} is missing {missing:?} in order"
    );
}
