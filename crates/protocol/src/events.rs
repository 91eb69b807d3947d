//! Lifecycle event protocol.
//!
//! Objects publish these events through the scheduler's optional event
//! channel so that hosts (the CLI, tests, tooling) can observe transitions
//! without reaching into object state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle_models::Condition;

/// Events published by lifecycle objects and state machines.
///
/// Uses tagged enum serialization:
/// ```json
/// {
///   "type": "conditionChanged",
///   "payload": {
///     "object_id": "uuid-here",
///     "name": "Battle",
///     "condition": "RUNNING"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// An object's condition has changed.
    ConditionChanged {
        object_id: Uuid,
        name: String,
        condition: Condition,
    },

    /// A state machine pushed a state onto its stack.
    StatePushed {
        machine_id: Uuid,
        state: String,
        /// Stack depth after the push.
        depth: usize,
    },

    /// A state machine popped a state from its stack.
    StatePopped {
        machine_id: Uuid,
        state: String,
        /// Stack depth after the pop.
        depth: usize,
    },

    /// A state machine has closed and reported its outcome.
    MachineFinished { machine_id: Uuid, success: bool },
}

impl Event {
    /// Name of the object or state this event is about, if any.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Event::ConditionChanged { name, .. } => Some(name),
            Event::StatePushed { state, .. } | Event::StatePopped { state, .. } => Some(state),
            Event::MachineFinished { .. } => None,
        }
    }
}
