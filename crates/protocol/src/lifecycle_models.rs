//! Lifecycle condition models.
//!
//! This module defines the condition every lifecycle object moves through,
//! from creation to one of the two terminal conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current lifecycle condition of an object.
///
/// The condition progresses through these states during normal execution:
/// Created -> Opening -> Running <-> Paused -> Finished
///
/// Failed is reachable from Opening, Running and Paused and, like Finished,
/// is terminal.
///
/// The variant order is meaningful: everything from `Running` onwards has
/// finished opening (see [`Condition::is_end_open`]).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    /// Object has been instantiated but not opened yet.
    Created,

    /// Open hook ran; waiting for opening actions to report readiness.
    Opening,

    /// Object is ready and receives ticks.
    Running,

    /// Object is suspended; ticks are not forwarded.
    Paused,

    /// Object has been closed.
    Finished,

    /// Object failed to open, pause or resume.
    Failed,
}

impl Condition {
    /// True for Finished and Failed. No transition leaves a terminal condition.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Condition::Finished | Condition::Failed)
    }

    /// True once opening has settled one way or the other.
    pub const fn is_end_open(self) -> bool {
        matches!(
            self,
            Condition::Running | Condition::Paused | Condition::Finished | Condition::Failed
        )
    }

    /// Stable, human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Condition::Created => "Created",
            Condition::Opening => "Opening",
            Condition::Running => "Running",
            Condition::Paused => "Paused",
            Condition::Finished => "Finished",
            Condition::Failed => "Failed",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
