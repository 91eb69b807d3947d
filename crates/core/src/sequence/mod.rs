//! Sequencing of lifecycle objects.
//!
//! A [`State`] is a lifecycle object that can ask its owner to advance to
//! another state, push a child state on top of itself, or end. The
//! [`StateMachine`] owns a stack of states and interprets those requests;
//! the [`StateStub`] stands in for a machine when one state is run alone.

mod machine;
mod state;
mod stub;

pub use machine::{FinishCallback, MachineHooks, MachineSetting, StateMachine};
pub use state::{
    Sequencable, Signals, State, StateBehavior, StateContext, StateHooks, StateRef, StateSetting,
};
pub use stub::{ResultCallback, StateStub, StubHooks, StubResult, StubSetting};
