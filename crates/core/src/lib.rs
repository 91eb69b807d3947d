//! # sk-core
//!
//! Lifecycle and sequencing runtime for stage-kit.
//!
//! This crate provides:
//! - A single-threaded frame scheduler and a tokio host driver
//! - Lifecycle objects with asynchronous, multi-part opening
//! - A join primitive aggregating independent async actions
//! - Sequencable states and a stack-based state machine
//! - A frame-interval poller
//! - Configuration loading from `stage-kit.toml`
//!
//! ## Modules
//!
//! - [`scheduler`]: Frame scheduler, suspension points and the host driver
//! - [`task`]: Multi-task join primitive
//! - [`lifecycle`]: Lifecycle objects and their hooks
//! - [`sequence`]: States, the state machine and the state stub
//! - [`polling`]: Frame-interval poller
//! - [`config`]: Configuration loading
//! - [`log`]: Leveled, tagged logger on top of `tracing`
//!
//! ## Example
//!
//! ```rust
//! use sk_core::lifecycle::Lifecycle;
//! use sk_core::scheduler::Scheduler;
//! use sk_core::sequence::{MachineSetting, State, StateBehavior, StateContext, StateMachine, StateSetting};
//! use std::time::Duration;
//!
//! struct Title;
//!
//! impl StateBehavior for Title {
//!     fn on_ready(&self, state: &StateContext<'_>) {
//!         state.end();
//!     }
//! }
//!
//! let scheduler = Scheduler::new();
//! let title = State::instantiate(&scheduler, StateSetting::new(Title));
//! let machine = StateMachine::instantiate(&scheduler, MachineSetting::new(title));
//!
//! machine.open();
//! scheduler.tick(Duration::from_millis(16));
//! assert!(machine.is_closed());
//! ```

pub mod config;
pub mod lifecycle;
pub mod log;
pub mod polling;
pub mod scheduler;
pub mod sequence;
pub mod task;

pub use lifecycle::{Context, Hooks, Lifecycle, Manageable, Setup};
pub use scheduler::{FrameDriver, Scheduler};
pub use task::MultiTaskWaiter;
