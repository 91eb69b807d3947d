//! Asynchronous task aggregation.

mod waiter;

pub use waiter::{Action, MultiTaskWaiter};
