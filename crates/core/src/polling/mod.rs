//! Frame-interval polling.

mod poller;

pub use poller::{wait_for, Polling, PollingAction, PollingHooks, PollingSetting};
