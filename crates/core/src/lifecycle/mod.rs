//! Lifecycle objects.
//!
//! A lifecycle object moves through Created, Opening, Running and Paused
//! before ending in Finished or Failed. Opening may depend on any number of
//! asynchronous opening actions; closing cascades to registered children.
//!
//! - [`Manageable`]: the generic object, parameterized by its [`Hooks`]
//! - [`Lifecycle`]: object-safe handle used to store objects of any kind
//! - [`Context`]: per-object state handed to hooks
//! - [`Progressable`]: finishes once a watched object reaches a condition

mod context;
mod manageable;
mod progressable;

pub use context::Context;
pub use manageable::{Hooks, Lifecycle, Manageable, Setup};
pub(crate) use manageable::short_type_name;
pub use progressable::{ProgressHooks, ProgressSetting, Progressable};
