//! Multi-task join primitive.
//!
//! The MultiTaskWaiter runs any number of independently scheduled async
//! actions and resolves once every one of them has reported, reducing
//! their outcomes to a single success flag.

use crate::scheduler::Scheduler;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

/// One unit of asynchronous work reporting success or failure.
pub type Action = Box<dyn FnOnce() -> LocalBoxFuture<'static, bool>>;

/// Completion bookkeeping shared with the running actions.
#[derive(Debug, Default)]
struct Progress {
    finished: Cell<usize>,
    failed: Cell<bool>,
}

/// Joins a set of async actions.
///
/// Actions are registered with [`add_task`](Self::add_task) and launched
/// together by [`start_wait`](Self::start_wait). A failing action does not
/// cancel its siblings: all of them run to completion and the aggregate is
/// the logical AND of their results. There is no cancellation.
pub struct MultiTaskWaiter {
    scheduler: Scheduler,
    actions: Vec<Action>,
    total: usize,
    started: bool,
    progress: Rc<Progress>,
}

impl MultiTaskWaiter {
    /// Create an empty waiter whose actions run on `scheduler`.
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            actions: Vec::new(),
            total: 0,
            started: false,
            progress: Rc::new(Progress::default()),
        }
    }

    /// Register an action to run on start.
    ///
    /// # Returns
    ///
    /// `false` if the waiter has already started; the action is dropped.
    pub fn add_task<F, Fut>(&mut self, action: F) -> bool
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = bool> + 'static,
    {
        if self.started {
            return false;
        }
        self.actions.push(Box::new(move || action().boxed_local()));
        self.total += 1;
        true
    }

    pub fn has_task(&self) -> bool {
        self.total > 0
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of actions that have reported so far.
    pub fn finished_count(&self) -> usize {
        self.progress.finished.get()
    }

    /// Launch every action and call `on_done` with the aggregate result.
    ///
    /// A second start fails closed: `on_done(false)` is called immediately.
    /// With no actions registered, `on_done(true)` is called immediately.
    pub fn start_wait<F>(&mut self, on_done: F)
    where
        F: FnOnce(bool) + 'static,
    {
        match self.launch() {
            Some(wait) => self.scheduler.spawn(async move { on_done(wait.await) }),
            None => on_done(false),
        }
    }

    /// Launch every action and return a future of the aggregate result.
    ///
    /// A second start resolves to `false` immediately.
    pub fn start_wait_async(&mut self) -> LocalBoxFuture<'static, bool> {
        self.launch()
            .unwrap_or_else(|| future::ready(false).boxed_local())
    }

    fn launch(&mut self) -> Option<LocalBoxFuture<'static, bool>> {
        if self.started {
            return None;
        }
        self.started = true;

        for action in std::mem::take(&mut self.actions) {
            let progress = Rc::clone(&self.progress);
            self.scheduler.spawn(async move {
                let succeeded = action().await;
                progress.finished.set(progress.finished.get() + 1);
                if !succeeded {
                    progress.failed.set(true);
                }
            });
        }

        let total = self.total;
        let progress = Rc::clone(&self.progress);
        let scheduler = self.scheduler.clone();
        Some(
            async move {
                scheduler
                    .wait_until(|| progress.finished.get() >= total)
                    .await;
                !progress.failed.get()
            }
            .boxed_local(),
        )
    }
}
