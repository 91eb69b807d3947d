//! Single-threaded frame scheduler.
//!
//! All domain logic runs on one logical thread. "Concurrent" work (opening
//! actions, self-tick loops, pollers) is a set of suspended futures that
//! the scheduler polls once per frame. The frame source is external: a game
//! loop, a test, or the tokio [`FrameDriver`] calls [`Scheduler::tick`].
//!
//! Suspension points:
//! - [`Scheduler::next_frame`] / [`Scheduler::delay_frame`]: frame boundaries
//! - [`Scheduler::wait_until`]: a predicate re-checked every frame
//! - [`Scheduler::delay`]: time on the scheduler clock (sum of tick deltas)

mod driver;
mod wait;

pub use driver::{DriverError, FrameDriver};
pub use wait::{Delay, DelayFrame, WaitUntil};

use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use futures::FutureExt;
use sk_protocol::Event;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::task::Context;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Cloneable handle to a frame scheduler.
///
/// Clones share the same task queue, frame counter and clock.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    frame: Cell<u64>,
    clock: Cell<Duration>,
    tasks: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
    events: RefCell<Option<UnboundedSender<Event>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish lifecycle events to `events_tx`.
    pub fn with_events(self, events_tx: UnboundedSender<Event>) -> Self {
        *self.inner.events.borrow_mut() = Some(events_tx);
        self
    }

    /// Send an event to the host, if one is listening.
    pub fn publish(&self, event: Event) {
        let events_tx = self.inner.events.borrow().clone();
        if let Some(events_tx) = events_tx {
            let _ = events_tx.send(event);
        }
    }

    /// Number of frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.inner.frame.get()
    }

    /// Scheduler clock: the sum of all tick deltas.
    pub fn now(&self) -> Duration {
        self.inner.clock.get()
    }

    /// Number of suspended tasks waiting for a future frame.
    pub fn pending(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Run `future` until its first suspension point, then queue the rest.
    ///
    /// This is fire-and-forget: the caller does not get a handle back.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + 'static,
    {
        let mut task = future.boxed_local();
        let mut cx = Context::from_waker(noop_waker_ref());
        if task.poll_unpin(&mut cx).is_pending() {
            self.inner.tasks.borrow_mut().push(task);
        }
    }

    /// Advance one frame and poll every suspended task once.
    ///
    /// Returns the number of tasks still pending. Must not be called from
    /// inside a scheduled task.
    pub fn tick(&self, delta: Duration) -> usize {
        self.inner.frame.set(self.inner.frame.get() + 1);
        self.inner.clock.set(self.inner.clock.get() + delta);

        let mut tasks = std::mem::take(&mut *self.inner.tasks.borrow_mut());
        let mut cx = Context::from_waker(noop_waker_ref());
        tasks.retain_mut(|task| task.poll_unpin(&mut cx).is_pending());

        // Tasks spawned while polling were queued in the meantime.
        let mut queued = self.inner.tasks.borrow_mut();
        tasks.append(&mut queued);
        *queued = tasks;
        queued.len()
    }

    /// Resolves at the next frame boundary.
    pub fn next_frame(&self) -> DelayFrame {
        self.delay_frame(1)
    }

    /// Resolves once `frames` more frames have been ticked.
    pub fn delay_frame(&self, frames: u64) -> DelayFrame {
        DelayFrame::new(self.clone(), self.frame() + frames)
    }

    /// Resolves once `predicate` holds; checked immediately, then every frame.
    pub fn wait_until<P>(&self, predicate: P) -> WaitUntil<P>
    where
        P: Fn() -> bool,
    {
        WaitUntil::new(predicate)
    }

    /// Resolves once `duration` has elapsed on the scheduler clock.
    pub fn delay(&self, duration: Duration) -> Delay {
        Delay::new(self.clone(), self.now() + duration)
    }
}
