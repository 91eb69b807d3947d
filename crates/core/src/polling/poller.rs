use crate::lifecycle::{Context, Hooks, Lifecycle, Manageable, Setup};
use crate::scheduler::Scheduler;
use sk_protocol::{Condition, Settings};
use std::cell::{Cell, OnceCell, RefCell};
use std::future::Future;
use std::rc::Weak;
use std::time::Duration;

/// Per-poll callback. Receives the time since the previous poll and
/// returns true to keep polling.
pub type PollingAction = Box<dyn FnMut(Duration) -> bool>;

/// Lifecycle object invoking a callback every N frames until it asks to stop.
pub type Polling = Manageable<PollingHooks>;

const MIN_INTERVAL: u32 = 1;
const MAX_INTERVAL: u32 = 60;

/// Setup for a [`Polling`] object.
pub struct PollingSetting {
    pub base: Settings,
    /// Frames between polls, clamped to 1..=60 on open.
    pub frame_interval: u32,
    /// Opening fails without an action.
    pub action: Option<PollingAction>,
}

impl PollingSetting {
    pub fn new<F>(action: F) -> Self
    where
        F: FnMut(Duration) -> bool + 'static,
    {
        Self {
            action: Some(Box::new(action)),
            ..Self::default()
        }
    }

    pub fn with_frame_interval(mut self, frames: u32) -> Self {
        self.frame_interval = frames;
        self
    }

    pub fn with_settings(mut self, base: Settings) -> Self {
        self.base = base;
        self
    }
}

impl Default for PollingSetting {
    fn default() -> Self {
        Self {
            base: Settings::default(),
            frame_interval: MIN_INTERVAL,
            action: None,
        }
    }
}

impl Setup for PollingSetting {
    type Hooks = PollingHooks;

    fn into_parts(self) -> (Settings, PollingHooks) {
        let hooks = PollingHooks {
            interval: Cell::new(self.frame_interval),
            action: RefCell::new(self.action),
            this: OnceCell::new(),
        };
        (self.base, hooks)
    }
}

pub struct PollingHooks {
    interval: Cell<u32>,
    action: RefCell<Option<PollingAction>>,
    this: OnceCell<Weak<Polling>>,
}

impl PollingHooks {
    /// Frames between polls.
    pub fn frame_interval(&self) -> u32 {
        self.interval.get()
    }

    fn poll(&self, delta: Duration) -> bool {
        let action = self.action.borrow_mut().take();
        let Some(mut action) = action else {
            return false;
        };
        let keep_going = action(delta);
        *self.action.borrow_mut() = Some(action);
        keep_going
    }
}

impl Hooks for PollingHooks {
    fn default_name(&self) -> String {
        "Polling".to_string()
    }

    fn attach(&self, this: &Weak<Polling>) {
        let _ = self.this.set(this.clone());
    }

    fn on_open(&self, cx: &Context) -> bool {
        if self.action.borrow().is_none() {
            cx.logger().error("No polling action set");
            return false;
        }
        let Some(this) = self.this.get().cloned() else {
            return false;
        };

        let interval = self.interval.get().clamp(MIN_INTERVAL, MAX_INTERVAL);
        self.interval.set(interval);
        cx.logger()
            .debug(format!("Start tick, frame interval: {interval}"));

        let scheduler = cx.scheduler().clone();
        cx.scheduler().spawn(async move {
            scheduler
                .wait_until(|| this.upgrade().map_or(true, |poller| poller.is_end_open()))
                .await;

            let mut last = scheduler.now();
            loop {
                scheduler.delay_frame(u64::from(interval)).await;
                let Some(poller) = this.upgrade() else {
                    return;
                };
                if poller.condition() == Condition::Paused && !poller.is_closed() {
                    continue;
                }
                if !poller.is_running() {
                    return;
                }
                let now = scheduler.now();
                if !poller.hooks().poll(now - last) {
                    break;
                }
                last = now;
            }

            if let Some(poller) = this.upgrade() {
                poller.close();
            }
        });
        true
    }
}

/// Poll `predicate` every frame and resolve once it holds.
///
/// Resolves to true when the underlying poller closed normally, false if it
/// could not be opened or failed. The future is `'static`, so it can be
/// registered as an opening action.
pub fn wait_for<P>(scheduler: &Scheduler, settings: Settings, predicate: P) -> impl Future<Output = bool> + 'static
where
    P: Fn() -> bool + 'static,
{
    let scheduler = scheduler.clone();
    async move {
        let setting = PollingSetting::new(move |_| !predicate()).with_settings(settings);
        let poller = Polling::instantiate(&scheduler, setting);
        if !poller.open() {
            return false;
        }
        scheduler
            .wait_until(|| poller.is_closed() || poller.is_failed())
            .await;
        poller.condition() == Condition::Finished
    }
}
