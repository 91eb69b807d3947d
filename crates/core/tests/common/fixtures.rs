//! Test fixtures: journaling lifecycle hooks and scripted states.

use sk_core::lifecycle::{Context, Hooks, Lifecycle};
use sk_core::scheduler::Scheduler;
use sk_core::sequence::{State, StateBehavior, StateContext, StateRef, StateSetting};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

pub const FRAME: Duration = Duration::from_millis(16);

/// Ordered record of hook calls, shared between fixtures.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}

/// Tick `scheduler` `frames` times.
pub fn run_frames(scheduler: &Scheduler, frames: usize) {
    for _ in 0..frames {
        scheduler.tick(FRAME);
    }
}

/// Tick until `done` holds, at most `max_frames` times.
///
/// Returns whether `done` held before the cap.
#[allow(dead_code)]
pub fn run_until(scheduler: &Scheduler, max_frames: usize, done: impl Fn() -> bool) -> bool {
    for _ in 0..max_frames {
        if done() {
            return true;
        }
        scheduler.tick(FRAME);
    }
    done()
}

/// Opening action that succeeds or fails after some frames.
fn delayed_action(cx: &Context, frames: u64, result: bool) {
    let scheduler = cx.scheduler().clone();
    cx.add_opening_act(move || async move {
        scheduler.delay_frame(frames).await;
        result
    });
}

/// Lifecycle hooks recording every call into a journal.
pub struct Probe {
    label: String,
    journal: Journal,
    fail_open: bool,
    fail_resume: bool,
    opening: Vec<(u64, bool)>,
    children: RefCell<Vec<Rc<dyn Lifecycle>>>,
    pub ticks: Cell<u32>,
}

#[allow(dead_code)]
impl Probe {
    pub fn new(label: &str, journal: &Journal) -> Self {
        Self {
            label: label.to_string(),
            journal: Rc::clone(journal),
            fail_open: false,
            fail_resume: false,
            opening: Vec::new(),
            children: RefCell::new(Vec::new()),
            ticks: Cell::new(0),
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_resume(mut self) -> Self {
        self.fail_resume = true;
        self
    }

    /// Register an opening action resolving to `result` after `frames`.
    pub fn with_opening_action(mut self, frames: u64, result: bool) -> Self {
        self.opening.push((frames, result));
        self
    }

    /// Open `child` from the open hook and close it on close.
    pub fn with_child(self, child: Rc<dyn Lifecycle>) -> Self {
        self.children.borrow_mut().push(child);
        self
    }

    fn record(&self, event: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{event}", self.label));
    }
}

impl Hooks for Probe {
    fn on_open(&self, cx: &Context) -> bool {
        self.record("open");
        if self.fail_open {
            return false;
        }
        for (frames, result) in &self.opening {
            delayed_action(cx, *frames, *result);
        }
        let children = self.children.borrow().clone();
        for child in children {
            cx.set_auto_closer(child, true);
        }
        true
    }

    fn on_ready(&self, _cx: &Context) {
        self.record("ready");
    }

    fn on_pause(&self, _cx: &Context) -> bool {
        self.record("pause");
        true
    }

    fn on_resume(&self, _cx: &Context) -> bool {
        self.record("resume");
        !self.fail_resume
    }

    fn on_close(&self, _cx: &Context) {
        self.record("close");
    }

    fn on_update(&self, _cx: &Context, _delta: Duration) {
        self.ticks.set(self.ticks.get() + 1);
    }
}

/// Control signal a scripted state emits.
pub enum Step {
    Stay,
    End,
    Advance(Option<StateRef>),
    Push(Option<StateRef>),
}

/// State behavior that journals its hooks and emits scripted signals.
pub struct Scripted {
    label: String,
    journal: Journal,
    fail_open: bool,
    fail_resume: bool,
    opening: Vec<(u64, bool)>,
    on_ready: RefCell<Option<Step>>,
    on_resume: RefCell<Option<Step>>,
    on_update: RefCell<VecDeque<Step>>,
}

#[allow(dead_code)]
impl Scripted {
    pub fn new(label: &str, journal: &Journal) -> Self {
        Self {
            label: label.to_string(),
            journal: Rc::clone(journal),
            fail_open: false,
            fail_resume: false,
            opening: Vec::new(),
            on_ready: RefCell::new(None),
            on_resume: RefCell::new(None),
            on_update: RefCell::new(VecDeque::new()),
        }
    }

    pub fn then_on_ready(self, step: Step) -> Self {
        *self.on_ready.borrow_mut() = Some(step);
        self
    }

    pub fn then_on_resume(self, step: Step) -> Self {
        *self.on_resume.borrow_mut() = Some(step);
        self
    }

    /// Emit `step` on a later tick, one scripted step per tick.
    pub fn then_on_update(self, step: Step) -> Self {
        self.on_update.borrow_mut().push_back(step);
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_resume(mut self) -> Self {
        self.fail_resume = true;
        self
    }

    pub fn with_opening_action(mut self, frames: u64, result: bool) -> Self {
        self.opening.push((frames, result));
        self
    }

    /// Build the state on `scheduler`.
    pub fn build(self, scheduler: &Scheduler) -> StateRef {
        State::instantiate(scheduler, StateSetting::new(self))
    }

    fn record(&self, event: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{event}", self.label));
    }
}

fn perform(state: &StateContext<'_>, step: Option<Step>) {
    match step {
        Some(Step::End) => state.end(),
        Some(Step::Advance(next)) => state.advance(next),
        Some(Step::Push(child)) => state.push(child),
        Some(Step::Stay) | None => {}
    }
}

impl StateBehavior for Scripted {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn on_open(&self, state: &StateContext<'_>) -> bool {
        self.record("open");
        if self.fail_open {
            return false;
        }
        for (frames, result) in &self.opening {
            delayed_action(state, *frames, *result);
        }
        true
    }

    fn on_ready(&self, state: &StateContext<'_>) {
        self.record("ready");
        let step = self.on_ready.borrow_mut().take();
        perform(state, step);
    }

    fn on_pause(&self, _state: &StateContext<'_>) -> bool {
        self.record("pause");
        true
    }

    fn on_resume(&self, state: &StateContext<'_>) -> bool {
        self.record("resume");
        if self.fail_resume {
            return false;
        }
        let step = self.on_resume.borrow_mut().take();
        perform(state, step);
        true
    }

    fn on_close(&self, _state: &StateContext<'_>) {
        self.record("close");
    }

    fn on_update(&self, state: &StateContext<'_>, _delta: Duration) {
        let step = self.on_update.borrow_mut().pop_front();
        perform(state, step);
    }
}
