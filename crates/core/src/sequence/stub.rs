use super::state::{Signals, StateRef};
use crate::lifecycle::{Context, Hooks, Lifecycle, Manageable, Setup};
use crate::polling::wait_for;
use sk_protocol::{Condition, Settings};
use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

/// Outcome of running one state under a [`StateStub`].
pub struct StubResult {
    /// The state did not fail.
    pub is_success: bool,
    /// The state the stub was asked to advance to; never started.
    pub next_state: Option<StateRef>,
}

pub type ResultCallback = Box<dyn FnOnce(StubResult)>;

/// Runs a single state in isolation, standing in for its machine.
pub type StateStub = Manageable<StubHooks>;

/// Setup for a [`StateStub`].
#[derive(Default)]
pub struct StubSetting {
    pub base: Settings,
    pub state: Option<StateRef>,
    pub on_result: Option<ResultCallback>,
}

impl StubSetting {
    pub fn new<F>(state: StateRef, on_result: F) -> Self
    where
        F: FnOnce(StubResult) + 'static,
    {
        Self {
            base: Settings::default(),
            state: Some(state),
            on_result: Some(Box::new(on_result)),
        }
    }
}

impl Setup for StubSetting {
    type Hooks = StubHooks;

    fn into_parts(self) -> (Settings, StubHooks) {
        let hooks = StubHooks {
            state: self.state,
            on_result: RefCell::new(self.on_result),
            this: OnceCell::new(),
        };
        (self.base, hooks)
    }
}

pub struct StubHooks {
    state: Option<StateRef>,
    on_result: RefCell<Option<ResultCallback>>,
    this: OnceCell<Weak<StateStub>>,
}

impl StubHooks {
    /// Hand the result to the callback; later reports are dropped.
    fn report(&self, is_success: bool, next_state: Option<StateRef>) {
        let on_result = self.on_result.borrow_mut().take();
        if let Some(on_result) = on_result {
            on_result(StubResult {
                is_success,
                next_state,
            });
        }
    }

    fn state_failed(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.is_failed())
    }

    fn signals(&self, this: &Weak<StateStub>) -> Signals {
        let next = this.clone();
        let push = this.clone();
        let end = this.clone();
        Signals {
            on_next: Box::new(move |state| {
                let Some(stub) = next.upgrade() else {
                    return;
                };
                let hooks = stub.hooks();
                let is_success = !hooks.state_failed();
                stub.context().logger().info(format!(
                    "On next state: {}, not failed: {is_success}",
                    state.name()
                ));
                hooks.report(is_success, Some(state));
            }),
            on_push: Box::new(move |child| {
                let Some(stub) = push.upgrade() else {
                    return;
                };
                stub.context()
                    .logger()
                    .info(format!("On push state: {}", child.name()));
                stub.hooks().pause_for_a_frame(stub.context());
            }),
            on_end: Box::new(move || {
                let Some(stub) = end.upgrade() else {
                    return;
                };
                let hooks = stub.hooks();
                let is_success = !hooks.state_failed();
                stub.context()
                    .logger()
                    .info(format!("On end state, not failed: {is_success}"));
                hooks.report(is_success, None);
            }),
        }
    }

    /// The pushed child is not run: the state is paused and resumed on the
    /// next frame instead.
    fn pause_for_a_frame(&self, cx: &Context) {
        let Some(state) = self.state.clone() else {
            return;
        };
        state.pause();
        let scheduler = cx.scheduler().clone();
        cx.scheduler().spawn(async move {
            scheduler.next_frame().await;
            if state.condition() == Condition::Paused && !state.is_closed() {
                state.resume();
            }
        });
    }
}

impl Hooks for StubHooks {
    fn default_name(&self) -> String {
        "StateStub".to_string()
    }

    fn attach(&self, this: &Weak<StateStub>) {
        let _ = self.this.set(this.clone());
    }

    fn on_open(&self, cx: &Context) -> bool {
        let Some(state) = self.state.clone() else {
            cx.logger().error("Fail open, no state to run");
            return false;
        };
        if self.on_result.borrow().is_none() {
            cx.logger().error("Fail open, no result callback");
            return false;
        }
        let Some(this) = self.this.get().cloned() else {
            return false;
        };

        if !state.setup_callback(self.signals(&this)) {
            cx.logger().error("Fail open, state has another owner");
            return false;
        }
        if !state.open() {
            cx.logger().error("Fail open state");
            self.report(false, None);
            return false;
        }

        let scheduler = cx.scheduler().clone();
        cx.add_opening_act(move || {
            let watched = Rc::clone(&state);
            let opened = wait_for(&scheduler, Settings::default(), move || watched.is_end_open());
            async move {
                let success = opened.await && !state.is_failed();
                if !success {
                    if let Some(stub) = this.upgrade() {
                        stub.hooks().report(false, None);
                    }
                }
                success
            }
        })
    }

    fn on_ready(&self, cx: &Context) {
        // Done either way once the state has settled.
        if let Some(this) = cx.handle() {
            this.close();
        }
    }

    fn on_close(&self, _cx: &Context) {
        if let Some(state) = &self.state {
            if state.condition() != Condition::Created && !state.is_closed() {
                state.close();
            }
        }
    }
}
