use super::state::{Signals, StateRef};
use crate::lifecycle::{Context, Hooks, Lifecycle, Manageable, Setup};
use sk_protocol::{Event, Settings};
use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Callback receiving the overall outcome when a machine closes.
pub type FinishCallback = Box<dyn FnOnce(bool)>;

/// Stack-based sequencer of [`Sequencable`](super::Sequencable) states.
///
/// Only the top of the stack is active: it receives ticks and its control
/// signals drive the stack. States below it are paused.
pub type StateMachine = Manageable<MachineHooks>;

/// Setup for a [`StateMachine`].
pub struct MachineSetting {
    pub base: Settings,
    /// Opening fails without a first state.
    pub first_state: Option<StateRef>,
    /// Called exactly once, on close, with `true` unless the machine failed.
    pub on_finish: Option<FinishCallback>,
}

impl MachineSetting {
    /// Start with `first_state`. Self-ticking by default.
    pub fn new(first_state: StateRef) -> Self {
        Self {
            base: Settings::default().with_self_tick(true),
            first_state: Some(first_state),
            on_finish: None,
        }
    }

    pub fn with_settings(mut self, base: Settings) -> Self {
        self.base = base;
        self
    }

    pub fn with_on_finish<F>(mut self, on_finish: F) -> Self
    where
        F: FnOnce(bool) + 'static,
    {
        self.on_finish = Some(Box::new(on_finish));
        self
    }
}

impl Default for MachineSetting {
    fn default() -> Self {
        Self {
            base: Settings::default().with_self_tick(true),
            first_state: None,
            on_finish: None,
        }
    }
}

impl Setup for MachineSetting {
    type Hooks = MachineHooks;

    fn into_parts(self) -> (Settings, MachineHooks) {
        let hooks = MachineHooks {
            first_state: RefCell::new(self.first_state),
            on_finish: RefCell::new(self.on_finish),
            stack: RefCell::new(Vec::new()),
            this: OnceCell::new(),
        };
        (self.base, hooks)
    }
}

pub struct MachineHooks {
    first_state: RefCell<Option<StateRef>>,
    on_finish: RefCell<Option<FinishCallback>>,
    stack: RefCell<Vec<StateRef>>,
    this: OnceCell<Weak<StateMachine>>,
}

impl MachineHooks {
    fn machine(&self) -> Option<Rc<StateMachine>> {
        self.this.get().and_then(Weak::upgrade)
    }
}

impl Hooks for MachineHooks {
    fn default_name(&self) -> String {
        "StateMachine".to_string()
    }

    fn attach(&self, this: &Weak<StateMachine>) {
        let _ = self.this.set(this.clone());
    }

    fn on_open(&self, cx: &Context) -> bool {
        let first = self.first_state.borrow_mut().take();
        let Some(first) = first else {
            cx.logger().error("Fail open, first state is missing");
            return false;
        };
        if !cx.settings().self_tick {
            cx.logger()
                .warning("Self tick is off; the host must call update");
        }
        let Some(this) = self.this.get().cloned() else {
            return false;
        };

        // The first state starts once the machine itself is running.
        let scheduler = cx.scheduler().clone();
        cx.scheduler().spawn(async move {
            scheduler
                .wait_until(|| {
                    this.upgrade().map_or(true, |machine| {
                        machine.is_running() || machine.is_closed() || machine.is_failed()
                    })
                })
                .await;
            if let Some(machine) = this.upgrade() {
                if machine.is_running() {
                    machine.start_state(first);
                }
            }
        });
        true
    }

    fn on_update(&self, _cx: &Context, delta: Duration) {
        if let Some(machine) = self.machine() {
            machine.tick_top(delta);
        }
    }

    fn on_close(&self, cx: &Context) {
        loop {
            let state = self.stack.borrow_mut().pop();
            let Some(state) = state else {
                break;
            };
            let depth = self.stack.borrow().len();
            cx.scheduler().publish(Event::StatePopped {
                machine_id: cx.id(),
                state: state.name().to_string(),
                depth,
            });
            if !state.is_closed() {
                state.close();
            }
        }

        let success = !cx.is_failed();
        cx.logger().info(format!("Finished, success: {success}"));
        cx.scheduler().publish(Event::MachineFinished {
            machine_id: cx.id(),
            success,
        });
        let on_finish = self.on_finish.borrow_mut().take();
        if let Some(on_finish) = on_finish {
            on_finish(success);
        }
    }
}

impl Manageable<MachineHooks> {
    /// Number of states on the stack.
    pub fn depth(&self) -> usize {
        self.hooks().stack.borrow().len()
    }

    /// The active state, if any.
    pub fn current(&self) -> Option<StateRef> {
        self.hooks().stack.borrow().last().cloned()
    }

    fn weak(&self) -> Weak<StateMachine> {
        self.hooks().this.get().cloned().unwrap_or_default()
    }

    fn signals(&self) -> Signals {
        let next = self.weak();
        let push = self.weak();
        let end = self.weak();
        Signals {
            on_next: Box::new(move |state| {
                if let Some(machine) = next.upgrade() {
                    machine.on_next_state(state);
                }
            }),
            on_push: Box::new(move |state| {
                if let Some(machine) = push.upgrade() {
                    machine.on_push_state(state);
                }
            }),
            on_end: Box::new(move || {
                if let Some(machine) = end.upgrade() {
                    machine.on_end_state();
                }
            }),
        }
    }

    fn start_state(&self, state: StateRef) {
        let cx = self.context();
        if !state.setup_callback(self.signals()) {
            cx.logger()
                .error(format!("Fail start state {}, it has another owner", state.name()));
            self.abandon();
            return;
        }

        self.hooks().stack.borrow_mut().push(Rc::clone(&state));
        cx.scheduler().publish(Event::StatePushed {
            machine_id: cx.id(),
            state: state.name().to_string(),
            depth: self.depth(),
        });

        cx.logger().trace(format!("Open state: {}", state.name()));
        if !state.open() {
            cx.logger()
                .error(format!("Fail open state {}", state.name()));
            self.abort(&state);
        }
    }

    fn on_next_state(&self, next: StateRef) {
        if !self.guard("advance") {
            return;
        }
        self.pop_state();
        self.start_state(next);
    }

    fn on_push_state(&self, child: StateRef) {
        if !self.guard("push") {
            return;
        }
        if let Some(top) = self.current() {
            self.context()
                .logger()
                .trace(format!("Pause state: {}", top.name()));
            top.pause();
        }
        self.start_state(child);
    }

    fn on_end_state(&self) {
        if !self.guard("end") {
            return;
        }
        self.unwind();
    }

    fn guard(&self, signal: &str) -> bool {
        let cx = self.context();
        if cx.is_running() {
            return true;
        }
        cx.logger()
            .warning(format!("Ignored {signal} while {}", cx.condition()));
        false
    }

    fn pop_state(&self) {
        let popped = self.hooks().stack.borrow_mut().pop();
        let Some(state) = popped else {
            return;
        };
        let cx = self.context();
        cx.scheduler().publish(Event::StatePopped {
            machine_id: cx.id(),
            state: state.name().to_string(),
            depth: self.depth(),
        });
        cx.logger().trace(format!("Close state: {}", state.name()));
        state.close();
    }

    /// Close the top state and hand control to whatever is below it.
    fn unwind(&self) {
        self.pop_state();
        self.settle();
    }

    /// After a pop: resume the new top, or close the machine once empty.
    ///
    /// A failed machine resumes nothing and keeps unwinding.
    fn settle(&self) {
        let cx = self.context();
        match self.current() {
            None => {
                cx.logger().trace("All states finished");
                if !cx.is_closed() {
                    self.close();
                }
            }
            Some(_) if cx.is_failed() => self.unwind(),
            Some(top) => {
                cx.logger().trace(format!("Resume state: {}", top.name()));
                if !top.resume() {
                    cx.logger()
                        .error(format!("Fail resume state {}", top.name()));
                    cx.set_failed();
                    self.unwind();
                }
            }
        }
    }

    /// Drop a state that never became ready.
    ///
    /// The state below it, if any, is resumed; with nothing left the
    /// machine fails.
    fn abort(&self, state: &StateRef) {
        let is_top = self
            .current()
            .is_some_and(|top| Rc::ptr_eq(&top, state));
        if is_top {
            self.pop_state();
        }
        self.abandon();
    }

    fn abandon(&self) {
        if self.depth() == 0 {
            self.context().set_failed();
        }
        self.settle();
    }

    fn tick_top(&self, delta: Duration) {
        let Some(top) = self.current() else {
            return;
        };
        if top.is_failed() {
            self.context()
                .logger()
                .error(format!("State {} failed", top.name()));
            self.abort(&top);
            return;
        }
        top.update(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use crate::sequence::{State, StateBehavior, StateContext, StateSetting};
    use sk_protocol::Condition;
    use std::cell::Cell;

    const FRAME: Duration = Duration::from_millis(16);

    struct Idle;

    impl StateBehavior for Idle {}

    struct RefuseOpen;

    impl StateBehavior for RefuseOpen {
        fn on_open(&self, _state: &StateContext<'_>) -> bool {
            false
        }
    }

    #[test]
    fn test_open_without_first_state_fails() {
        let scheduler = Scheduler::new();
        let machine = StateMachine::instantiate(&scheduler, MachineSetting::default());

        assert!(!machine.open());
        assert!(machine.is_failed());
    }

    #[test]
    fn test_first_state_starts_once_machine_is_running() {
        let scheduler = Scheduler::new();
        let first = State::instantiate(&scheduler, StateSetting::new(Idle));
        let machine = StateMachine::instantiate(&scheduler, MachineSetting::new(first.clone()));

        machine.open();
        assert_eq!(machine.depth(), 0);

        scheduler.tick(FRAME);
        assert_eq!(machine.depth(), 1);
        assert!(first.is_running());
    }

    #[test]
    fn test_first_state_open_failure_fails_machine() {
        let scheduler = Scheduler::new();
        let result = Rc::new(Cell::new(None));
        let r = Rc::clone(&result);
        let first = State::instantiate(&scheduler, StateSetting::new(RefuseOpen));
        let setting = MachineSetting::new(first.clone()).with_on_finish(move |ok| r.set(Some(ok)));
        let machine = StateMachine::instantiate(&scheduler, setting);

        machine.open();
        scheduler.tick(FRAME);

        assert_eq!(result.get(), Some(false));
        assert_eq!(machine.condition(), Condition::Failed);
        assert!(machine.is_closed());
        assert_eq!(machine.depth(), 0);
    }

    #[test]
    fn test_close_closes_remaining_states_and_reports_once() {
        let scheduler = Scheduler::new();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let first = State::instantiate(&scheduler, StateSetting::new(Idle));
        let setting = MachineSetting::new(first.clone()).with_on_finish(move |ok| {
            assert!(ok);
            c.set(c.get() + 1);
        });
        let machine = StateMachine::instantiate(&scheduler, setting);
        machine.open();
        scheduler.tick(FRAME);

        assert!(machine.close());
        assert!(!machine.close());

        assert_eq!(calls.get(), 1);
        assert_eq!(first.condition(), Condition::Finished);
        assert_eq!(machine.condition(), Condition::Finished);
    }
}
