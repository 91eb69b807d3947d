use crate::lifecycle::{short_type_name, Context, Hooks, Lifecycle, Manageable, Setup};
use sk_protocol::Settings;
use std::cell::RefCell;
use std::ops::Deref;
use std::rc::Rc;
use std::time::Duration;

/// Shared handle to any sequencable state.
pub type StateRef = Rc<dyn Sequencable>;

/// Control signal handlers registered by the owner of a state.
pub struct Signals {
    /// Replace the emitting state with the given one.
    pub on_next: Box<dyn Fn(StateRef)>,
    /// Suspend the emitting state and run the given one on top of it.
    pub on_push: Box<dyn Fn(StateRef)>,
    /// The emitting state is done.
    pub on_end: Box<dyn Fn()>,
}

/// A lifecycle object that can emit control signals to one owner.
pub trait Sequencable: Lifecycle {
    /// Subscribe the owner's handlers.
    ///
    /// A state belongs to at most one owner: a second subscription is
    /// rejected.
    fn setup_callback(&self, signals: Signals) -> bool;
}

/// What a state does at each step of its lifecycle.
///
/// Same defaults as [`Hooks`]; each hook receives a [`StateContext`] that
/// can also emit control signals.
pub trait StateBehavior: 'static {
    fn name(&self) -> String {
        short_type_name::<Self>()
    }

    fn on_open(&self, _state: &StateContext<'_>) -> bool {
        true
    }

    fn on_ready(&self, _state: &StateContext<'_>) {}

    fn on_pause(&self, _state: &StateContext<'_>) -> bool {
        true
    }

    fn on_resume(&self, _state: &StateContext<'_>) -> bool {
        true
    }

    fn on_close(&self, _state: &StateContext<'_>) {}

    fn on_update(&self, _state: &StateContext<'_>, _delta: Duration) {}
}

/// [`Context`] of a state, plus its control signals.
///
/// Each signal is only emitted while the state is Running; otherwise it is
/// dropped with a warning. Signals are handled synchronously: by the time
/// `advance`, `push` or `end` returns, the owner has already acted on it.
/// Emit at most one signal per activation.
pub struct StateContext<'a> {
    cx: &'a Context,
    signals: &'a RefCell<Option<Rc<Signals>>>,
}

impl StateContext<'_> {
    /// Ask the owner to close this state and start `next`.
    pub fn advance(&self, next: Option<StateRef>) {
        let Some(next) = next else {
            self.cx.logger().error("Fail advance, next state is missing");
            return;
        };
        let Some(signals) = self.listener("advance") else {
            return;
        };
        self.cx
            .logger()
            .trace(format!("Call advance: {}", next.name()));
        (signals.on_next)(next);
    }

    /// Ask the owner to pause this state and start `child` on top of it.
    pub fn push(&self, child: Option<StateRef>) {
        let Some(child) = child else {
            self.cx.logger().error("Fail push, child state is missing");
            return;
        };
        let Some(signals) = self.listener("push") else {
            return;
        };
        self.cx
            .logger()
            .trace(format!("Call push: {}", child.name()));
        (signals.on_push)(child);
    }

    /// Tell the owner this state is done.
    pub fn end(&self) {
        let Some(signals) = self.listener("end") else {
            return;
        };
        self.cx.logger().trace("Call end");
        (signals.on_end)();
    }

    fn listener(&self, signal: &str) -> Option<Rc<Signals>> {
        if !self.cx.is_running() {
            self.cx.logger().warning(format!(
                "Ignored {signal} while {}",
                self.cx.condition()
            ));
            return None;
        }
        let signals = self.signals.borrow().clone();
        if signals.is_none() {
            self.cx
                .logger()
                .warning(format!("Ignored {signal}, no owner is listening"));
        }
        signals
    }
}

impl Deref for StateContext<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.cx
    }
}

/// A sequencable lifecycle object driven by a [`StateBehavior`].
pub type State<B> = Manageable<StateHooks<B>>;

/// Setup for a [`State`].
pub struct StateSetting<B> {
    pub base: Settings,
    pub behavior: B,
}

impl<B: StateBehavior> StateSetting<B> {
    pub fn new(behavior: B) -> Self {
        Self {
            base: Settings::default(),
            behavior,
        }
    }

    pub fn with_settings(mut self, base: Settings) -> Self {
        self.base = base;
        self
    }
}

impl<B: StateBehavior> Setup for StateSetting<B> {
    type Hooks = StateHooks<B>;

    fn into_parts(self) -> (Settings, StateHooks<B>) {
        let hooks = StateHooks {
            behavior: self.behavior,
            signals: RefCell::new(None),
        };
        (self.base, hooks)
    }
}

pub struct StateHooks<B> {
    behavior: B,
    signals: RefCell<Option<Rc<Signals>>>,
}

impl<B: StateBehavior> StateHooks<B> {
    fn state<'a>(&'a self, cx: &'a Context) -> StateContext<'a> {
        StateContext {
            cx,
            signals: &self.signals,
        }
    }
}

impl<B: StateBehavior> Hooks for StateHooks<B> {
    fn default_name(&self) -> String {
        self.behavior.name()
    }

    fn on_open(&self, cx: &Context) -> bool {
        self.behavior.on_open(&self.state(cx))
    }

    fn on_ready(&self, cx: &Context) {
        self.behavior.on_ready(&self.state(cx));
    }

    fn on_pause(&self, cx: &Context) -> bool {
        self.behavior.on_pause(&self.state(cx))
    }

    fn on_resume(&self, cx: &Context) -> bool {
        self.behavior.on_resume(&self.state(cx))
    }

    fn on_close(&self, cx: &Context) {
        self.behavior.on_close(&self.state(cx));
    }

    fn on_update(&self, cx: &Context, delta: Duration) {
        self.behavior.on_update(&self.state(cx), delta);
    }
}

impl<B: StateBehavior> Manageable<StateHooks<B>> {
    pub fn behavior(&self) -> &B {
        &self.hooks().behavior
    }
}

impl<B: StateBehavior> Sequencable for Manageable<StateHooks<B>> {
    fn setup_callback(&self, signals: Signals) -> bool {
        let mut slot = self.hooks().signals.borrow_mut();
        if slot.is_some() {
            self.context()
                .logger()
                .error("Signals are already subscribed; a state has one owner");
            return false;
        }
        *slot = Some(Rc::new(signals));
        true
    }
}
