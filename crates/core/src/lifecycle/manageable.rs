use super::Context;
use crate::scheduler::Scheduler;
use crate::task::MultiTaskWaiter;
use sk_protocol::{Condition, Settings};
use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use uuid::Uuid;

/// Override points of a lifecycle object.
///
/// Every hook has a default: the boolean hooks succeed, the others do
/// nothing. Hooks receive the object's [`Context`] and must not hold
/// borrows of their own state across calls back into the object.
pub trait Hooks: 'static {
    /// Name used when the settings carry no name tag.
    fn default_name(&self) -> String {
        short_type_name::<Self>()
    }

    /// Called once on `open()`. Returning false fails the object.
    ///
    /// This is the only place opening actions may be registered.
    fn on_open(&self, _cx: &Context) -> bool {
        true
    }

    /// Called once the object is Running.
    fn on_ready(&self, _cx: &Context) {}

    fn on_pause(&self, _cx: &Context) -> bool {
        true
    }

    fn on_resume(&self, _cx: &Context) -> bool {
        true
    }

    fn on_close(&self, _cx: &Context) {}

    /// Per-frame tick; only called while Running.
    fn on_update(&self, _cx: &Context, _delta: Duration) {}

    /// Receives a weak handle to the owning object right after construction.
    fn attach(&self, _this: &Weak<Manageable<Self>>)
    where
        Self: Sized,
    {
    }
}

impl Hooks for () {
    fn default_name(&self) -> String {
        "Manageable".to_string()
    }
}

/// Object-safe lifecycle operations.
///
/// This is the handle type used wherever objects are stored without their
/// concrete hooks: cascade lists, state machine stacks, progress targets.
pub trait Lifecycle {
    fn context(&self) -> &Context;

    /// Start the object. Legal only from Created.
    ///
    /// Returns true as soon as the open hook succeeds, even if opening
    /// actions are still pending; poll [`is_running`](Self::is_running) or
    /// [`is_failed`](Self::is_failed) for readiness.
    fn open(&self) -> bool;

    /// Suspend the object. Legal only while Running.
    fn pause(&self) -> bool;

    /// Continue a paused object. A failing resume hook fails the object.
    fn resume(&self) -> bool;

    /// Close the object and every registered auto-close target.
    ///
    /// Rejected before `open()` and after a previous `close()`.
    fn close(&self) -> bool;

    /// Forward one tick to the update hook. No-op unless Running.
    fn update(&self, delta: Duration);

    fn id(&self) -> Uuid {
        self.context().id()
    }

    fn name(&self) -> &str {
        self.context().name()
    }

    fn condition(&self) -> Condition {
        self.context().condition()
    }

    fn is_running(&self) -> bool {
        self.context().is_running()
    }

    fn is_failed(&self) -> bool {
        self.context().is_failed()
    }

    fn is_end_open(&self) -> bool {
        self.context().is_end_open()
    }

    fn is_closed(&self) -> bool {
        self.context().is_closed()
    }
}

/// Construction input for [`Manageable::instantiate`].
///
/// Each object kind has its own setting struct bundling the shared
/// [`Settings`] with its specific fields.
pub trait Setup {
    type Hooks: Hooks;

    fn into_parts(self) -> (Settings, Self::Hooks);
}

impl Setup for Settings {
    type Hooks = ();

    fn into_parts(self) -> (Settings, ()) {
        (self, ())
    }
}

impl<H: Hooks> Setup for (Settings, H) {
    type Hooks = H;

    fn into_parts(self) -> (Settings, H) {
        self
    }
}

/// Generic lifecycle object.
///
/// Created -> Opening -> Running <-> Paused -> Finished, with Failed
/// reachable from Opening, Running and Paused. Behaviour is supplied by
/// the [`Hooks`] implementation `H`.
pub struct Manageable<H: Hooks = ()> {
    cx: Context,
    hooks: H,
    this: Weak<Self>,
    ticking: Cell<bool>,
}

impl<H: Hooks> Manageable<H> {
    /// Build an object in the Created condition.
    pub fn instantiate<S>(scheduler: &Scheduler, setup: S) -> Rc<Self>
    where
        S: Setup<Hooks = H>,
    {
        let (settings, hooks) = setup.into_parts();
        let name = if settings.name_tag.is_empty() {
            hooks.default_name()
        } else {
            settings.name_tag.clone()
        };

        let object = Rc::new_cyclic(|this: &Weak<Self>| {
            let handle: Weak<dyn Lifecycle> = this.clone();
            Self {
                cx: Context::new(scheduler.clone(), settings, name, handle),
                hooks,
                this: this.clone(),
                ticking: Cell::new(false),
            }
        });
        object.hooks.attach(&object.this);
        object
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    fn finish_opening(&self, success: bool) {
        let cx = &self.cx;
        if cx.condition() != Condition::Opening || cx.is_closed() {
            cx.logger()
                .debug(format!("Opening settled while {}; ignored", cx.condition()));
            return;
        }
        if success {
            cx.set_condition(Condition::Running);
            self.hooks.on_ready(cx);
        } else {
            cx.logger().error("Opening actions failed");
            cx.set_condition(Condition::Failed);
        }
    }

    fn start_self_tick(&self) {
        self.ticking.set(true);
        let this = self.this.clone();
        let scheduler = self.cx.scheduler().clone();
        self.cx.scheduler().spawn(async move {
            scheduler
                .wait_until(|| this.upgrade().map_or(true, |object| object.cx.is_end_open()))
                .await;
            loop {
                let before = scheduler.now();
                scheduler.next_frame().await;
                let Some(object) = this.upgrade() else {
                    return;
                };
                if !object.cx.is_running() {
                    object.ticking.set(false);
                    return;
                }
                object.update(scheduler.now() - before);
            }
        });
    }
}

impl<H: Hooks> Lifecycle for Manageable<H> {
    fn context(&self) -> &Context {
        &self.cx
    }

    fn open(&self) -> bool {
        let cx = &self.cx;
        if cx.condition() != Condition::Created {
            cx.logger()
                .error(format!("Cannot open while {}", cx.condition()));
            return false;
        }

        cx.set_condition(Condition::Opening);
        *cx.opening.borrow_mut() = Some(MultiTaskWaiter::new(cx.scheduler().clone()));

        if !self.hooks.on_open(cx) {
            cx.opening.borrow_mut().take();
            cx.logger().error("Open hook failed");
            cx.set_failed();
            return false;
        }

        let waiter = cx.opening.borrow_mut().take();
        match waiter {
            Some(mut waiter) if waiter.has_task() => {
                cx.logger()
                    .debug(format!("Waiting for {} opening actions", waiter.len()));
                let this = self.this.clone();
                waiter.start_wait(move |success| {
                    if let Some(object) = this.upgrade() {
                        object.finish_opening(success);
                    }
                });
            }
            _ => self.finish_opening(true),
        }

        if cx.settings().self_tick && !self.ticking.get() {
            self.start_self_tick();
        }
        true
    }

    fn pause(&self) -> bool {
        let cx = &self.cx;
        if !cx.is_running() {
            cx.logger()
                .error(format!("Cannot pause while {}", cx.condition()));
            return false;
        }

        cx.set_condition(Condition::Paused);
        if !self.hooks.on_pause(cx) {
            cx.logger().error("Pause hook failed");
            cx.set_failed();
            return false;
        }
        true
    }

    fn resume(&self) -> bool {
        let cx = &self.cx;
        if cx.condition() != Condition::Paused || cx.is_closed() {
            cx.logger()
                .error(format!("Cannot resume while {}", cx.condition()));
            return false;
        }

        cx.set_condition(Condition::Running);
        if !self.hooks.on_resume(cx) {
            cx.logger().error("Resume hook failed");
            cx.set_failed();
            return false;
        }

        if cx.settings().self_tick && !self.ticking.get() && cx.is_running() {
            self.start_self_tick();
        }
        true
    }

    fn close(&self) -> bool {
        let cx = &self.cx;
        if cx.condition() == Condition::Created {
            cx.logger().error("Cannot close an object that was never opened");
            return false;
        }
        if cx.is_closed() {
            cx.logger().warning("Already closed");
            return false;
        }

        cx.mark_closed();
        self.hooks.on_close(cx);

        let targets = std::mem::take(&mut *cx.auto_closed.borrow_mut());
        for target in targets {
            if target.is_closed() || target.condition() == Condition::Created {
                continue;
            }
            target.close();
        }

        if !cx.is_failed() {
            cx.set_condition(Condition::Finished);
        }
        true
    }

    fn update(&self, delta: Duration) {
        if !self.cx.is_running() {
            return;
        }
        self.hooks.on_update(&self.cx, delta);
    }
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
