use super::Lifecycle;
use crate::log::Logger;
use crate::scheduler::Scheduler;
use crate::task::MultiTaskWaiter;
use sk_protocol::{Condition, Event, Settings};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Per-object lifecycle state handed to every hook.
///
/// The condition is owned here and only changed through the owning
/// object's operations; hooks can query it, register opening actions and
/// cascade-close obligations, and mark the object failed.
pub struct Context {
    id: Uuid,
    name: String,
    settings: Settings,
    logger: Logger,
    scheduler: Scheduler,
    condition: Cell<Condition>,
    closed: Cell<bool>,
    pub(super) opening: RefCell<Option<MultiTaskWaiter>>,
    pub(super) auto_closed: RefCell<Vec<Rc<dyn Lifecycle>>>,
    this: Weak<dyn Lifecycle>,
}

impl Context {
    pub(super) fn new(
        scheduler: Scheduler,
        settings: Settings,
        name: String,
        this: Weak<dyn Lifecycle>,
    ) -> Self {
        let logger = Logger::new(settings.filter_level, name.clone());
        Self {
            id: Uuid::new_v4(),
            name,
            settings,
            logger,
            scheduler,
            condition: Cell::new(Condition::Created),
            closed: Cell::new(false),
            opening: RefCell::new(None),
            auto_closed: RefCell::new(Vec::new()),
            this,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name tag, or the hooks' type name when the tag was left empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn condition(&self) -> Condition {
        self.condition.get()
    }

    /// Running and not being closed.
    pub fn is_running(&self) -> bool {
        self.condition.get() == Condition::Running && !self.closed.get()
    }

    pub fn is_failed(&self) -> bool {
        self.condition.get() == Condition::Failed
    }

    /// Opening has settled, successfully or not.
    pub fn is_end_open(&self) -> bool {
        self.condition.get().is_end_open()
    }

    /// `close()` has been accepted on this object.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub(super) fn mark_closed(&self) {
        self.closed.set(true);
    }

    pub(super) fn set_condition(&self, condition: Condition) {
        self.condition.set(condition);
        self.logger.trace(format!("Set Condition: {condition}"));
        self.scheduler.publish(Event::ConditionChanged {
            object_id: self.id,
            name: self.name.clone(),
            condition,
        });
    }

    /// Move the object to Failed. Ignored once the object is terminal.
    pub fn set_failed(&self) {
        if self.condition.get().is_terminal() {
            return;
        }
        self.set_condition(Condition::Failed);
    }

    /// Register an asynchronous action that must succeed before the object
    /// becomes ready.
    ///
    /// Only valid from inside the open hook.
    pub fn add_opening_act<F, Fut>(&self, action: F) -> bool
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = bool> + 'static,
    {
        let mut opening = self.opening.borrow_mut();
        match opening.as_mut() {
            Some(waiter) => waiter.add_task(action),
            None => {
                self.logger
                    .error("Opening actions can only be added from the open hook");
                false
            }
        }
    }

    /// Close `target` when this object closes.
    ///
    /// With `auto_start`, a target that has not been opened yet is opened
    /// right away; the return value is then the result of that open.
    pub fn set_auto_closer(&self, target: Rc<dyn Lifecycle>, auto_start: bool) -> bool {
        if self.closed.get() || self.condition.get().is_terminal() {
            self.logger.error(format!(
                "Cannot register {} for auto close while {}",
                target.name(),
                self.condition.get()
            ));
            return false;
        }
        self.auto_closed.borrow_mut().push(Rc::clone(&target));
        if auto_start && target.condition() == Condition::Created {
            return target.open();
        }
        true
    }

    /// Strong handle to the owning object, if it is still alive.
    pub fn handle(&self) -> Option<Rc<dyn Lifecycle>> {
        self.this.upgrade()
    }

    pub fn downgrade(&self) -> Weak<dyn Lifecycle> {
        self.this.clone()
    }
}
