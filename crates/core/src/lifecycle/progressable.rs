use super::{Context, Hooks, Lifecycle, Manageable, Setup};
use sk_protocol::{Condition, Settings};
use std::rc::Rc;
use std::time::Duration;

/// A lifecycle object that finishes when another object reaches a condition.
pub type Progressable = Manageable<ProgressHooks>;

/// Setup for a [`Progressable`].
pub struct ProgressSetting {
    pub base: Settings,
    /// Object being watched. Opening fails without one.
    pub target: Option<Rc<dyn Lifecycle>>,
    /// Condition that counts as success.
    pub wanted: Condition,
}

impl ProgressSetting {
    /// Watch `target` until it is Running. Self-ticking by default.
    pub fn new(target: Rc<dyn Lifecycle>) -> Self {
        Self {
            base: Settings::default().with_self_tick(true),
            target: Some(target),
            wanted: Condition::Running,
        }
    }

    pub fn with_wanted(mut self, wanted: Condition) -> Self {
        self.wanted = wanted;
        self
    }
}

impl Default for ProgressSetting {
    fn default() -> Self {
        Self {
            base: Settings::default(),
            target: None,
            wanted: Condition::Running,
        }
    }
}

impl Setup for ProgressSetting {
    type Hooks = ProgressHooks;

    fn into_parts(self) -> (Settings, ProgressHooks) {
        let hooks = ProgressHooks {
            target: self.target,
            wanted: self.wanted,
        };
        (self.base, hooks)
    }
}

pub struct ProgressHooks {
    target: Option<Rc<dyn Lifecycle>>,
    wanted: Condition,
}

impl ProgressHooks {
    fn target_condition(&self) -> Option<Condition> {
        self.target.as_ref().map(|target| target.condition())
    }
}

impl Hooks for ProgressHooks {
    fn default_name(&self) -> String {
        "Progressable".to_string()
    }

    fn on_open(&self, cx: &Context) -> bool {
        if self.target.is_none() {
            cx.logger().error("No target to watch");
            return false;
        }
        true
    }

    fn on_update(&self, cx: &Context, _delta: Duration) {
        match self.target_condition() {
            Some(condition) if condition == self.wanted => {
                if let Some(this) = cx.handle() {
                    this.close();
                }
            }
            Some(Condition::Failed) => {
                cx.logger().warning("Watched object failed");
                cx.set_failed();
            }
            _ => {}
        }
    }
}

impl Manageable<ProgressHooks> {
    /// The target has reached the wanted condition.
    pub fn is_success(&self) -> bool {
        self.hooks().target_condition() == Some(self.hooks().wanted)
    }

    /// The target has failed.
    pub fn is_fail(&self) -> bool {
        self.hooks().target_condition() == Some(Condition::Failed)
    }
}
