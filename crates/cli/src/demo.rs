//! Demo gameplay sequence: title, loading, battle with a pause menu, results.

use sk_core::sequence::{State, StateBehavior, StateContext, StateRef, StateSetting};
use sk_core::Scheduler;
use sk_protocol::StageConfig;
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// Frames the title screen stays up.
const TITLE_FRAMES: u32 = 3;
/// Frames of battle before the pause menu opens.
const PAUSE_AT: u32 = 4;
/// Frames the pause menu stays open.
const MENU_FRAMES: u32 = 5;
/// Frames of battle after which it is over.
const BATTLE_FRAMES: u32 = 10;
/// Frames the results screen stays up.
const RESULTS_FRAMES: u32 = 2;

/// Build the whole sequence and return its first state.
pub fn build(scheduler: &Scheduler, config: &StageConfig) -> StateRef {
    let state = |name: &str| config.settings_for(name);

    let results = State::instantiate(
        scheduler,
        StateSetting::new(Countdown::new("Results", RESULTS_FRAMES)).with_settings(state("results")),
    );
    let menu = State::instantiate(
        scheduler,
        StateSetting::new(Countdown::new("PauseMenu", MENU_FRAMES)).with_settings(state("pause_menu")),
    );
    let battle = State::instantiate(
        scheduler,
        StateSetting::new(Battle::new(menu, results)).with_settings(state("battle")),
    );
    let loading = State::instantiate(
        scheduler,
        StateSetting::new(Loading::new(battle)).with_settings(state("loading")),
    );
    State::instantiate(
        scheduler,
        StateSetting::new(Title::new(loading)).with_settings(state("title")),
    )
}

/// Ends after a fixed number of frames.
struct Countdown {
    name: &'static str,
    remaining: Cell<u32>,
}

impl Countdown {
    fn new(name: &'static str, frames: u32) -> Self {
        Self {
            name,
            remaining: Cell::new(frames),
        }
    }
}

impl StateBehavior for Countdown {
    fn name(&self) -> String {
        self.name.to_string()
    }

    fn on_update(&self, state: &StateContext<'_>, _delta: Duration) {
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        if remaining == 0 {
            state.end();
        }
    }
}

struct Title {
    next: RefCell<Option<StateRef>>,
    frames: Cell<u32>,
}

impl Title {
    fn new(next: StateRef) -> Self {
        Self {
            next: RefCell::new(Some(next)),
            frames: Cell::new(0),
        }
    }
}

impl StateBehavior for Title {
    fn on_update(&self, state: &StateContext<'_>, _delta: Duration) {
        self.frames.set(self.frames.get() + 1);
        if self.frames.get() >= TITLE_FRAMES {
            let next = self.next.borrow_mut().take();
            state.advance(next);
        }
    }
}

/// Loads three resources in parallel before it becomes ready.
struct Loading {
    next: RefCell<Option<StateRef>>,
}

impl Loading {
    fn new(next: StateRef) -> Self {
        Self {
            next: RefCell::new(Some(next)),
        }
    }
}

impl StateBehavior for Loading {
    fn on_open(&self, state: &StateContext<'_>) -> bool {
        for (resource, frames) in [("textures", 6), ("sounds", 3)] {
            let scheduler = state.scheduler().clone();
            let logger = state.logger().clone();
            state.add_opening_act(move || async move {
                scheduler.delay_frame(frames).await;
                logger.debug(format!("Loaded {resource}"));
                true
            });
        }
        let scheduler = state.scheduler().clone();
        let logger = state.logger().clone();
        state.add_opening_act(move || async move {
            scheduler.delay(Duration::from_millis(100)).await;
            logger.debug("Loaded save data");
            true
        })
    }

    fn on_ready(&self, state: &StateContext<'_>) {
        let next = self.next.borrow_mut().take();
        state.advance(next);
    }
}

struct Battle {
    menu: RefCell<Option<StateRef>>,
    results: RefCell<Option<StateRef>>,
    frames: Cell<u32>,
}

impl Battle {
    fn new(menu: StateRef, results: StateRef) -> Self {
        Self {
            menu: RefCell::new(Some(menu)),
            results: RefCell::new(Some(results)),
            frames: Cell::new(0),
        }
    }
}

impl StateBehavior for Battle {
    fn on_resume(&self, state: &StateContext<'_>) -> bool {
        state.logger().info("Back from the pause menu");
        true
    }

    fn on_update(&self, state: &StateContext<'_>, _delta: Duration) {
        let frames = self.frames.get() + 1;
        self.frames.set(frames);
        if frames == PAUSE_AT {
            let menu = self.menu.borrow_mut().take();
            state.push(menu);
        } else if frames >= BATTLE_FRAMES {
            let results = self.results.borrow_mut().take();
            state.advance(results);
        }
    }
}
