//! Tokio-backed host frame source.
//!
//! The core never owns a game loop. When no host loop exists (the CLI,
//! integration tests), [`FrameDriver`] ticks a [`Scheduler`] from a
//! `tokio::time::interval`, feeding it the real time elapsed between frames.

use super::Scheduler;
use sk_protocol::DriverConfig;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Errors that can occur while driving frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The frame cap was reached before the stop condition held.
    #[error("Frame limit of {0} reached before completion")]
    FrameLimit(u64),
}

/// Drives a scheduler at a fixed frame period.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    period: Duration,
    max_frames: Option<u64>,
}

impl FrameDriver {
    /// Create a driver ticking every `period`.
    ///
    /// A zero period is bumped to one millisecond; tokio intervals reject zero.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            max_frames: None,
        }
    }

    /// Build a driver from the `[driver]` configuration section.
    pub fn from_config(config: &DriverConfig) -> Self {
        let driver = Self::new(Duration::from_millis(config.frame_ms));
        match config.max_frames {
            Some(max) => driver.with_max_frames(max),
            None => driver,
        }
    }

    /// Give up after `max` frames.
    pub fn with_max_frames(mut self, max: u64) -> Self {
        self.max_frames = Some(max);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick `scheduler` until `done` holds.
    ///
    /// `done` is checked before every frame, so a condition that already
    /// holds drives zero frames.
    ///
    /// # Returns
    ///
    /// The number of frames driven.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::FrameLimit`] if the frame cap is reached first.
    pub async fn run_until<F>(&self, scheduler: &Scheduler, mut done: F) -> Result<u64, DriverError>
    where
        F: FnMut() -> bool,
    {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;

        let mut last = Instant::now();
        let mut frames = 0;
        while !done() {
            if let Some(max) = self.max_frames {
                if frames >= max {
                    return Err(DriverError::FrameLimit(max));
                }
            }
            interval.tick().await;
            let now = Instant::now();
            scheduler.tick(now - last);
            last = now;
            frames += 1;
        }
        Ok(frames)
    }
}
