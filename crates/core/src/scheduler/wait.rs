//! Suspension-point futures handed out by [`Scheduler`].
//!
//! None of these register wakers: the scheduler re-polls every suspended
//! task once per frame, so each future only has to answer "ready yet?".

use super::Scheduler;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Resolves once the scheduler's frame counter reaches a target frame.
pub struct DelayFrame {
    scheduler: Scheduler,
    until: u64,
}

impl DelayFrame {
    pub(super) fn new(scheduler: Scheduler, until: u64) -> Self {
        Self { scheduler, until }
    }
}

impl Future for DelayFrame {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.scheduler.frame() >= self.until {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Resolves once the scheduler clock reaches a target instant.
pub struct Delay {
    scheduler: Scheduler,
    until: Duration,
}

impl Delay {
    pub(super) fn new(scheduler: Scheduler, until: Duration) -> Self {
        Self { scheduler, until }
    }
}

impl Future for Delay {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.scheduler.now() >= self.until {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Resolves once a predicate holds.
pub struct WaitUntil<P> {
    predicate: P,
}

impl<P> WaitUntil<P> {
    pub(super) fn new(predicate: P) -> Self {
        Self { predicate }
    }
}

impl<P> Future for WaitUntil<P>
where
    P: Fn() -> bool,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if (self.predicate)() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
