// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-shot timer slot.

use crate::time::HostTime;

/// A single-shot timer: at most one deadline, fires at most once per arming.
///
/// The timer does not run anything by itself. Its owner polls it with the
/// current time (see [`FrameScheduler::poll`]) and an event loop can sleep
/// until [`deadline`](Self::deadline). Dropping the timer cancels it.
///
/// [`FrameScheduler::poll`]: crate::scheduler::FrameScheduler::poll
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OneShotTimer {
    deadline: Option<HostTime>,
}

impl OneShotTimer {
    /// Creates a stopped timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arms the timer for `deadline`, replacing any previous deadline.
    pub fn start(&mut self, deadline: HostTime) {
        self.deadline = Some(deadline);
    }

    /// Disarms the timer.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` while a deadline is armed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// The armed deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<HostTime> {
        self.deadline
    }

    /// Disarms and returns `true` if the deadline has been reached at `now`.
    pub fn fire_if_expired(&mut self, now: HostTime) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_arming() {
        let mut timer = OneShotTimer::new();
        timer.start(HostTime(100));
        assert!(!timer.fire_if_expired(HostTime(99)), "not yet due");
        assert!(timer.fire_if_expired(HostTime(100)), "due at the deadline");
        assert!(!timer.fire_if_expired(HostTime(200)), "already fired");
        assert!(!timer.is_running(), "firing disarms");
    }

    #[test]
    fn stop_cancels() {
        let mut timer = OneShotTimer::new();
        timer.start(HostTime(10));
        timer.stop();
        assert_eq!(timer.deadline(), None, "stopped");
        assert!(!timer.fire_if_expired(HostTime(10)), "cancelled timer never fires");
    }
}
