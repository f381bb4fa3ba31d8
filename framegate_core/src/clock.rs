// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clock sources for the scheduler.
//!
//! The scheduler reads time through the [`Clock`] trait so that the same
//! state machine runs against a real monotonic clock (see
//! `framegate_backend_std::MonotonicClock`) or against [`ManualClock`] for
//! deterministic tests and simulations.

use core::cell::Cell;

use crate::time::{Duration, HostTime};

/// A monotonic time source.
pub trait Clock {
    /// Returns the current time. Successive calls never go backwards.
    fn now(&self) -> HostTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> HostTime {
        (**self).now()
    }
}

/// A virtual clock that only moves when told to.
///
/// Interior mutability lets a test keep a shared reference while a scheduler
/// holds another one:
///
/// ```
/// use framegate_core::clock::{Clock, ManualClock};
/// use framegate_core::time::{Duration, HostTime};
///
/// let clock = ManualClock::new(HostTime(100));
/// let borrowed = &clock;
/// clock.advance(Duration(5));
/// assert_eq!(borrowed.now(), HostTime(105));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<HostTime>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub const fn new(start: HostTime) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Moves the clock forward by `by`, saturating at the end of the clock.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Moves the clock to `to`. Earlier times are ignored.
    pub fn set(&self, to: HostTime) {
        if to > self.now.get() {
            self.now.set(to);
        }
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> HostTime {
        self.now.get()
    }
}
