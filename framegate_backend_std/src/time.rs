// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host clock reads for the std backend.

use framegate_core::clock::Clock;
use framegate_core::time::{Duration, HostTime, Timebase};

#[cfg(unix)]
const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Returns the backend [`Timebase`]: host ticks are nanoseconds.
#[must_use]
pub const fn timebase() -> Timebase {
    Timebase::NANOS
}

/// Returns the current monotonic host time in nanoseconds.
#[cfg(unix)]
#[must_use]
pub fn now() -> HostTime {
    let timespec = rustix::time::clock_gettime(rustix::time::ClockId::Monotonic);
    timespec_to_host_time(timespec)
}

/// Returns the current monotonic host time in nanoseconds since the first
/// clock read of this process.
#[cfg(not(unix))]
#[must_use]
pub fn now() -> HostTime {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let elapsed = EPOCH.get_or_init(Instant::now).elapsed();
    HostTime(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
}

#[cfg(unix)]
fn timespec_to_host_time(timespec: rustix::time::Timespec) -> HostTime {
    let seconds = u64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(timespec.tv_nsec)
        .unwrap_or(0)
        .min(999_999_999);

    let ticks_u128 = u128::from(seconds)
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(u128::from(nanos));
    let ticks = u64::try_from(ticks_u128).unwrap_or(u64::MAX);
    HostTime(ticks)
}

/// Converts a span in backend ticks to a [`std::time::Duration`].
#[must_use]
pub fn to_std(duration: Duration) -> std::time::Duration {
    std::time::Duration::from_nanos(duration.to_nanos(timebase()))
}

/// The system monotonic clock (`CLOCK_MONOTONIC` on Unix).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> HostTime {
        now()
    }
}
