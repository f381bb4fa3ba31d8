// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling with minimum spacing and acknowledgement backpressure.
//!
//! The [`FrameScheduler`] decides *when* its [`FrameProducer`] may start a
//! new frame. Two rules gate every frame start:
//!
//! - **Spacing**: successive frame starts are at least
//!   [`SchedulerConfig::frame_delay`] apart.
//! - **Backpressure**: once a frame has been reported as sent to the remote
//!   consumer, no further frame starts until the consumer acknowledges it.
//!
//! Requests coalesce: any number of
//! [`schedule_frame_update`](FrameScheduler::schedule_frame_update) calls
//! before the next frame starts produce a single frame.
//!
//! # Driving the scheduler
//!
//! The scheduler owns a [`OneShotTimer`] but no thread. Whoever owns it
//! calls [`poll`](FrameScheduler::poll) when the timer's deadline
//! ([`next_deadline`](FrameScheduler::next_deadline)) has been reached.
//! `framegate_backend_std::EventLoop` does this with a real clock; tests do it
//! with a [`ManualClock`](crate::clock::ManualClock).
//!
//! ```
//! use framegate_core::clock::ManualClock;
//! use framegate_core::producer::FrameUpdate;
//! use framegate_core::scheduler::{FrameScheduler, SchedulerConfig};
//! use framegate_core::time::HostTime;
//!
//! let clock = ManualClock::new(HostTime(1_000));
//! let mut frames = 0;
//! let producer = |update: &mut FrameUpdate<'_>| {
//!     frames += 1;
//!     update.did_send_frame_update_to_client().unwrap();
//! };
//! let mut scheduler = FrameScheduler::new(producer, &clock, SchedulerConfig::immediate());
//!
//! scheduler.schedule_frame_update();
//! assert!(scheduler.poll());
//!
//! // Blocked until the consumer acknowledges the first frame.
//! scheduler.schedule_frame_update();
//! assert!(!scheduler.poll());
//! scheduler.did_receive_frame_update_ack().unwrap();
//! assert!(scheduler.poll());
//! ```

use crate::clock::Clock;
use crate::error::ContractViolation;
use crate::producer::{FrameProducer, FrameUpdate};
use crate::time::{Duration, HostTime, Timebase};
use crate::timer::OneShotTimer;
use crate::trace::{
    AckReceivedEvent, ContractViolationEvent, FrameBlockedEvent, FrameEndEvent,
    FrameRequestedEvent, FrameSentEvent, FrameStartEvent, NoopSink, TimerArmedEvent, TraceSink,
};

/// Configuration for the [`FrameScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Minimum spacing between successive frame starts.
    pub frame_delay: Duration,
}

impl SchedulerConfig {
    /// Default frame spacing: 30 ms at 1 ns ticks.
    pub const DEFAULT_FRAME_DELAY: Duration = Duration(30_000_000);

    /// Default configuration ([`DEFAULT_FRAME_DELAY`](Self::DEFAULT_FRAME_DELAY)).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frame_delay: Self::DEFAULT_FRAME_DELAY,
        }
    }

    /// No spacing: a frame may start as soon as it is requested and
    /// unblocked.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            frame_delay: Duration::ZERO,
        }
    }

    /// Configuration with an explicit frame spacing.
    #[must_use]
    pub const fn with_frame_delay(frame_delay: Duration) -> Self {
        Self { frame_delay }
    }

    /// Configuration capped at `fps` frames per second. `fps == 0` is
    /// treated as 1.
    #[must_use]
    pub const fn with_target_fps(fps: u32, timebase: Timebase) -> Self {
        Self {
            frame_delay: Duration::per_second(fps, timebase),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Effective scheduler state, derived from its flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Nothing requested.
    Idle,
    /// A frame is requested and the timer is armed.
    PendingDelay,
    /// The producer is running.
    InFrame,
    /// A sent frame awaits acknowledgement. Requests are recorded but held.
    AckPending,
}

/// Counters over the scheduler's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Frame requests, including coalesced ones.
    pub requests: u64,
    /// Requests that folded into an already pending one.
    pub coalesced_requests: u64,
    /// Producer invocations.
    pub frames_started: u64,
    /// Frames reported as sent.
    pub frames_sent: u64,
    /// Accepted acknowledgements.
    pub acks_received: u64,
    /// Timer fires refused because an ack was outstanding.
    pub blocked_fires: u64,
    /// Rejected send/ack notifications.
    pub contract_violations: u64,
}

/// Flags shared between the scheduler and the in-progress [`FrameUpdate`].
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Flags {
    pub(crate) needs_frame_update: bool,
    pub(crate) frame_ack_pending: bool,
    pub(crate) in_frame_update: bool,
    /// Index of the frame awaiting acknowledgement, valid while
    /// `frame_ack_pending`.
    pub(crate) unacked_frame: u64,
    pub(crate) stats: SchedulerStats,
}

impl Flags {
    pub(crate) fn mark_sent(
        &mut self,
        sink: &mut dyn TraceSink,
        now: HostTime,
        frame_index: u64,
    ) -> Result<(), ContractViolation> {
        if !self.in_frame_update {
            return Err(self.reject(sink, now, ContractViolation::SendOutsideFrameUpdate));
        }
        if self.frame_ack_pending {
            return Err(self.reject(sink, now, ContractViolation::SendWhileAckPending));
        }
        self.frame_ack_pending = true;
        self.unacked_frame = frame_index;
        self.stats.frames_sent += 1;
        sink.on_frame_sent(&FrameSentEvent { frame_index, now });
        tracing::debug!(frame_index, "frame update sent to client");
        Ok(())
    }

    pub(crate) fn reject(
        &mut self,
        sink: &mut dyn TraceSink,
        now: HostTime,
        violation: ContractViolation,
    ) -> ContractViolation {
        self.stats.contract_violations += 1;
        sink.on_contract_violation(&ContractViolationEvent { now, violation });
        tracing::warn!(violation = violation.as_str(), "{violation}");
        violation
    }
}

/// Gates frame production on a minimum spacing and on consumer
/// acknowledgements.
///
/// # Lifecycle
///
/// One scheduler per producer/consumer session, constructed with the
/// producer and a clock. All methods must be called from the same sequence;
/// use `framegate_backend_std::EventLoop` to confine a scheduler to a thread
/// and reach it from others. Dropping the scheduler drops its timer, so no
/// frame can start afterwards.
///
/// # States
///
/// ```text
///            schedule_frame_update()
///   Idle ───────────────────────────► PendingDelay
///    ▲                                   │ poll() after the delay
///    │ producer did not send             ▼
///    └────────────────────────────── InFrame
///                                        │ producer sent the frame
///    ┌── did_receive_frame_update_ack() ─┘
///    ▼                                   ▼
///   Idle / PendingDelay ◄──────────── AckPending
/// ```
pub struct FrameScheduler<P, C, S = NoopSink> {
    producer: P,
    clock: C,
    sink: S,
    flags: Flags,
    next_frame_time: HostTime,
    frame_delay: Duration,
    timer: OneShotTimer,
}

impl<P, C, S> core::fmt::Debug for FrameScheduler<P, C, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("flags", &self.flags)
            .field("next_frame_time", &self.next_frame_time)
            .field("frame_delay", &self.frame_delay)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl<P: FrameProducer, C: Clock> FrameScheduler<P, C> {
    /// Creates a scheduler for `producer` reading time from `clock`.
    #[must_use]
    pub fn new(producer: P, clock: C, config: SchedulerConfig) -> Self {
        Self::with_trace_sink(producer, clock, config, NoopSink)
    }
}

impl<P: FrameProducer, C: Clock, S: TraceSink> FrameScheduler<P, C, S> {
    /// Creates a scheduler that reports its transitions to `sink`.
    #[must_use]
    pub fn with_trace_sink(producer: P, clock: C, config: SchedulerConfig, sink: S) -> Self {
        Self {
            producer,
            clock,
            sink,
            flags: Flags::default(),
            // The first frame may start immediately.
            next_frame_time: HostTime::ZERO,
            frame_delay: config.frame_delay,
            timer: OneShotTimer::new(),
        }
    }

    /// Requests a frame update.
    ///
    /// Does nothing if a request is already pending; otherwise arms the
    /// timer unless a sent frame is still awaiting acknowledgement.
    pub fn schedule_frame_update(&mut self) {
        let now = self.clock.now();
        let coalesced = self.flags.needs_frame_update;
        self.flags.stats.requests += 1;
        self.sink
            .on_frame_requested(&FrameRequestedEvent { now, coalesced });
        if coalesced {
            self.flags.stats.coalesced_requests += 1;
            return;
        }
        self.flags.needs_frame_update = true;
        self.schedule_frame_update_if_necessary();
    }

    /// Reports that the current frame was sent to the client.
    ///
    /// Sends are only valid from inside the producer callback, through
    /// [`FrameUpdate::did_send_frame_update_to_client`]. The producer holds
    /// the only access to the scheduler while a frame update runs, so this
    /// entry point always fails with
    /// [`ContractViolation::SendOutsideFrameUpdate`]; the violation is
    /// logged, counted and traced like any other.
    pub fn did_send_frame_update_to_client(&mut self) -> Result<(), ContractViolation> {
        let now = self.clock.now();
        Err(self
            .flags
            .reject(&mut self.sink, now, ContractViolation::SendOutsideFrameUpdate))
    }

    /// Reports that the client acknowledged the last sent frame.
    ///
    /// Clears the backpressure and re-arms the timer if a request is
    /// pending. Fails with [`ContractViolation::UnexpectedAck`], leaving the
    /// state unchanged, if no frame was awaiting acknowledgement.
    pub fn did_receive_frame_update_ack(&mut self) -> Result<(), ContractViolation> {
        let now = self.clock.now();
        if !self.flags.frame_ack_pending {
            return Err(self
                .flags
                .reject(&mut self.sink, now, ContractViolation::UnexpectedAck));
        }
        self.flags.frame_ack_pending = false;
        self.flags.stats.acks_received += 1;
        let frame_index = self.flags.unacked_frame;
        self.sink
            .on_ack_received(&AckReceivedEvent { frame_index, now });
        tracing::debug!(frame_index, "frame update acknowledged");
        self.schedule_frame_update_if_necessary();
        Ok(())
    }

    /// Fires the timer if its deadline has passed.
    ///
    /// Returns `true` if the producer was invoked.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now();
        if !self.timer.fire_if_expired(now) {
            return false;
        }
        self.start_frame_update(now)
    }

    /// When the armed timer fires, if it is armed.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.timer.deadline()
    }

    /// Whether a frame update has been requested but not yet started.
    #[must_use]
    pub fn needs_frame_update(&self) -> bool {
        self.flags.needs_frame_update
    }

    /// Whether a sent frame is awaiting acknowledgement.
    #[must_use]
    pub fn frame_ack_pending(&self) -> bool {
        self.flags.frame_ack_pending
    }

    /// Whether the producer is running.
    #[must_use]
    pub fn in_frame_update(&self) -> bool {
        self.flags.in_frame_update
    }

    /// Earliest time the next frame may start.
    #[must_use]
    pub fn next_frame_time(&self) -> HostTime {
        self.next_frame_time
    }

    /// Minimum spacing between frame starts.
    #[must_use]
    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    /// Overrides the minimum spacing. Intended for tests.
    ///
    /// Takes effect from the next frame start; an armed timer keeps its
    /// deadline.
    pub fn set_frame_delay(&mut self, frame_delay: Duration) {
        self.frame_delay = frame_delay;
    }

    /// The effective state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.flags.in_frame_update {
            SchedulerState::InFrame
        } else if self.flags.frame_ack_pending {
            SchedulerState::AckPending
        } else if self.flags.needs_frame_update {
            SchedulerState::PendingDelay
        } else {
            SchedulerState::Idle
        }
    }

    /// Lifetime counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.flags.stats
    }

    /// The producer.
    #[must_use]
    pub fn producer(&self) -> &P {
        &self.producer
    }

    /// The producer, mutably.
    pub fn producer_mut(&mut self) -> &mut P {
        &mut self.producer
    }

    /// The clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The trace sink.
    #[must_use]
    pub fn trace_sink(&self) -> &S {
        &self.sink
    }

    /// The trace sink, mutably.
    pub fn trace_sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the scheduler, cancelling its timer, and returns the
    /// producer and trace sink.
    pub fn into_parts(self) -> (P, S) {
        (self.producer, self.sink)
    }

    fn should_produce_frame_updates(&self) -> bool {
        self.flags.needs_frame_update && !self.flags.frame_ack_pending
    }

    fn schedule_frame_update_if_necessary(&mut self) {
        if !self.should_produce_frame_updates() || self.timer.is_running() {
            return;
        }
        let now = self.clock.now();
        let delay = self.next_frame_time.saturating_duration_since(now);
        let deadline = now.saturating_add(delay);
        self.timer.start(deadline);
        self.sink.on_timer_armed(&TimerArmedEvent { now, deadline });
        tracing::trace!(delay = delay.ticks(), "frame timer armed");
    }

    fn start_frame_update(&mut self, now: HostTime) -> bool {
        if self.flags.frame_ack_pending {
            // Unreachable through the public API: the timer is only armed
            // while no ack is pending. The ack path re-arms it.
            self.flags.stats.blocked_fires += 1;
            self.sink.on_frame_blocked(&FrameBlockedEvent { now });
            tracing::debug!("frame timer fired while an ack is pending");
            return false;
        }

        self.flags.needs_frame_update = false;
        self.next_frame_time = now.saturating_add(self.frame_delay);
        let frame_index = self.flags.stats.frames_started;
        self.flags.stats.frames_started += 1;
        self.sink.on_frame_start(&FrameStartEvent {
            frame_index,
            now,
            next_frame_time: self.next_frame_time,
        });
        tracing::trace!(frame_index, "starting frame update");

        {
            let mut update = FrameUpdate::begin(&mut self.flags, &mut self.sink, now, frame_index);
            self.producer.start_frame_update(&mut update);
        }

        let sent = self.flags.frame_ack_pending;
        self.sink.on_frame_end(&FrameEndEvent {
            frame_index,
            now: self.clock.now(),
            sent,
        });
        self.schedule_frame_update_if_necessary();
        true
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::clock::ManualClock;

    use super::*;

    const DELAY: Duration = Duration(30);

    /// Records start times and optionally reports each frame as sent.
    #[derive(Default)]
    struct Recorder {
        starts: Vec<HostTime>,
        send: bool,
        request_follow_up: bool,
    }

    impl FrameProducer for Recorder {
        fn start_frame_update(&mut self, update: &mut FrameUpdate<'_>) {
            self.starts.push(update.now());
            if self.send {
                update
                    .did_send_frame_update_to_client()
                    .expect("first send of a frame is accepted");
            }
            if self.request_follow_up {
                update.schedule_frame_update();
            }
        }
    }

    fn sender() -> Recorder {
        Recorder {
            send: true,
            ..Recorder::default()
        }
    }

    fn scheduler(
        clock: &ManualClock,
        producer: Recorder,
        delay: Duration,
    ) -> FrameScheduler<Recorder, &ManualClock> {
        FrameScheduler::new(producer, clock, SchedulerConfig::with_frame_delay(delay))
    }

    fn frames(s: &FrameScheduler<Recorder, &ManualClock>) -> usize {
        s.producer().starts.len()
    }

    #[test]
    fn first_frame_is_immediate() {
        let clock = ManualClock::new(HostTime(1_000));
        let mut s = scheduler(&clock, Recorder::default(), DELAY);

        s.schedule_frame_update();
        assert_eq!(s.next_deadline(), Some(HostTime(1_000)), "armed for now");
        assert!(s.poll(), "fires without advancing the clock");
        assert_eq!(frames(&s), 1, "one frame");
        assert!(!s.needs_frame_update(), "request consumed");
        assert_eq!(s.state(), SchedulerState::Idle, "back to idle");
    }

    #[test]
    fn requests_coalesce_into_one_frame() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, Recorder::default(), DELAY);

        for _ in 0..5 {
            s.schedule_frame_update();
        }
        assert_eq!(s.state(), SchedulerState::PendingDelay, "pending");
        assert!(s.poll(), "fires");
        assert!(!s.poll(), "only once");
        assert_eq!(frames(&s), 1, "coalesced");
        assert_eq!(s.stats().requests, 5, "all requests counted");
        assert_eq!(s.stats().coalesced_requests, 4, "four folded");
    }

    #[test]
    fn frames_are_spaced_by_the_delay() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, Recorder::default(), DELAY);

        s.schedule_frame_update();
        assert!(s.poll(), "first frame");
        assert_eq!(s.next_frame_time(), HostTime(30), "next frame time moved");

        clock.advance(Duration(10));
        s.schedule_frame_update();
        assert_eq!(s.next_deadline(), Some(HostTime(30)), "waits out the delay");
        assert!(!s.poll(), "too early");

        clock.advance(Duration(19));
        assert!(!s.poll(), "still too early");

        clock.advance(Duration(1));
        assert!(s.poll(), "due");
        assert_eq!(
            s.producer().starts,
            [HostTime(0), HostTime(30)],
            "start times"
        );
    }

    #[test]
    fn late_request_is_not_delayed() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, Recorder::default(), DELAY);

        s.schedule_frame_update();
        s.poll();
        clock.advance(Duration(100));
        s.schedule_frame_update();
        assert_eq!(s.next_deadline(), Some(HostTime(100)), "delay already elapsed");
    }

    #[test]
    fn sent_frame_blocks_until_ack() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, sender(), Duration::ZERO);

        s.schedule_frame_update();
        assert!(s.poll(), "first frame");
        assert_eq!(s.state(), SchedulerState::AckPending, "awaiting ack");

        for _ in 0..3 {
            s.schedule_frame_update();
        }
        assert!(s.needs_frame_update(), "request recorded");
        assert_eq!(s.next_deadline(), None, "no timer while blocked");
        clock.advance(Duration(1_000));
        assert!(!s.poll(), "still blocked");

        s.did_receive_frame_update_ack().expect("ack is pending");
        assert_eq!(s.state(), SchedulerState::PendingDelay, "unblocked");
        assert!(s.poll(), "second frame");
        assert_eq!(frames(&s), 2, "two frames");
    }

    #[test]
    fn coalesce_then_backpressure_session() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, Recorder::default(), Duration::ZERO);

        s.schedule_frame_update();
        s.poll();
        assert_eq!(frames(&s), 1, "first request served");

        s.schedule_frame_update();
        s.schedule_frame_update();
        assert_eq!(frames(&s), 1, "nothing runs before the loop is pumped");
        // The second frame is handed to the client.
        s.producer_mut().send = true;
        s.poll();
        assert_eq!(frames(&s), 2, "two requests coalesced into one frame");

        s.schedule_frame_update();
        s.poll();
        assert_eq!(frames(&s), 2, "held until the client acks");

        s.did_receive_frame_update_ack().expect("ack is pending");
        s.poll();
        assert_eq!(frames(&s), 3, "released by the ack");
    }

    #[test]
    fn every_ack_retriggers_scheduling() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, sender(), DELAY);

        for round in 1..=4 {
            s.schedule_frame_update();
            if round > 1 {
                assert!(!s.poll(), "blocked before ack in round {round}");
                s.did_receive_frame_update_ack().expect("ack is pending");
            }
            clock.advance(DELAY);
            assert!(s.poll(), "frame in round {round}");
        }
        assert_eq!(frames(&s), 4, "one frame per round");
        assert_eq!(s.stats().acks_received, 3, "three acks");
    }

    #[test]
    fn ack_without_pending_request_goes_idle() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, sender(), DELAY);

        s.schedule_frame_update();
        s.poll();
        s.did_receive_frame_update_ack().expect("ack is pending");
        assert_eq!(s.state(), SchedulerState::Idle, "nothing requested");
        assert_eq!(s.next_deadline(), None, "timer not armed");
    }

    #[test]
    fn unexpected_ack_is_rejected() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, Recorder::default(), DELAY);

        assert_eq!(
            s.did_receive_frame_update_ack(),
            Err(ContractViolation::UnexpectedAck),
            "no frame was sent"
        );

        s.schedule_frame_update();
        s.poll();
        assert_eq!(
            s.did_receive_frame_update_ack(),
            Err(ContractViolation::UnexpectedAck),
            "frame was produced but never sent"
        );
        assert_eq!(s.stats().contract_violations, 2, "both counted");
        assert_eq!(s.state(), SchedulerState::Idle, "state unchanged");
    }

    #[test]
    fn send_outside_frame_update_is_rejected() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, Recorder::default(), DELAY);

        assert_eq!(
            s.did_send_frame_update_to_client(),
            Err(ContractViolation::SendOutsideFrameUpdate),
            "no frame in progress"
        );
        assert!(!s.frame_ack_pending(), "not marked as sent");
        assert_eq!(s.stats().contract_violations, 1, "violation counted");

        s.schedule_frame_update();
        assert!(s.poll(), "frame started");
        assert_eq!(
            s.did_send_frame_update_to_client(),
            Err(ContractViolation::SendOutsideFrameUpdate),
            "producer already returned"
        );
        assert!(!s.frame_ack_pending(), "still not marked as sent");
        assert_eq!(s.stats().frames_sent, 0, "nothing sent");
        assert_eq!(s.stats().contract_violations, 2, "second violation counted");
    }

    #[test]
    fn double_send_in_one_frame_is_rejected() {
        let clock = ManualClock::new(HostTime(0));
        let mut results = Vec::new();
        let producer = |update: &mut FrameUpdate<'_>| {
            results.push(update.did_send_frame_update_to_client());
            results.push(update.did_send_frame_update_to_client());
        };
        let mut s = FrameScheduler::new(producer, &clock, SchedulerConfig::immediate());
        s.schedule_frame_update();
        s.poll();
        assert!(s.frame_ack_pending(), "first send counted");
        assert_eq!(s.stats().frames_sent, 1, "one send");
        drop(s);
        assert_eq!(
            results,
            [Ok(()), Err(ContractViolation::SendWhileAckPending)],
            "second send rejected"
        );
    }

    #[test]
    fn follow_up_request_from_producer_respects_delay() {
        let clock = ManualClock::new(HostTime(0));
        let producer = Recorder {
            request_follow_up: true,
            ..Recorder::default()
        };
        let mut s = scheduler(&clock, producer, DELAY);

        s.schedule_frame_update();
        assert!(s.poll(), "first frame");
        assert!(s.needs_frame_update(), "producer asked for more");
        assert_eq!(s.next_deadline(), Some(HostTime(30)), "spaced by the delay");
        clock.advance(DELAY);
        assert!(s.poll(), "follow-up frame");
    }

    #[test]
    fn follow_up_request_after_send_waits_for_ack() {
        let clock = ManualClock::new(HostTime(0));
        let producer = Recorder {
            send: true,
            request_follow_up: true,
            ..Recorder::default()
        };
        let mut s = scheduler(&clock, producer, Duration::ZERO);

        s.schedule_frame_update();
        s.poll();
        assert_eq!(s.next_deadline(), None, "held by backpressure");
        s.did_receive_frame_update_ack().expect("ack is pending");
        assert!(s.poll(), "released by the ack");
    }

    #[test]
    fn frame_delay_override_applies_to_next_frame() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = scheduler(&clock, Recorder::default(), DELAY);
        s.set_frame_delay(Duration(5));
        assert_eq!(s.frame_delay(), Duration(5), "override stored");

        s.schedule_frame_update();
        s.poll();
        assert_eq!(s.next_frame_time(), HostTime(5), "uses the override");
    }

    #[test]
    fn in_frame_update_is_cleared_after_producer_returns() {
        let clock = ManualClock::new(HostTime(0));
        let mut seen = false;
        let producer = |update: &mut FrameUpdate<'_>| {
            seen = update.frame_index() == 0;
        };
        let mut s = FrameScheduler::new(producer, &clock, SchedulerConfig::immediate());
        s.schedule_frame_update();
        s.poll();
        assert!(!s.in_frame_update(), "cleared");
        drop(s);
        assert!(seen, "producer ran with frame index 0");
    }

    #[test]
    fn target_fps_config() {
        let config = SchedulerConfig::with_target_fps(50, Timebase::NANOS);
        assert_eq!(config.frame_delay, Duration(20_000_000), "50 Hz");
        assert_eq!(
            SchedulerConfig::default().frame_delay,
            Duration(30_000_000),
            "30ms default"
        );
    }

    #[derive(Default)]
    struct Transitions(Vec<&'static str>);

    impl TraceSink for Transitions {
        fn on_frame_requested(&mut self, e: &FrameRequestedEvent) {
            self.0
                .push(if e.coalesced { "coalesced" } else { "requested" });
        }
        fn on_timer_armed(&mut self, _: &TimerArmedEvent) {
            self.0.push("armed");
        }
        fn on_frame_start(&mut self, _: &FrameStartEvent) {
            self.0.push("start");
        }
        fn on_frame_end(&mut self, _: &FrameEndEvent) {
            self.0.push("end");
        }
        fn on_frame_sent(&mut self, _: &FrameSentEvent) {
            self.0.push("sent");
        }
        fn on_ack_received(&mut self, _: &AckReceivedEvent) {
            self.0.push("ack");
        }
        fn on_contract_violation(&mut self, _: &ContractViolationEvent) {
            self.0.push("violation");
        }
    }

    #[test]
    fn trace_sink_sees_transitions_in_order() {
        let clock = ManualClock::new(HostTime(0));
        let mut s = FrameScheduler::with_trace_sink(
            sender(),
            &clock,
            SchedulerConfig::immediate(),
            Transitions::default(),
        );
        s.schedule_frame_update();
        s.schedule_frame_update();
        s.poll();
        s.did_receive_frame_update_ack().expect("ack is pending");
        let _ = s.did_receive_frame_update_ack();

        let (_, sink) = s.into_parts();
        assert_eq!(
            sink.0,
            [
                "requested",
                "armed",
                "coalesced",
                "start",
                "sent",
                "end",
                "ack",
                "violation"
            ],
            "transition order"
        );
    }
}
