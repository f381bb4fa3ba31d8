// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured instrumentation for the frame scheduler.
//!
//! The scheduler reports each state transition to a [`TraceSink`]. All sink
//! methods default to no-ops, so implementing only the events you care about
//! is fine. With the default [`NoopSink`] every call compiles away.
//!
//! Sinks for development and post-mortem analysis (pretty printing, binary
//! recording, Chrome trace export) live in `framegate_debug`.

use alloc::boxed::Box;

use crate::error::ContractViolation;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every frame request, including coalesced ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequestedEvent {
    /// Time of the request.
    pub now: HostTime,
    /// `true` when a request was already pending and this one folded into it.
    pub coalesced: bool,
}

/// Emitted when the one-shot timer is armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerArmedEvent {
    /// Time the timer was armed.
    pub now: HostTime,
    /// When the timer will fire.
    pub deadline: HostTime,
}

/// Emitted just before the producer is invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStartEvent {
    /// Sequence number of the frame, starting at 0.
    pub frame_index: u64,
    /// Time the frame started.
    pub now: HostTime,
    /// Earliest time the following frame may start.
    pub next_frame_time: HostTime,
}

/// Emitted after the producer returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameEndEvent {
    /// Sequence number of the frame.
    pub frame_index: u64,
    /// Time the producer returned.
    pub now: HostTime,
    /// Whether the producer reported the frame as sent.
    pub sent: bool,
}

/// Emitted when the timer fires but an acknowledgement is still outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameBlockedEvent {
    /// Time of the blocked fire.
    pub now: HostTime,
}

/// Emitted when the producer reports a frame as sent to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSentEvent {
    /// Sequence number of the sent frame.
    pub frame_index: u64,
    /// Time of the report.
    pub now: HostTime,
}

/// Emitted when the client acknowledges a sent frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AckReceivedEvent {
    /// Sequence number of the acknowledged frame.
    pub frame_index: u64,
    /// Time the acknowledgement arrived.
    pub now: HostTime,
}

/// Emitted when a send/ack notification violates call order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractViolationEvent {
    /// Time of the offending call.
    pub now: HostTime,
    /// What was violated.
    pub violation: ContractViolation,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scheduler.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for every frame request.
    fn on_frame_requested(&mut self, e: &FrameRequestedEvent) {
        _ = e;
    }

    /// Called when the timer is armed.
    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        _ = e;
    }

    /// Called just before the producer runs.
    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        _ = e;
    }

    /// Called after the producer returns.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called when a timer fire is refused because an ack is outstanding.
    fn on_frame_blocked(&mut self, e: &FrameBlockedEvent) {
        _ = e;
    }

    /// Called when a frame is reported as sent.
    fn on_frame_sent(&mut self, e: &FrameSentEvent) {
        _ = e;
    }

    /// Called when an acknowledgement is accepted.
    fn on_ack_received(&mut self, e: &AckReceivedEvent) {
        _ = e;
    }

    /// Called when a notification is rejected.
    fn on_contract_violation(&mut self, e: &ContractViolationEvent) {
        _ = e;
    }
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn on_frame_requested(&mut self, e: &FrameRequestedEvent) {
        (**self).on_frame_requested(e);
    }

    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        (**self).on_timer_armed(e);
    }

    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        (**self).on_frame_start(e);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        (**self).on_frame_end(e);
    }

    fn on_frame_blocked(&mut self, e: &FrameBlockedEvent) {
        (**self).on_frame_blocked(e);
    }

    fn on_frame_sent(&mut self, e: &FrameSentEvent) {
        (**self).on_frame_sent(e);
    }

    fn on_ack_received(&mut self, e: &AckReceivedEvent) {
        (**self).on_ack_received(e);
    }

    fn on_contract_violation(&mut self, e: &ContractViolationEvent) {
        (**self).on_contract_violation(e);
    }
}

impl<S: TraceSink + ?Sized> TraceSink for Box<S> {
    fn on_frame_requested(&mut self, e: &FrameRequestedEvent) {
        (**self).on_frame_requested(e);
    }

    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        (**self).on_timer_armed(e);
    }

    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        (**self).on_frame_start(e);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        (**self).on_frame_end(e);
    }

    fn on_frame_blocked(&mut self, e: &FrameBlockedEvent) {
        (**self).on_frame_blocked(e);
    }

    fn on_frame_sent(&mut self, e: &FrameSentEvent) {
        (**self).on_frame_sent(e);
    }

    fn on_ack_received(&mut self, e: &AckReceivedEvent) {
        (**self).on_ack_received(e);
    }

    fn on_contract_violation(&mut self, e: &ContractViolationEvent) {
        (**self).on_contract_violation(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
