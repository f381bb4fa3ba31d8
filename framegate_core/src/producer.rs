// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The producer side of the scheduler.
//!
//! A [`FrameProducer`] is invoked synchronously each time the scheduler lets
//! a frame start. It receives a [`FrameUpdate`] handle that is only alive for
//! the duration of the call, so "report the frame as sent" can only happen
//! while a frame update is in progress.

use crate::error::ContractViolation;
use crate::scheduler::Flags;
use crate::time::HostTime;
use crate::trace::{FrameRequestedEvent, TraceSink};

/// Generates frames on demand.
pub trait FrameProducer {
    /// Starts producing a frame now.
    ///
    /// Runs to completion on the scheduler's sequence. Call
    /// [`FrameUpdate::did_send_frame_update_to_client`] if the frame was
    /// handed to the remote consumer; the scheduler will then hold further
    /// frames until the consumer acknowledges it.
    fn start_frame_update(&mut self, update: &mut FrameUpdate<'_>);
}

impl<F> FrameProducer for F
where
    F: FnMut(&mut FrameUpdate<'_>),
{
    fn start_frame_update(&mut self, update: &mut FrameUpdate<'_>) {
        self(update);
    }
}

/// Handle to the frame update in progress.
///
/// Created by the scheduler right before the producer runs and dropped right
/// after it returns. Dropping it (also during unwinding) ends the frame
/// update.
pub struct FrameUpdate<'a> {
    flags: &'a mut Flags,
    sink: &'a mut dyn TraceSink,
    now: HostTime,
    frame_index: u64,
}

impl core::fmt::Debug for FrameUpdate<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameUpdate")
            .field("now", &self.now)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl<'a> FrameUpdate<'a> {
    pub(crate) fn begin(
        flags: &'a mut Flags,
        sink: &'a mut dyn TraceSink,
        now: HostTime,
        frame_index: u64,
    ) -> Self {
        flags.in_frame_update = true;
        Self {
            flags,
            sink,
            now,
            frame_index,
        }
    }

    /// Time at which this frame update started.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// Sequence number of this frame, starting at 0.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether this frame has already been reported as sent.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.flags.frame_ack_pending
    }

    /// Reports that this frame was transmitted to the remote consumer.
    ///
    /// No further frame starts until the scheduler receives
    /// [`did_receive_frame_update_ack`](crate::scheduler::FrameScheduler::did_receive_frame_update_ack).
    /// Reporting the same frame twice is rejected with
    /// [`ContractViolation::SendWhileAckPending`].
    pub fn did_send_frame_update_to_client(&mut self) -> Result<(), ContractViolation> {
        self.flags.mark_sent(&mut *self.sink, self.now, self.frame_index)
    }

    /// Requests another frame after this one.
    ///
    /// The request is evaluated once the producer returns, so the follow-up
    /// frame still respects the minimum spacing and any outstanding ack.
    pub fn schedule_frame_update(&mut self) {
        let coalesced = self.flags.needs_frame_update;
        self.flags.needs_frame_update = true;
        self.flags.stats.requests += 1;
        if coalesced {
            self.flags.stats.coalesced_requests += 1;
        }
        self.sink.on_frame_requested(&FrameRequestedEvent {
            now: self.now,
            coalesced,
        });
    }
}

impl Drop for FrameUpdate<'_> {
    fn drop(&mut self) {
        self.flags.in_frame_update = false;
    }
}
