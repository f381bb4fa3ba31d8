// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each prefixed by a one-byte
//! tag. [`decode`] reads them back as an iterator of [`RecordedEvent`] and
//! stops at an unknown tag or a truncated record.

use framegate_core::error::ContractViolation;
use framegate_core::time::HostTime;
use framegate_core::trace::{
    AckReceivedEvent, ContractViolationEvent, FrameBlockedEvent, FrameEndEvent,
    FrameRequestedEvent, FrameSentEvent, FrameStartEvent, TimerArmedEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_REQUESTED: u8 = 1;
const TAG_TIMER_ARMED: u8 = 2;
const TAG_FRAME_START: u8 = 3;
const TAG_FRAME_END: u8 = 4;
const TAG_FRAME_BLOCKED: u8 = 5;
const TAG_FRAME_SENT: u8 = 6;
const TAG_ACK_RECEIVED: u8 = 7;
const TAG_CONTRACT_VIOLATION: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_time(&mut self, t: HostTime) {
        self.write_u64(t.ticks());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_violation(&mut self, v: ContractViolation) {
        self.write_u8(match v {
            ContractViolation::SendOutsideFrameUpdate => 0,
            ContractViolation::SendWhileAckPending => 1,
            ContractViolation::UnexpectedAck => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_requested(&mut self, e: &FrameRequestedEvent) {
        self.write_u8(TAG_FRAME_REQUESTED);
        self.write_time(e.now);
        self.write_bool(e.coalesced);
    }

    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        self.write_u8(TAG_TIMER_ARMED);
        self.write_time(e.now);
        self.write_time(e.deadline);
    }

    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        self.write_u8(TAG_FRAME_START);
        self.write_u64(e.frame_index);
        self.write_time(e.now);
        self.write_time(e.next_frame_time);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.write_u8(TAG_FRAME_END);
        self.write_u64(e.frame_index);
        self.write_time(e.now);
        self.write_bool(e.sent);
    }

    fn on_frame_blocked(&mut self, e: &FrameBlockedEvent) {
        self.write_u8(TAG_FRAME_BLOCKED);
        self.write_time(e.now);
    }

    fn on_frame_sent(&mut self, e: &FrameSentEvent) {
        self.write_u8(TAG_FRAME_SENT);
        self.write_u64(e.frame_index);
        self.write_time(e.now);
    }

    fn on_ack_received(&mut self, e: &AckReceivedEvent) {
        self.write_u8(TAG_ACK_RECEIVED);
        self.write_u64(e.frame_index);
        self.write_time(e.now);
    }

    fn on_contract_violation(&mut self, e: &ContractViolationEvent) {
        self.write_u8(TAG_CONTRACT_VIOLATION);
        self.write_time(e.now);
        self.write_violation(e.violation);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`FrameRequestedEvent`].
    FrameRequested(FrameRequestedEvent),
    /// A [`TimerArmedEvent`].
    TimerArmed(TimerArmedEvent),
    /// A [`FrameStartEvent`].
    FrameStart(FrameStartEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
    /// A [`FrameBlockedEvent`].
    FrameBlocked(FrameBlockedEvent),
    /// A [`FrameSentEvent`].
    FrameSent(FrameSentEvent),
    /// An [`AckReceivedEvent`].
    AckReceived(AckReceivedEvent),
    /// A [`ContractViolationEvent`].
    ContractViolation(ContractViolationEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_violation(&mut self) -> Option<ContractViolation> {
        match self.read_u8()? {
            0 => Some(ContractViolation::SendOutsideFrameUpdate),
            1 => Some(ContractViolation::SendWhileAckPending),
            2 => Some(ContractViolation::UnexpectedAck),
            _ => None,
        }
    }

    fn decode_frame_requested(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameRequested(FrameRequestedEvent {
            now: self.read_time()?,
            coalesced: self.read_bool()?,
        }))
    }

    fn decode_timer_armed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TimerArmed(TimerArmedEvent {
            now: self.read_time()?,
            deadline: self.read_time()?,
        }))
    }

    fn decode_frame_start(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameStart(FrameStartEvent {
            frame_index: self.read_u64()?,
            now: self.read_time()?,
            next_frame_time: self.read_time()?,
        }))
    }

    fn decode_frame_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameEnd(FrameEndEvent {
            frame_index: self.read_u64()?,
            now: self.read_time()?,
            sent: self.read_bool()?,
        }))
    }

    fn decode_frame_blocked(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBlocked(FrameBlockedEvent {
            now: self.read_time()?,
        }))
    }

    fn decode_frame_sent(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSent(FrameSentEvent {
            frame_index: self.read_u64()?,
            now: self.read_time()?,
        }))
    }

    fn decode_ack_received(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AckReceived(AckReceivedEvent {
            frame_index: self.read_u64()?,
            now: self.read_time()?,
        }))
    }

    fn decode_contract_violation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ContractViolation(ContractViolationEvent {
            now: self.read_time()?,
            violation: self.read_violation()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_REQUESTED => self.decode_frame_requested(),
            TAG_TIMER_ARMED => self.decode_timer_armed(),
            TAG_FRAME_START => self.decode_frame_start(),
            TAG_FRAME_END => self.decode_frame_end(),
            TAG_FRAME_BLOCKED => self.decode_frame_blocked(),
            TAG_FRAME_SENT => self.decode_frame_sent(),
            TAG_ACK_RECEIVED => self.decode_ack_received(),
            TAG_CONTRACT_VIOLATION => self.decode_contract_violation(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use framegate_core::clock::ManualClock;
    use framegate_core::producer::FrameUpdate;
    use framegate_core::scheduler::{FrameScheduler, SchedulerConfig};
    use framegate_core::time::Duration;

    fn record_session() -> Vec<u8> {
        let clock = ManualClock::new(HostTime(1_000));
        let producer = |update: &mut FrameUpdate<'_>| {
            update.did_send_frame_update_to_client().unwrap();
        };
        let mut s = FrameScheduler::with_trace_sink(
            producer,
            &clock,
            SchedulerConfig::with_frame_delay(Duration(30)),
            RecorderSink::new(),
        );
        s.schedule_frame_update();
        s.poll();
        clock.advance(Duration(5));
        s.did_receive_frame_update_ack().unwrap();
        let _ = s.did_receive_frame_update_ack();
        let (_, sink) = s.into_parts();
        sink.into_bytes()
    }

    #[test]
    fn scheduler_session_round_trips() {
        let bytes = record_session();
        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(
            events,
            [
                RecordedEvent::FrameRequested(FrameRequestedEvent {
                    now: HostTime(1_000),
                    coalesced: false,
                }),
                RecordedEvent::TimerArmed(TimerArmedEvent {
                    now: HostTime(1_000),
                    deadline: HostTime(1_000),
                }),
                RecordedEvent::FrameStart(FrameStartEvent {
                    frame_index: 0,
                    now: HostTime(1_000),
                    next_frame_time: HostTime(1_030),
                }),
                RecordedEvent::FrameSent(FrameSentEvent {
                    frame_index: 0,
                    now: HostTime(1_000),
                }),
                RecordedEvent::FrameEnd(FrameEndEvent {
                    frame_index: 0,
                    now: HostTime(1_000),
                    sent: true,
                }),
                RecordedEvent::AckReceived(AckReceivedEvent {
                    frame_index: 0,
                    now: HostTime(1_005),
                }),
                RecordedEvent::ContractViolation(ContractViolationEvent {
                    now: HostTime(1_005),
                    violation: ContractViolation::UnexpectedAck,
                }),
            ],
            "recorded session"
        );
    }

    #[test]
    fn blocked_fire_round_trips() {
        let mut rec = RecorderSink::new();
        rec.on_frame_blocked(&FrameBlockedEvent { now: HostTime(42) });
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [RecordedEvent::FrameBlocked(FrameBlockedEvent {
                now: HostTime(42)
            })],
            "single blocked event"
        );
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let bytes = record_session();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 6, "last record is incomplete");
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let mut bytes = vec![0xff];
        bytes.extend(record_session());
        assert_eq!(decode(&bytes).count(), 0, "nothing past an unknown tag");
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty(), "no events");
    }
}
