// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use framegate_core::time::{HostTime, Timebase};
use framegate_core::trace::{
    AckReceivedEvent, ContractViolationEvent, FrameBlockedEvent, FrameEndEvent,
    FrameRequestedEvent, FrameSentEvent, FrameStartEvent, TimerArmedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn us(&self, t: HostTime) -> f64 {
        t.to_nanos(self.timebase) as f64 / 1000.0
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_requested(&mut self, e: &FrameRequestedEvent) {
        let kind = if e.coalesced { "coalesced" } else { "new" };
        let _ = writeln!(self.writer, "[request] {kind} at {:.1}µs", self.us(e.now));
    }

    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        let _ = writeln!(
            self.writer,
            "[timer] armed at {:.1}µs for {:.1}µs",
            self.us(e.now),
            self.us(e.deadline),
        );
    }

    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:start] frame={} at {:.1}µs next>={:.1}µs",
            e.frame_index,
            self.us(e.now),
            self.us(e.next_frame_time),
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let sent = if e.sent { "sent" } else { "not sent" };
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} at {:.1}µs {sent}",
            e.frame_index,
            self.us(e.now),
        );
    }

    fn on_frame_blocked(&mut self, e: &FrameBlockedEvent) {
        let _ = writeln!(
            self.writer,
            "[blocked] ack pending at {:.1}µs",
            self.us(e.now)
        );
    }

    fn on_frame_sent(&mut self, e: &FrameSentEvent) {
        let _ = writeln!(
            self.writer,
            "[sent] frame={} at {:.1}µs",
            e.frame_index,
            self.us(e.now),
        );
    }

    fn on_ack_received(&mut self, e: &AckReceivedEvent) {
        let _ = writeln!(
            self.writer,
            "[ack] frame={} at {:.1}µs",
            e.frame_index,
            self.us(e.now),
        );
    }

    fn on_contract_violation(&mut self, e: &ContractViolationEvent) {
        let _ = writeln!(
            self.writer,
            "[VIOLATION] {} at {:.1}µs",
            e.violation.as_str(),
            self.us(e.now),
        );
    }
}
