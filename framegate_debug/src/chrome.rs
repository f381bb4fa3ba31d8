// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each frame becomes a `B`/`E` span. A frame that was sent to the client
//! stays open until its acknowledgement arrives, so the span length is the
//! round trip that held back the next frame. All other events are instants.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use framegate_core::time::{HostTime, Timebase};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameRequested(e) => {
                events.push(instant(
                    "FrameRequested",
                    "Scheduler",
                    e.now,
                    timebase,
                    json!({ "coalesced": e.coalesced }),
                ));
            }
            RecordedEvent::TimerArmed(e) => {
                events.push(instant(
                    "TimerArmed",
                    "Scheduler",
                    e.now,
                    timebase,
                    json!({ "deadline_us": to_us(e.deadline, timebase) }),
                ));
            }
            RecordedEvent::FrameStart(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": to_us(e.now, timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "next_frame_us": to_us(e.next_frame_time, timebase),
                    }
                }));
            }
            RecordedEvent::FrameEnd(e) => {
                if !e.sent {
                    events.push(end(e.frame_index, e.now, timebase));
                }
            }
            RecordedEvent::FrameBlocked(e) => {
                events.push(instant("FrameBlocked", "Scheduler", e.now, timebase, json!({})));
            }
            RecordedEvent::FrameSent(e) => {
                events.push(instant(
                    "FrameSent",
                    "Frame",
                    e.now,
                    timebase,
                    json!({ "frame_index": e.frame_index }),
                ));
            }
            RecordedEvent::AckReceived(e) => {
                events.push(end(e.frame_index, e.now, timebase));
            }
            RecordedEvent::ContractViolation(e) => {
                events.push(instant(
                    "ContractViolation",
                    "Error",
                    e.now,
                    timebase,
                    json!({ "violation": e.violation.as_str() }),
                ));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, at: HostTime, timebase: Timebase, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": to_us(at, timebase),
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn end(frame_index: u64, at: HostTime, timebase: Timebase) -> Value {
    json!({
        "ph": "E",
        "name": "Frame",
        "cat": "Frame",
        "ts": to_us(at, timebase),
        "pid": 0,
        "tid": 0,
        "args": {
            "frame_index": frame_index,
        }
    })
}

fn to_us(t: HostTime, timebase: Timebase) -> f64 {
    t.to_nanos(timebase) as f64 / 1000.0
}
