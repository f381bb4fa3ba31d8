// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scheduler state after a producer panics mid-frame.

use std::panic::{self, AssertUnwindSafe};

use framegate_core::clock::ManualClock;
use framegate_core::producer::{FrameProducer, FrameUpdate};
use framegate_core::scheduler::{FrameScheduler, SchedulerConfig, SchedulerState};
use framegate_core::time::{Duration, HostTime};

const DELAY: Duration = Duration(30);

/// Optionally sends, then panics on the first frame only.
struct Faulty {
    send: bool,
    panicked: bool,
}

impl FrameProducer for Faulty {
    fn start_frame_update(&mut self, update: &mut FrameUpdate<'_>) {
        if self.send {
            update
                .did_send_frame_update_to_client()
                .expect("first send of a frame is accepted");
        }
        if !self.panicked {
            self.panicked = true;
            panic!("producer failed mid-frame");
        }
    }
}

fn scheduler(clock: &ManualClock, send: bool) -> FrameScheduler<Faulty, &ManualClock> {
    let producer = Faulty {
        send,
        panicked: false,
    };
    FrameScheduler::new(producer, clock, SchedulerConfig::with_frame_delay(DELAY))
}

#[test]
fn panic_after_send_leaves_frame_awaiting_ack() {
    let clock = ManualClock::new(HostTime(0));
    let mut s = scheduler(&clock, true);

    s.schedule_frame_update();
    let result = panic::catch_unwind(AssertUnwindSafe(|| s.poll()));

    assert!(result.is_err(), "producer panic propagates out of poll");
    assert!(!s.in_frame_update(), "in_frame_update cleared on unwind");
    assert!(s.frame_ack_pending(), "send before the panic still counts");
    assert_eq!(s.state(), SchedulerState::AckPending, "waiting for the ack");
    assert_eq!(s.stats().frames_sent, 1, "one frame sent");

    s.did_receive_frame_update_ack()
        .expect("ack for the frame sent before the panic");
    s.schedule_frame_update();
    clock.advance(DELAY);
    assert!(s.poll(), "scheduler still serves frames after the panic");
    assert_eq!(s.stats().frames_started, 2, "second frame started");
}

#[test]
fn panic_before_send_leaves_scheduler_idle() {
    let clock = ManualClock::new(HostTime(0));
    let mut s = scheduler(&clock, false);

    s.schedule_frame_update();
    let result = panic::catch_unwind(AssertUnwindSafe(|| s.poll()));

    assert!(result.is_err(), "producer panic propagates out of poll");
    assert!(!s.in_frame_update(), "in_frame_update cleared on unwind");
    assert!(!s.frame_ack_pending(), "nothing was sent");
    assert_eq!(s.state(), SchedulerState::Idle, "no request outstanding");

    s.schedule_frame_update();
    assert_eq!(s.state(), SchedulerState::PendingDelay, "request armed");
    clock.advance(DELAY);
    assert!(s.poll(), "scheduler still serves frames after the panic");
    assert!(!s.in_frame_update(), "cleared after a normal return");
}
