// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated producer/consumer session that exercises the diagnostics
//! pipeline.
//!
//! Content changes every 10 ms, frames are spaced at least 30 ms apart, and
//! the simulated client acknowledges each frame after a varying round trip.
//! Events go to both a [`PrettyPrintSink`] and a [`RecorderSink`]; the
//! recording is then exported as Chrome trace JSON.
//!
//! Set `FRAMEGATE_LOG` (or `RUST_LOG`) to e.g. `framegate_core=trace` to also
//! see the scheduler's own log output.

use std::fs::File;
use std::io::BufWriter;

use framegate_core::clock::{Clock, ManualClock};
use framegate_core::producer::{FrameProducer, FrameUpdate};
use framegate_core::scheduler::{FrameScheduler, SchedulerConfig};
use framegate_core::time::{Duration, HostTime, Timebase};
use framegate_core::trace::{
    AckReceivedEvent, ContractViolationEvent, FrameBlockedEvent, FrameEndEvent,
    FrameRequestedEvent, FrameSentEvent, FrameStartEvent, TimerArmedEvent, TraceSink,
};
use framegate_debug::pretty::PrettyPrintSink;
use framegate_debug::recorder::RecorderSink;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulated session length.
const SESSION_MS: u64 = 500;
/// Content changes this often.
const CHANGE_INTERVAL_MS: u64 = 10;

fn main() {
    init_logging();

    let timebase = Timebase::NANOS;
    let ms = |n: u64| Duration::from_millis(n, timebase);

    let clock = ManualClock::new(HostTime(1_000_000_000)); // start at 1s
    let sinks = Tee {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout()), timebase),
        recorder: RecorderSink::new(),
    };
    let mut scheduler = FrameScheduler::with_trace_sink(
        Encoder::default(),
        &clock,
        SchedulerConfig::new(),
        sinks,
    );

    // -- simulated session ---------------------------------------------------
    let mut ack_due: Option<HostTime> = None;
    for elapsed in 0..SESSION_MS {
        if elapsed % CHANGE_INTERVAL_MS == 0 {
            scheduler.schedule_frame_update();
        }
        if ack_due.is_some_and(|due| clock.now() >= due) {
            ack_due = None;
            if let Err(violation) = scheduler.did_receive_frame_update_ack() {
                tracing::error!(%violation, "simulated client acked out of order");
            }
        }

        scheduler.poll();

        if let Some(sent_at) = scheduler.producer_mut().in_flight.take() {
            // Round trip alternates between a fast and a slow client.
            let rtt = if scheduler.stats().frames_sent % 3 == 0 {
                ms(55)
            } else {
                ms(12)
            };
            ack_due = Some(sent_at + rtt);
        }

        clock.advance(ms(1));
    }

    let stats = scheduler.stats();
    info!(
        requests = stats.requests,
        coalesced = stats.coalesced_requests,
        frames = stats.frames_started,
        acks = stats.acks_received,
        "session finished"
    );

    // -- export Chrome trace -------------------------------------------------
    let (encoder, sinks) = scheduler.into_parts();
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    framegate_debug::chrome::export(sinks.recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} frames)", encoder.frames);
}

fn init_logging() {
    let filter = std::env::var("FRAMEGATE_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Stand-in for a frame encoder: every frame is "transmitted" immediately.
#[derive(Debug, Default)]
struct Encoder {
    frames: u64,
    in_flight: Option<HostTime>,
}

impl FrameProducer for Encoder {
    fn start_frame_update(&mut self, update: &mut FrameUpdate<'_>) {
        self.frames += 1;
        if update.did_send_frame_update_to_client().is_ok() {
            self.in_flight = Some(update.now());
        }
    }
}

/// Forwards every event to both diagnostics sinks.
#[derive(Debug)]
struct Tee {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Tee {
    fn on_frame_requested(&mut self, e: &FrameRequestedEvent) {
        self.pretty.on_frame_requested(e);
        self.recorder.on_frame_requested(e);
    }

    fn on_timer_armed(&mut self, e: &TimerArmedEvent) {
        self.pretty.on_timer_armed(e);
        self.recorder.on_timer_armed(e);
    }

    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        self.pretty.on_frame_start(e);
        self.recorder.on_frame_start(e);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.pretty.on_frame_end(e);
        self.recorder.on_frame_end(e);
    }

    fn on_frame_blocked(&mut self, e: &FrameBlockedEvent) {
        self.pretty.on_frame_blocked(e);
        self.recorder.on_frame_blocked(e);
    }

    fn on_frame_sent(&mut self, e: &FrameSentEvent) {
        self.pretty.on_frame_sent(e);
        self.recorder.on_frame_sent(e);
    }

    fn on_ack_received(&mut self, e: &AckReceivedEvent) {
        self.pretty.on_ack_received(e);
        self.recorder.on_ack_received(e);
    }

    fn on_contract_violation(&mut self, e: &ContractViolationEvent) {
        self.pretty.on_contract_violation(e);
        self.recorder.on_contract_violation(e);
    }
}
