// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame production scheduling for remote frame consumers.
//!
//! `framegate_core` decides when a frame producer may generate and transmit
//! a new frame to a consumer on the other side of a connection. It is
//! `no_std` compatible (with `alloc`) and sans-IO: time comes from a
//! [`Clock`](clock::Clock) and the single timer is polled by the owner.
//!
//! # Architecture
//!
//! ```text
//!   schedule_frame_update() ──► FrameScheduler ──► OneShotTimer
//!                                    ▲                  │ poll()
//!                                    │                  ▼
//!   did_receive_frame_update_ack()   │        FrameProducer::start_frame_update()
//!                                    │                  │
//!                                    │                  ▼
//!              consumer ◄──────── frame ◄── FrameUpdate::did_send_frame_update_to_client()
//! ```
//!
//! **[`scheduler`]** — [`FrameScheduler`](scheduler::FrameScheduler): request
//! coalescing, minimum spacing between frame starts, and backpressure until
//! the consumer acknowledges each sent frame.
//!
//! **[`producer`]** — The [`FrameProducer`](producer::FrameProducer) trait and
//! the [`FrameUpdate`](producer::FrameUpdate) handle it reports through.
//!
//! **[`timer`]** — Single-shot timer slot polled by the scheduler's owner.
//!
//! **[`clock`]** — The [`Clock`](clock::Clock) trait and a
//! [`ManualClock`](clock::ManualClock) for deterministic tests.
//!
//! **[`time`]** — Host time, durations and timebase conversion.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! scheduler instrumentation.
//!
//! **[`error`]** — Call-order violations reported instead of asserted.
//!
//! Every transition is also logged through `tracing`; install a subscriber
//! in the application to see it.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod clock;
pub mod error;
pub mod producer;
pub mod scheduler;
pub mod time;
pub mod timer;
pub mod trace;
