// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Standard-library backend for framegate.
//!
//! - [`MonotonicClock`]: host time from `CLOCK_MONOTONIC`, in nanoseconds.
//! - [`EventLoop`]: owns a [`FrameScheduler`](framegate_core::scheduler::FrameScheduler)
//!   on a dedicated thread and drives its timer with real time.
//! - [`LoopHandle`]: cloneable, `Send` entry point for requests and
//!   acknowledgements from other threads.
//!
//! ```no_run
//! use framegate_backend_std::{EventLoop, LoopConfig};
//! use framegate_core::producer::FrameUpdate;
//!
//! let event_loop = EventLoop::spawn(
//!     |update: &mut FrameUpdate<'_>| {
//!         // Encode and transmit the frame here.
//!         let _ = update.did_send_frame_update_to_client();
//!     },
//!     LoopConfig::default(),
//! )?;
//! let handle = event_loop.handle();
//! handle.schedule_frame_update()?;
//! // ...later, when the consumer confirms receipt:
//! handle.did_receive_frame_update_ack()?;
//! let exit = event_loop.join()?;
//! println!("{} frames", exit.stats.frames_started);
//! # Ok::<(), framegate_backend_std::LoopError>(())
//! ```

mod error;
mod event_loop;
mod time;

pub use error::LoopError;
pub use event_loop::{Command, EventLoop, LoopConfig, LoopExit, LoopHandle};
pub use time::{MonotonicClock, now, timebase, to_std};
