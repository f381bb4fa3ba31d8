// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thread-confined event loop that drives a [`FrameScheduler`].
//!
//! The scheduler and its producer live on a dedicated thread. Other threads
//! talk to it through a [`LoopHandle`], which queues [`Command`]s on a
//! channel. Between commands the loop sleeps until the scheduler's timer
//! deadline, then polls it.
//!
//! ```text
//!   session thread(s)                 loop thread
//!   -----------------                 -----------
//!   LoopHandle::schedule_frame_update ──► FrameScheduler::schedule_frame_update
//!   LoopHandle::did_receive_frame_update_ack ──► FrameScheduler::did_receive_frame_update_ack
//!                                     recv_timeout(next_deadline - now)
//!                                     FrameScheduler::poll ──► producer
//! ```
//!
//! Shutting down, by [`Command::Shutdown`], [`EventLoop::join`], or dropping
//! the [`EventLoop`], drops the scheduler on the loop thread. No frame starts
//! after that.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};

use framegate_core::clock::Clock;
use framegate_core::producer::FrameProducer;
use framegate_core::scheduler::{FrameScheduler, SchedulerConfig, SchedulerStats};
use framegate_core::time::Duration;
use framegate_core::trace::{NoopSink, TraceSink};
use tracing::{debug, warn};

use crate::error::LoopError;
use crate::time::{MonotonicClock, to_std};

/// A request delivered to the loop thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// [`FrameScheduler::schedule_frame_update`].
    ScheduleFrameUpdate,
    /// [`FrameScheduler::did_receive_frame_update_ack`].
    FrameUpdateAck,
    /// [`FrameScheduler::set_frame_delay`].
    SetFrameDelay(Duration),
    /// Stop the loop and drop the scheduler.
    Shutdown,
}

/// Configuration for an [`EventLoop`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopConfig {
    /// Scheduler configuration.
    pub scheduler: SchedulerConfig,
    /// Longest blocking wait while no timer is armed. `None` blocks until
    /// the next command.
    pub idle_timeout: Option<std::time::Duration>,
}

impl LoopConfig {
    /// Loop configuration around `scheduler`, without an idle timeout.
    #[must_use]
    pub const fn new(scheduler: SchedulerConfig) -> Self {
        Self {
            scheduler,
            idle_timeout: None,
        }
    }

    /// Sets the idle timeout.
    #[must_use]
    pub const fn with_idle_timeout(mut self, idle_timeout: std::time::Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }
}

/// Cloneable sender side of an [`EventLoop`].
///
/// Every method fails with [`LoopError::Disconnected`] once the loop has
/// shut down.
#[derive(Clone, Debug)]
pub struct LoopHandle {
    tx: Sender<Command>,
}

impl LoopHandle {
    /// Queues `command` for the loop thread.
    pub fn send(&self, command: Command) -> Result<(), LoopError> {
        self.tx.send(command).map_err(|_| LoopError::Disconnected)
    }

    /// Requests a frame update.
    pub fn schedule_frame_update(&self) -> Result<(), LoopError> {
        self.send(Command::ScheduleFrameUpdate)
    }

    /// Forwards the consumer's acknowledgement of the last sent frame.
    pub fn did_receive_frame_update_ack(&self) -> Result<(), LoopError> {
        self.send(Command::FrameUpdateAck)
    }

    /// Overrides the minimum frame spacing.
    pub fn set_frame_delay(&self, frame_delay: Duration) -> Result<(), LoopError> {
        self.send(Command::SetFrameDelay(frame_delay))
    }

    /// Asks the loop to stop.
    pub fn shutdown(&self) -> Result<(), LoopError> {
        self.send(Command::Shutdown)
    }
}

/// What the loop thread hands back when it stops.
#[derive(Debug)]
pub struct LoopExit<P, S> {
    /// The producer, no longer driven.
    pub producer: P,
    /// The trace sink.
    pub trace_sink: S,
    /// Final scheduler counters.
    pub stats: SchedulerStats,
}

/// A [`FrameScheduler`] running on its own thread against the
/// [`MonotonicClock`].
pub struct EventLoop<P, S = NoopSink> {
    handle: LoopHandle,
    thread: Option<JoinHandle<LoopExit<P, S>>>,
}

impl<P, S> core::fmt::Debug for EventLoop<P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventLoop")
            .field("handle", &self.handle)
            .field("running", &self.thread.is_some())
            .finish()
    }
}

impl<P: FrameProducer + Send + 'static> EventLoop<P> {
    /// Spawns the loop thread with `producer`.
    pub fn spawn(producer: P, config: LoopConfig) -> Result<Self, LoopError> {
        Self::spawn_with_trace_sink(producer, config, NoopSink)
    }
}

impl<P, S> EventLoop<P, S>
where
    P: FrameProducer + Send + 'static,
    S: TraceSink + Send + 'static,
{
    /// Spawns the loop thread with `producer`, reporting scheduler
    /// transitions to `sink`.
    pub fn spawn_with_trace_sink(producer: P, config: LoopConfig, sink: S) -> Result<Self, LoopError> {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("framegate-scheduler".to_owned())
            .spawn(move || {
                let scheduler = FrameScheduler::with_trace_sink(
                    producer,
                    MonotonicClock,
                    config.scheduler,
                    sink,
                );
                run(scheduler, &rx, config.idle_timeout)
            })
            .map_err(LoopError::Spawn)?;
        Ok(Self {
            handle: LoopHandle { tx },
            thread: Some(thread),
        })
    }

    /// Returns a new handle to the loop.
    #[must_use]
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Stops the loop and waits for the thread to exit.
    ///
    /// Commands queued before this call are processed first.
    pub fn join(mut self) -> Result<LoopExit<P, S>, LoopError> {
        // Disconnected here means the thread is already gone; join reports why.
        let _ = self.handle.shutdown();
        let thread = self.thread.take().ok_or(LoopError::Disconnected)?;
        thread.join().map_err(|_| LoopError::Panicked)
    }
}

impl<P, S> Drop for EventLoop<P, S> {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.tx.send(Command::Shutdown);
            if thread.join().is_err() {
                warn!("frame scheduler thread panicked");
            }
        }
    }
}

fn run<P: FrameProducer, S: TraceSink>(
    mut scheduler: FrameScheduler<P, MonotonicClock, S>,
    commands: &Receiver<Command>,
    idle_timeout: Option<std::time::Duration>,
) -> LoopExit<P, S> {
    debug!("frame scheduler loop started");
    loop {
        scheduler.poll();
        let received = match scheduler.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(scheduler.clock().now());
                commands.recv_timeout(to_std(wait))
            }
            None => match idle_timeout {
                Some(timeout) => commands.recv_timeout(timeout),
                None => commands
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            },
        };
        match received {
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(command) => apply(&mut scheduler, command),
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    let stats = scheduler.stats();
    let (producer, trace_sink) = scheduler.into_parts();
    debug!(
        frames_started = stats.frames_started,
        acks_received = stats.acks_received,
        "frame scheduler loop stopped"
    );
    LoopExit {
        producer,
        trace_sink,
        stats,
    }
}

fn apply<P: FrameProducer, C: Clock, S: TraceSink>(
    scheduler: &mut FrameScheduler<P, C, S>,
    command: Command,
) {
    match command {
        Command::ScheduleFrameUpdate => scheduler.schedule_frame_update(),
        Command::FrameUpdateAck => {
            // Rejections are already logged and counted by the scheduler.
            let _ = scheduler.did_receive_frame_update_ack();
        }
        Command::SetFrameDelay(frame_delay) => scheduler.set_frame_delay(frame_delay),
        Command::Shutdown => {}
    }
}
