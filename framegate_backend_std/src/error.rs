// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event loop errors.

use std::io;

/// Failure to start, reach, or join an [`EventLoop`](crate::EventLoop).
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// The loop thread has exited; the command was not delivered.
    #[error("frame scheduler loop has shut down")]
    Disconnected,
    /// The loop thread could not be spawned.
    #[error("failed to spawn frame scheduler thread: {0}")]
    Spawn(#[source] io::Error),
    /// The loop thread panicked, most likely inside the producer.
    #[error("frame scheduler thread panicked")]
    Panicked,
}
