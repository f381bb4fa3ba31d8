// Copyright 2026 the Framegate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Call-order errors reported by the scheduler.

/// A send/ack notification arrived in an order the scheduler cannot accept.
///
/// These are programming errors in the owning session. The scheduler reports
/// them and leaves its state untouched instead of asserting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ContractViolation {
    /// A frame was reported as sent while no frame update was in progress.
    #[error("frame update reported as sent outside of a frame update")]
    SendOutsideFrameUpdate,
    /// A frame was reported as sent while the previous one is still
    /// awaiting acknowledgement.
    #[error("frame update sent while the previous frame is still unacknowledged")]
    SendWhileAckPending,
    /// An acknowledgement arrived with no frame awaiting one.
    #[error("frame update acknowledged but no frame was awaiting acknowledgement")]
    UnexpectedAck,
}

impl ContractViolation {
    /// Short stable name, used in trace records and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SendOutsideFrameUpdate => "send_outside_frame_update",
            Self::SendWhileAckPending => "send_while_ack_pending",
            Self::UnexpectedAck => "unexpected_ack",
        }
    }
}
