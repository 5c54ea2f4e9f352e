use std::io;

use thiserror::Error;

/// Errors from decoding a received datagram.
///
/// Every wire message has a fixed size determined by its type tag, so
/// decoding never produces a partial message: a datagram either parses
/// completely or is rejected with one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Datagram length does not match the fixed size for its type tag.
    #[error("datagram size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Expected wire size for the declared message type.
        expected: usize,
        /// Actual datagram length.
        actual: usize,
    },

    /// Unrecognized message type tag.
    #[error("unknown message type tag: 0x{0:02X}")]
    UnknownType(u8),
}

/// Errors from broadcasting a datagram.
///
/// The transport is fire-and-forget; a failed send is logged and the
/// message is simply dropped. Clock and beat messages are re-sent on
/// the next cycle, so there is no retry queue.
#[derive(Debug, Error)]
pub enum SendError {
    /// Payload exceeds the transport's maximum datagram size.
    #[error("payload of {size} bytes exceeds transport maximum of {max}")]
    PayloadTooLarge {
        /// Attempted payload size.
        size: usize,
        /// Transport maximum.
        max: usize,
    },

    /// The transport has shut down and can no longer send.
    #[error("transport closed")]
    Closed,

    /// Underlying I/O failure.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Umbrella error for synchronization operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A received datagram failed to decode.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A broadcast failed.
    #[error("send error: {0}")]
    Send(#[from] SendError),
}
