//! Runtime-agnostic transport and time seams.

use std::time::Instant;

use crate::error::SendError;

/// Default maximum datagram size, matching the ESP-NOW radio limit.
pub const DEFAULT_MAX_DATAGRAM: usize = 250;

/// The broadcast radio link as the sync core sees it.
///
/// Connectionless, unordered, unacknowledged: a broadcast either
/// reaches a peer once, more than once, or not at all, and the caller
/// never finds out which. Implementations must be callable from
/// callback contexts, so `broadcast` must not block.
pub trait Transport: Send + Sync {
    /// Fire-and-forget broadcast of one datagram to every peer in the
    /// domain.
    ///
    /// # Errors
    /// [`SendError::PayloadTooLarge`] when the payload exceeds
    /// [`Transport::max_payload`]; transport-specific errors
    /// otherwise. Callers log and drop — there is no retry.
    fn broadcast(&self, payload: &[u8]) -> Result<(), SendError>;

    /// Largest datagram this transport can carry.
    fn max_payload(&self) -> usize {
        DEFAULT_MAX_DATAGRAM
    }
}

/// Monotonic microsecond clock.
///
/// The sync core takes time as arguments; this trait is for the glue
/// that bridges callbacks to the core.
pub trait MonotonicClock: Send + Sync {
    /// Microseconds since an arbitrary fixed origin.
    fn now_micros(&self) -> u64;
}

/// [`MonotonicClock`] backed by [`std::time::Instant`], anchored at
/// construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Create a clock with its origin at now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl MonotonicClock for SystemClock {
    fn now_micros(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}
