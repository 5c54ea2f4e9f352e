//! # metrosync
//!
//! Wireless multi-device synchronization for networked metronomes.
//!
//! Several independent hardware units share one tempo, beat phase and
//! rhythmic pattern state over an unreliable, connectionless broadcast
//! radio link, with no central coordinator present at boot:
//!
//! - Leaderless bootstrap and failover via a bully-style election
//!   (priority, ties broken by device identity) over a polled
//!   negotiation window.
//! - Sub-millisecond phase lock: followers estimate clock drift from
//!   the leader's tick stream and nudge a multiplicative tempo
//!   correction applied to the local pulse generator.
//! - A fixed-layout binary wire protocol carrying clock, beat, bar,
//!   pattern and control messages, tolerant of loss and duplication by
//!   design — state is periodically re-broadcast instead of
//!   acknowledged.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use metrosync::testing::LoopbackBus;
//! use metrosync::{DeviceId, MetronomeState, SyncConfig, SyncCoordinator};
//!
//! let bus = LoopbackBus::new();
//! let mut coordinator = SyncCoordinator::new(
//!     DeviceId::new([0xAA, 0, 0, 0, 0, 1]),
//!     SyncConfig::with_priority(200),
//!     Arc::new(bus.endpoint()),
//! );
//! let state = MetronomeState::new(2);
//!
//! // No peers answer the bid, so the device self-elects.
//! coordinator.start_negotiation(0);
//! coordinator.update(500_000, &state);
//! assert!(coordinator.is_leader());
//! ```
//!
//! # Architecture
//!
//! - [`protocol`] — wire codec: fixed-size big-endian datagrams.
//! - [`sync`] — election, drift/latency estimation, coordinator.
//! - [`net`] — transport seam and the tokio UDP broadcast link.
//! - [`types`] — device identity, configuration, rhythmic state.
//! - [`testing`] — loopback bus and link-condition simulation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error types
pub mod error;
/// Transport abstraction
pub mod net;
/// Wire protocol
pub mod protocol;
/// Synchronization core
pub mod sync;
/// Testing utilities
pub mod testing;
/// Core types
pub mod types;

// Re-exports
pub use error::{DecodeError, SendError, SyncError};
pub use net::{MonotonicClock, SystemClock, Transport};
pub use protocol::{ControlCommand, MessageType, SyncMessage, SyncPayload};
pub use sync::{
    CLOCK_PPQN, DriftCorrector, ElectionEngine, LatencyEstimator, SYNC_PPQN, SharedCoordinator,
    SyncCoordinator,
};
pub use types::{DeviceId, MetronomeChannel, MetronomeState, SyncConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        DeviceId, MetronomeChannel, MetronomeState, SyncConfig, SyncCoordinator, SyncError,
        SyncMessage, SyncPayload, Transport,
    };
}
