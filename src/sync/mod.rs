//! The wireless multi-device synchronization core.
//!
//! Three cooperating pieces, all synchronous and deterministic so they
//! can run inside radio and timer callbacks:
//!
//! - [`ElectionEngine`] — leaderless bootstrap, bully-style election
//!   with a polled negotiation deadline, leader-heartbeat liveness.
//! - [`DriftCorrector`] / [`LatencyEstimator`] — phase-locking a
//!   follower's pulse generator to the leader's tick stream.
//! - [`SyncCoordinator`] — the façade owning outbound message
//!   construction, transmit throttling, and inbound state application.

pub mod coordinator;
pub mod drift;
pub mod election;


pub use coordinator::{CLOCK_PPQN, SharedCoordinator, SyncCoordinator};
pub use drift::{DriftCorrector, LatencyEstimator, SYNC_PPQN, tick_interval_micros};
pub use election::ElectionEngine;
