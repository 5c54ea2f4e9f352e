//! Testing utilities: an in-memory broadcast domain, a manually
//! advanced clock, and link-condition simulation.

mod network_sim;

#[cfg(test)]
mod tests;

pub use network_sim::NetworkSimulator;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::SendError;
use crate::net::{DEFAULT_MAX_DATAGRAM, MonotonicClock, Transport};

/// In-memory broadcast domain.
///
/// Every endpoint's broadcast lands in one shared queue; the test
/// harness drains the queue and delivers each datagram to every
/// device *including the sender*, reproducing the radio's broadcast
/// echo so self-filtering gets exercised.
#[derive(Clone)]
pub struct LoopbackBus {
    queue: Arc<Mutex<VecDeque<Vec<u8>>>>,
    sim: NetworkSimulator,
    max_payload: usize,
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackBus {
    /// Create a lossless bus.
    #[must_use]
    pub fn new() -> Self {
        Self::with_simulator(NetworkSimulator::perfect())
    }

    /// Create a bus with simulated link conditions.
    #[must_use]
    pub fn with_simulator(sim: NetworkSimulator) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            sim,
            max_payload: DEFAULT_MAX_DATAGRAM,
        }
    }

    /// A transport handle onto this bus.
    #[must_use]
    pub fn endpoint(&self) -> LoopbackEndpoint {
        LoopbackEndpoint { bus: self.clone() }
    }

    /// Take all queued datagrams, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Vec<u8>> {
        let mut queue = self.queue.lock().unwrap();
        queue.drain(..).collect()
    }

    /// Number of queued datagrams.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

/// [`Transport`] handle bound to a [`LoopbackBus`].
#[derive(Clone)]
pub struct LoopbackEndpoint {
    bus: LoopbackBus,
}

impl Transport for LoopbackEndpoint {
    fn broadcast(&self, payload: &[u8]) -> Result<(), SendError> {
        if payload.len() > self.bus.max_payload {
            return Err(SendError::PayloadTooLarge {
                size: payload.len(),
                max: self.bus.max_payload,
            });
        }
        // Loss is silent, exactly like the radio: the sender gets Ok.
        if self.bus.sim.should_drop() {
            return Ok(());
        }
        let mut queue = self.bus.queue.lock().unwrap();
        queue.push_back(payload.to_vec());
        if self.bus.sim.should_duplicate() {
            queue.push_back(payload.to_vec());
        }
        Ok(())
    }

    fn max_payload(&self) -> usize {
        self.bus.max_payload
    }
}

/// Manually advanced microsecond clock for deterministic tests.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    /// Create a clock starting at `start_micros`.
    #[must_use]
    pub fn new(start_micros: u64) -> Self {
        Self(Arc::new(AtomicU64::new(start_micros)))
    }

    /// Advance the clock.
    pub fn advance(&self, micros: u64) {
        self.0.fetch_add(micros, Ordering::SeqCst);
    }

    /// Read the clock without going through the trait.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

impl MonotonicClock for ManualClock {
    fn now_micros(&self) -> u64 {
        self.get()
    }
}
