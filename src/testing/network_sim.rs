//! Broadcast-link condition simulation for testing.

use rand::Rng;

/// Lossy-link simulator for the in-memory bus.
///
/// The real radio loses and occasionally duplicates datagrams; the
/// protocol is designed to converge anyway, and these knobs let tests
/// prove it.
#[derive(Clone, Debug)]
pub struct NetworkSimulator {
    /// Datagram loss probability (0.0 to 1.0).
    pub loss_rate: f64,
    /// Probability a datagram is delivered twice.
    pub duplicate_rate: f64,
}

impl NetworkSimulator {
    /// Perfect link: every broadcast delivered exactly once.
    #[must_use]
    pub fn perfect() -> Self {
        Self {
            loss_rate: 0.0,
            duplicate_rate: 0.0,
        }
    }

    /// Typical congested radio conditions.
    #[must_use]
    pub fn congested() -> Self {
        Self {
            loss_rate: 0.10,
            duplicate_rate: 0.01,
        }
    }

    /// Stress conditions: half of all datagrams lost.
    #[must_use]
    pub fn stress() -> Self {
        Self {
            loss_rate: 0.50,
            duplicate_rate: 0.05,
        }
    }

    /// Should this datagram be dropped?
    #[must_use]
    pub fn should_drop(&self) -> bool {
        self.loss_rate > 0.0 && rand::thread_rng().gen_bool(self.loss_rate.clamp(0.0, 1.0))
    }

    /// Should this datagram be delivered twice?
    #[must_use]
    pub fn should_duplicate(&self) -> bool {
        self.duplicate_rate > 0.0
            && rand::thread_rng().gen_bool(self.duplicate_rate.clamp(0.0, 1.0))
    }
}
