use std::time::Duration;

/// Configuration for the sync subsystem.
///
/// Passed in at construction by the surrounding application; nothing
/// here is persisted or re-read at runtime. All peers in a broadcast
/// domain must agree on `negotiation_window` — negotiation completion
/// is never acknowledged on the wire, so correctness of the election
/// relies on every device closing its window after the same duration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Election priority for this device (higher wins, ties broken by
    /// lower device identity).
    pub priority: u8,

    /// How long a negotiation stays open for competing bids
    /// (default: 500 ms).
    pub negotiation_window: Duration,

    /// How long a follower waits without a leader Clock heartbeat
    /// before starting a fresh negotiation (default: 5 seconds).
    pub leader_timeout: Duration,

    /// Minimum tempo difference before a follower applies a received
    /// Beat tempo, in BPM (default: 0.5). Hysteresis against
    /// oscillation from rounding noise.
    pub tempo_deadband_bpm: f32,

    /// Minimum absolute drift before the correction factor is nudged,
    /// in microseconds (default: 100).
    pub drift_threshold_micros: u64,

    /// Step applied to the drift correction factor per nudge
    /// (default: 0.0001).
    pub drift_step: f32,

    /// Lower clamp for the drift correction factor (default: 0.9).
    pub drift_min: f32,

    /// Upper clamp for the drift correction factor (default: 1.1).
    pub drift_max: f32,

    /// Maximum datagram size accepted by the radio transport
    /// (default: 250 bytes, the ESP-NOW limit).
    pub max_datagram: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            priority: 100,
            negotiation_window: Duration::from_millis(500),
            leader_timeout: Duration::from_secs(5),
            tempo_deadband_bpm: 0.5,
            drift_threshold_micros: 100,
            drift_step: 0.0001,
            drift_min: 0.9,
            drift_max: 1.1,
            max_datagram: 250,
        }
    }
}

impl SyncConfig {
    /// Create a config with the given election priority and defaults
    /// for everything else.
    #[must_use]
    pub fn with_priority(priority: u8) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }

    /// Set the negotiation window.
    #[must_use]
    pub fn negotiation_window(mut self, window: Duration) -> Self {
        self.negotiation_window = window;
        self
    }

    /// Set the leader heartbeat timeout.
    #[must_use]
    pub fn leader_timeout(mut self, timeout: Duration) -> Self {
        self.leader_timeout = timeout;
        self
    }

    /// Set the follower tempo deadband in BPM.
    #[must_use]
    pub fn tempo_deadband(mut self, bpm: f32) -> Self {
        self.tempo_deadband_bpm = bpm;
        self
    }
}
