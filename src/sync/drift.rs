//! Clock-drift correction and one-way latency estimation.
//!
//! A follower predicts when the leader's next clock pulse should land
//! and nudges a multiplicative tempo correction factor whenever the
//! observed arrival strays by more than a threshold. The controller is
//! integral-only: a fixed small step per observation, clamped to a
//! narrow band, which tolerates noisy single-sample drift estimates
//! because the step is tiny relative to the clamp range.

/// Clock-pulse resolution used for drift timing and transmit
/// throttling: pulses per quarter note.
pub const SYNC_PPQN: u32 = 24;

/// Number of latency samples in the rolling window.
const LATENCY_WINDOW: usize = 8;

/// Rolling estimate of one-way message delay.
///
/// The ring starts zero-filled and the average is always the mean of
/// all 8 slots, so the estimate is biased toward zero until 8 real
/// samples have cycled through. That bias is a deliberate
/// simplification, not something callers should compensate for.
#[derive(Debug, Clone)]
pub struct LatencyEstimator {
    samples: [u64; LATENCY_WINDOW],
    index: usize,
    average_micros: u64,
}

impl Default for LatencyEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyEstimator {
    /// Create an estimator with a zeroed window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: [0; LATENCY_WINDOW],
            index: 0,
            average_micros: 0,
        }
    }

    /// Record a one-way delay sample from a sender timestamp,
    /// overwriting the oldest slot.
    pub fn record(&mut self, send_timestamp_micros: u64, now_micros: u64) {
        let latency = now_micros.saturating_sub(send_timestamp_micros);
        self.samples[self.index] = latency;
        self.index = (self.index + 1) % LATENCY_WINDOW;
        self.average_micros = self.samples.iter().sum::<u64>() / LATENCY_WINDOW as u64;
    }

    /// Current rolling average in microseconds.
    #[must_use]
    pub fn average_micros(&self) -> u64 {
        self.average_micros
    }
}

/// Predicts the leader's next clock pulse and maintains the tempo
/// correction factor.
#[derive(Debug, Clone)]
pub struct DriftCorrector {
    threshold_micros: u64,
    step: f32,
    min_factor: f32,
    max_factor: f32,

    last_received_tick: Option<u32>,
    predicted_next_tick: u32,
    factor: f32,
}

impl DriftCorrector {
    /// Create a corrector with the given tuning.
    #[must_use]
    pub fn new(threshold_micros: u64, step: f32, min_factor: f32, max_factor: f32) -> Self {
        Self {
            threshold_micros,
            step,
            min_factor,
            max_factor,
            last_received_tick: None,
            predicted_next_tick: 0,
            factor: 1.0,
        }
    }

    /// Current multiplicative correction factor.
    #[must_use]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// The tick we expect the leader to send next.
    #[must_use]
    pub fn predicted_next_tick(&self) -> u32 {
        self.predicted_next_tick
    }

    /// The tempo to program into the pulse generator: local tempo with
    /// the correction applied. Recomputed per call, never stored back
    /// into the rhythmic state.
    #[must_use]
    pub fn corrected_tempo(&self, local_bpm: f32) -> f32 {
        local_bpm * self.factor
    }

    /// Fold one received leader clock pulse into the drift estimate.
    ///
    /// The first call after a reset only records the tick as a
    /// baseline (cold start) and emits no correction. Subsequent calls
    /// compare the actual arrival time against the expected arrival
    /// (`sender timestamp + inter-tick interval at the current tempo`)
    /// and nudge the factor one step toward cancelling the drift when
    /// it exceeds the threshold.
    pub fn observe_tick(
        &mut self,
        tick: u32,
        sender_timestamp_micros: u64,
        now_micros: u64,
        local_bpm: f32,
    ) {
        if self.last_received_tick.is_none() {
            self.last_received_tick = Some(tick);
            return;
        }

        let interval_micros = tick_interval_micros(local_bpm);
        self.predicted_next_tick = tick.wrapping_add(1);

        let expected_arrival = sender_timestamp_micros.saturating_add(interval_micros);
        let drift = i128::from(now_micros) - i128::from(expected_arrival);

        if drift.unsigned_abs() > u128::from(self.threshold_micros) {
            let nudge = if drift > 0 { self.step } else { -self.step };
            self.factor = (self.factor + nudge).clamp(self.min_factor, self.max_factor);
        }

        self.last_received_tick = Some(tick);
    }

    /// Drop the baseline and restore the neutral factor, e.g. after a
    /// gap in the leader's tick stream or a leadership change.
    pub fn reset(&mut self) {
        self.last_received_tick = None;
        self.predicted_next_tick = 0;
        self.factor = 1.0;
    }
}

/// Expected microseconds between clock pulses at `bpm`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn tick_interval_micros(bpm: f32) -> u64 {
    if bpm <= 0.0 {
        return 0;
    }
    (60_000_000.0 / f64::from(bpm) / f64::from(SYNC_PPQN)) as u64
}
