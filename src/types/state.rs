//! Rhythmic state shared with the rest of the metronome firmware.
//!
//! The sync coordinator reads and writes the fields it synchronizes
//! (tempo, per-channel pattern, bar length, enabled, running) but does
//! not own the structure's lifecycle; the surrounding application does.

/// Minimum supported tempo in BPM.
pub const MIN_BPM: f32 = 20.0;

/// Maximum supported tempo in BPM.
pub const MAX_BPM: f32 = 500.0;

/// Maximum beats in a channel's bar.
pub const MAX_BEATS: u8 = 16;

/// Tempo multipliers selectable per device, in quarter notes.
pub const TEMPO_MULTIPLIERS: [f32; 5] = [0.25, 0.5, 1.0, 2.0, 4.0];

/// One rhythm channel: a bar of up to [`MAX_BEATS`] beats with a
/// per-beat bitmask pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetronomeChannel {
    pattern: u16,
    bar_length: u8,
    current_beat: u8,
    enabled: bool,
}

impl Default for MetronomeChannel {
    fn default() -> Self {
        Self {
            pattern: 0,
            bar_length: 4,
            current_beat: 0,
            enabled: true,
        }
    }
}

impl MetronomeChannel {
    /// The per-beat bitmask (bit N set = beat N is struck).
    #[must_use]
    pub fn pattern(&self) -> u16 {
        self.pattern
    }

    /// Replace the beat pattern.
    pub fn set_pattern(&mut self, pattern: u16) {
        self.pattern = pattern;
    }

    /// Number of beats in this channel's bar.
    #[must_use]
    pub fn bar_length(&self) -> u8 {
        self.bar_length
    }

    /// Set the bar length, clamped to `1..=MAX_BEATS`.
    pub fn set_bar_length(&mut self, beats: u8) {
        self.bar_length = beats.clamp(1, MAX_BEATS);
        if self.current_beat >= self.bar_length {
            self.current_beat = 0;
        }
    }

    /// The beat index currently playing.
    #[must_use]
    pub fn current_beat(&self) -> u8 {
        self.current_beat
    }

    /// Set the currently playing beat index.
    pub fn set_current_beat(&mut self, beat: u8) {
        self.current_beat = beat % self.bar_length.max(1);
    }

    /// Whether this channel produces output.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable this channel.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// The metronome's shared rhythmic state.
#[derive(Debug, Clone)]
pub struct MetronomeState {
    tempo_bpm: f32,
    running: bool,
    multiplier_idx: u8,
    channels: Vec<MetronomeChannel>,
}

impl MetronomeState {
    /// Create state with the given number of channels (capped at 32,
    /// the width of the wire channel mask).
    #[must_use]
    pub fn new(channel_count: usize) -> Self {
        Self {
            tempo_bpm: 120.0,
            running: false,
            multiplier_idx: 2, // 1x
            channels: vec![MetronomeChannel::default(); channel_count.min(32)],
        }
    }

    /// Current tempo in BPM.
    #[must_use]
    pub fn tempo(&self) -> f32 {
        self.tempo_bpm
    }

    /// Set the tempo, clamped to `[MIN_BPM, MAX_BPM]`.
    pub fn set_tempo(&mut self, bpm: f32) {
        self.tempo_bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    /// Whether playback is running.
    #[must_use]
    pub fn running(&self) -> bool {
        self.running
    }

    /// Start or stop playback.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Index into [`TEMPO_MULTIPLIERS`] currently active.
    #[must_use]
    pub fn multiplier_idx(&self) -> u8 {
        self.multiplier_idx
    }

    /// Select a tempo multiplier by index (out-of-range is ignored).
    pub fn set_multiplier_idx(&mut self, idx: u8) {
        if (idx as usize) < TEMPO_MULTIPLIERS.len() {
            self.multiplier_idx = idx;
        }
    }

    /// Number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Borrow a channel.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn channel(&self, index: usize) -> &MetronomeChannel {
        &self.channels[index]
    }

    /// Mutably borrow a channel.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn channel_mut(&mut self, index: usize) -> &mut MetronomeChannel {
        &mut self.channels[index]
    }

    /// Bitmask of enabled channels (bit N = channel N).
    #[must_use]
    pub fn enabled_mask(&self) -> u32 {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, ch)| ch.enabled())
            .fold(0u32, |mask, (i, _)| mask | (1 << i))
    }

    /// Total pattern length in beats: the least common multiple of all
    /// enabled channels' bar lengths, or 1 when none are enabled.
    /// Saturates at `u16::MAX`, the width of the wire field.
    #[must_use]
    pub fn total_pattern_length(&self) -> u16 {
        let total = self
            .channels
            .iter()
            .filter(|ch| ch.enabled())
            .map(|ch| u32::from(ch.bar_length()))
            .fold(1u32, lcm);
        u16::try_from(total).unwrap_or(u16::MAX)
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn lcm(a: u32, b: u32) -> u32 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a / gcd(a, b)).saturating_mul(b)
}
