//! The sync coordinator: outbound message scheduling and inbound state
//! application.
//!
//! One coordinator instance is bound to one transport at construction;
//! the radio's receive callback feeds [`SyncCoordinator::on_datagram`],
//! the hardware pulse generator feeds the pulse hooks, and the main
//! loop pumps [`SyncCoordinator::update`]. Leadership is re-checked on
//! every call rather than held as coordinator state, so no callback
//! re-wiring happens on a role change.
//!
//! All entry points take the current monotonic time in microseconds,
//! keeping the coordinator deterministic and free of clock reads; the
//! caller owns the time source.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, trace, warn};

use crate::net::Transport;
use crate::protocol::{ControlCommand, NEGOTIATE_PARAM, SyncMessage, SyncPayload};
use crate::sync::drift::{DriftCorrector, LatencyEstimator};
use crate::sync::election::ElectionEngine;
use crate::types::{DeviceId, MetronomeState, SyncConfig};

/// Pulse resolution of the quarter-note tick stream fed to
/// [`SyncCoordinator::on_quarter_note`].
pub const CLOCK_PPQN: u32 = 96;

/// Shared handle for use from radio and timer callback contexts.
///
/// Critical sections must stay short and non-suspending: lock, apply
/// one message or pulse, unlock.
pub type SharedCoordinator = Arc<Mutex<SyncCoordinator>>;

/// Multi-device synchronization façade.
pub struct SyncCoordinator {
    id: DeviceId,
    config: SyncConfig,
    transport: Arc<dyn Transport>,
    election: ElectionEngine,
    drift: DriftCorrector,
    latency: LatencyEstimator,
    seq: u16,
    last_quarter: Option<u32>,
    dirty_channels: u32,
    startup_patterns_pending: bool,
}

impl SyncCoordinator {
    /// Create a coordinator bound to a transport.
    #[must_use]
    pub fn new(id: DeviceId, config: SyncConfig, transport: Arc<dyn Transport>) -> Self {
        let election = ElectionEngine::new(
            id,
            config.priority,
            duration_micros(config.negotiation_window),
            duration_micros(config.leader_timeout),
        );
        let drift = DriftCorrector::new(
            config.drift_threshold_micros,
            config.drift_step,
            config.drift_min,
            config.drift_max,
        );
        Self {
            id,
            config,
            transport,
            election,
            drift,
            latency: LatencyEstimator::new(),
            seq: 0,
            last_quarter: None,
            dirty_channels: 0,
            startup_patterns_pending: false,
        }
    }

    /// Wrap a new coordinator in a [`SharedCoordinator`] handle.
    #[must_use]
    pub fn new_shared(
        id: DeviceId,
        config: SyncConfig,
        transport: Arc<dyn Transport>,
    ) -> SharedCoordinator {
        Arc::new(Mutex::new(Self::new(id, config, transport)))
    }

    /// This device's identity.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.id
    }

    /// Whether this device currently leads the broadcast domain.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.election.is_leader()
    }

    /// The leader this device tracks, if any.
    #[must_use]
    pub fn current_leader(&self) -> Option<DeviceId> {
        self.election.current_leader()
    }

    /// Rolling one-way latency estimate in microseconds.
    #[must_use]
    pub fn average_latency_micros(&self) -> u64 {
        self.latency.average_micros()
    }

    /// Current drift correction factor.
    #[must_use]
    pub fn drift_factor(&self) -> f32 {
        self.drift.factor()
    }

    /// The tempo to program into the pulse generator: local tempo with
    /// drift correction applied. Read-only with respect to `state`.
    #[must_use]
    pub fn corrected_tempo(&self, state: &MetronomeState) -> f32 {
        self.drift.corrected_tempo(state.tempo())
    }

    // ---- Outbound: pulse-generator hooks ----

    /// Hook for every 24-PPQN sub-beat pulse.
    ///
    /// When leading, transmits a Clock message with tempo-dependent
    /// throttling to bound channel load: every pulse at ≤120 BPM,
    /// every 2nd up to 240, every 4th above that.
    pub fn on_sync_pulse(&mut self, tick: u32, now_micros: u64, state: &MetronomeState) {
        if !self.election.is_leader() {
            return;
        }
        let bpm = state.tempo();
        let due = bpm <= 120.0 || (bpm <= 240.0 && tick % 2 == 0) || tick % 4 == 0;
        if due {
            self.send(
                SyncPayload::Clock {
                    is_leader: true,
                    clock_tick: tick,
                },
                now_micros,
            );
        }
    }

    /// Hook for the 96-PPQN tick stream; announces quarter notes.
    ///
    /// Deduplicates on the quarter index so re-entrant calls at the
    /// same tick produce a single Beat message.
    pub fn on_quarter_note(&mut self, tick: u32, now_micros: u64, state: &MetronomeState) {
        if !self.election.is_leader() || tick % CLOCK_PPQN != 0 {
            return;
        }
        let quarter = tick / CLOCK_PPQN;
        if self.last_quarter == Some(quarter) {
            return;
        }
        self.last_quarter = Some(quarter);

        let total_beats = u32::from(state.total_pattern_length().max(1));
        self.send(
            SyncPayload::Beat {
                bpm: state.tempo(),
                beat_position: quarter % total_beats,
                multiplier_idx: state.multiplier_idx(),
            },
            now_micros,
        );
    }

    /// Hook for bar boundaries.
    ///
    /// When leading, announces the enabled-channel mask and the total
    /// pattern length (LCM of enabled channels' bar lengths).
    pub fn on_bar_boundary(&mut self, bar: u32, now_micros: u64, state: &MetronomeState) {
        if !self.election.is_leader() {
            return;
        }
        self.send(
            SyncPayload::Bar {
                global_bar: bar,
                channel_count: state.channel_count() as u8,
                pattern_length: state.total_pattern_length(),
                active_pattern: 0,
                channel_mask: state.enabled_mask(),
            },
            now_micros,
        );
    }

    // ---- Outbound: edits and control ----

    /// Mark a channel's pattern as changed; the next [`Self::update`]
    /// broadcasts it so followers converge without waiting for a bar
    /// boundary.
    pub fn notify_pattern_changed(&mut self, channel_id: u8) {
        if u32::from(channel_id) < 32 {
            self.dirty_channels |= 1 << channel_id;
        }
    }

    /// Broadcast a control message (transport start/stop/reset).
    pub fn send_control(&mut self, command: ControlCommand, value: u32, now_micros: u64) {
        self.send(
            SyncPayload::Control {
                command: command as u8,
                param1: 0,
                param2: 0,
                param3: 0,
                value,
            },
            now_micros,
        );
    }

    /// Open a leader negotiation and broadcast our bid.
    pub fn start_negotiation(&mut self, now_micros: u64) {
        self.election.start_negotiation(now_micros);
        let bid = SyncPayload::negotiate(self.config.priority);
        self.send(bid, now_micros);
    }

    // ---- Periodic pump ----

    /// Periodic maintenance, called from the main loop.
    ///
    /// Concludes an elapsed negotiation window, starts a negotiation
    /// when the tracked leader has gone silent, broadcasts the full
    /// pattern set once on leader start, and flushes dirty channels.
    pub fn update(&mut self, now_micros: u64, state: &MetronomeState) {
        if let Some(became_leader) = self.election.poll(now_micros) {
            if became_leader {
                // Followers need our patterns before the first bar.
                self.startup_patterns_pending = true;
            } else {
                // Track the winner's clock from a fresh baseline.
                self.drift.reset();
            }
        }

        if self.election.leader_timed_out(now_micros) {
            info!(device = %self.id, "leader heartbeat timed out, negotiating");
            self.start_negotiation(now_micros);
        }

        if self.startup_patterns_pending && self.election.is_leader() {
            self.startup_patterns_pending = false;
            for ch in 0..state.channel_count() {
                self.send_pattern(ch as u8, now_micros, state);
            }
        }

        let dirty = std::mem::take(&mut self.dirty_channels);
        if dirty != 0 {
            for ch in 0..state.channel_count().min(32) {
                if dirty & (1 << ch) != 0 {
                    self.send_pattern(ch as u8, now_micros, state);
                }
            }
        }
    }

    // ---- Inbound ----

    /// Handle one received datagram from the radio callback.
    ///
    /// Malformed datagrams are logged and dropped; our own broadcast
    /// echo is filtered before any state is touched.
    pub fn on_datagram(&mut self, data: &[u8], now_micros: u64, state: &mut MetronomeState) {
        let msg = match SyncMessage::decode(data) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(len = data.len(), error = %e, "dropping undecodable datagram");
                return;
            }
        };

        if msg.sender == self.id {
            trace!("ignoring own broadcast echo");
            return;
        }

        self.latency.record(msg.timestamp_micros, now_micros);

        match msg.payload {
            SyncPayload::Clock {
                is_leader,
                clock_tick,
            } => {
                if is_leader {
                    self.election.on_leader_heartbeat(msg.sender, now_micros);
                    self.drift.observe_tick(
                        clock_tick,
                        msg.timestamp_micros,
                        now_micros,
                        state.tempo(),
                    );
                }
            }
            SyncPayload::Beat { bpm, .. } => {
                if !self.election.is_leader()
                    && (bpm - state.tempo()).abs() > self.config.tempo_deadband_bpm
                {
                    debug!(from = %msg.sender, bpm, "applying leader tempo");
                    state.set_tempo(bpm);
                }
            }
            SyncPayload::Bar { .. } => {
                // Bar announcements are informational; followers derive
                // pattern length from Pattern messages.
            }
            SyncPayload::Pattern {
                channel_id,
                bar_length,
                pattern,
                enabled,
                ..
            } => {
                if !self.election.is_leader() && (channel_id as usize) < state.channel_count() {
                    let ch = state.channel_mut(channel_id as usize);
                    ch.set_pattern(pattern);
                    ch.set_bar_length(bar_length);
                    ch.set_enabled(enabled);
                }
            }
            SyncPayload::Control {
                command,
                param1,
                value,
                ..
            } => self.on_control(&msg, command, param1, value, state),
        }
    }

    fn on_control(
        &mut self,
        msg: &SyncMessage,
        command: u8,
        param1: u8,
        value: u32,
        state: &mut MetronomeState,
    ) {
        match ControlCommand::from_byte(command) {
            Some(ControlCommand::Reset) if param1 == NEGOTIATE_PARAM => {
                debug!(bidder = %msg.sender, priority = msg.priority, "negotiate bid received");
                self.election.observe(msg.sender, msg.priority);
            }
            Some(ControlCommand::Start) if !self.election.is_leader() => {
                state.set_running(true);
            }
            Some(ControlCommand::Stop) if !self.election.is_leader() => {
                state.set_running(false);
            }
            _ => {
                trace!(command, param1, value, "ignoring control message");
            }
        }
    }

    fn send(&mut self, payload: SyncPayload, now_micros: u64) {
        let msg = SyncMessage {
            seq: self.seq,
            priority: self.config.priority,
            sender: self.id,
            timestamp_micros: now_micros,
            payload,
        };
        self.seq = self.seq.wrapping_add(1);

        let wire = msg.encode();
        if let Err(e) = self.transport.broadcast(&wire) {
            // Fire-and-forget: clock and beat state is re-sent on the
            // next cycle, so a failed send is skipped, not retried.
            warn!(message_type = %msg.payload.message_type(), error = %e, "broadcast failed");
        }
    }

    fn send_pattern(&mut self, channel_id: u8, now_micros: u64, state: &MetronomeState) {
        let ch = state.channel(channel_id as usize);
        self.send(
            SyncPayload::Pattern {
                channel_id,
                bar_length: ch.bar_length(),
                pattern: ch.pattern(),
                current_beat: ch.current_beat(),
                enabled: ch.enabled(),
            },
            now_micros,
        );
    }
}

fn duration_micros(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}
