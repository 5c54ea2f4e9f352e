//! Bully-style leader election over the broadcast link.
//!
//! There is no coordinator at boot: any device may open a negotiation
//! by broadcasting a bid, then folds competing bids into a running
//! maximum of `(priority, identity)` until its window deadline passes.
//! Higher priority wins; ties break toward the *lower* identity, an
//! arbitrary but fixed total order that guarantees a deterministic
//! single winner for any set of observed bids.
//!
//! The window is a polled deadline, not a blocking wait: the engine
//! stays usable from the inbound-message callback while negotiating,
//! which is exactly when competing bids arrive.
//!
//! Known protocol properties, kept deliberately:
//! - A device that becomes Leader never re-evaluates leadership; only
//!   Followers start negotiations. Two devices that open independent
//!   negotiations without cross-observing each other before their
//!   windows close will both self-elect. Duplicate leaders resolve
//!   only when one side reboots or a follower times out and forces a
//!   fresh election.
//! - Any Clock heartbeat claiming leadership overrides the locally
//!   tracked leader with no check that the claimant won an election
//!   this device observed. A stale or rogue claim silently wins.

use tracing::{debug, info};

use crate::types::DeviceId;

/// Leader election state machine: Follower / Negotiating / Leader.
#[derive(Debug)]
pub struct ElectionEngine {
    local_id: DeviceId,
    local_priority: u8,
    window_micros: u64,
    leader_timeout_micros: u64,

    is_leader: bool,
    negotiation_active: bool,
    deadline_micros: u64,
    highest_priority_seen: u8,
    highest_priority_id: DeviceId,
    current_leader: Option<DeviceId>,
    last_leader_heartbeat_micros: u64,
}

impl ElectionEngine {
    /// Create an engine in the Follower state.
    #[must_use]
    pub fn new(
        local_id: DeviceId,
        local_priority: u8,
        window_micros: u64,
        leader_timeout_micros: u64,
    ) -> Self {
        Self {
            local_id,
            local_priority,
            window_micros,
            leader_timeout_micros,
            is_leader: false,
            negotiation_active: false,
            deadline_micros: 0,
            highest_priority_seen: 0,
            highest_priority_id: DeviceId::default(),
            current_leader: None,
            last_leader_heartbeat_micros: 0,
        }
    }

    /// Whether this device currently holds leadership.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }

    /// Whether a negotiation window is open.
    #[must_use]
    pub fn negotiating(&self) -> bool {
        self.negotiation_active
    }

    /// The leader this device currently tracks, if any.
    #[must_use]
    pub fn current_leader(&self) -> Option<DeviceId> {
        self.current_leader
    }

    /// This device's election priority.
    #[must_use]
    pub fn local_priority(&self) -> u8 {
        self.local_priority
    }

    /// Open a negotiation window.
    ///
    /// Seeds the running maximum with our own bid and records the
    /// deadline; the caller broadcasts the negotiate bid. Calling
    /// while a window is already open restarts it.
    pub fn start_negotiation(&mut self, now_micros: u64) {
        self.negotiation_active = true;
        self.deadline_micros = now_micros + self.window_micros;
        self.highest_priority_seen = self.local_priority;
        self.highest_priority_id = self.local_id;
        debug!(
            priority = self.local_priority,
            device = %self.local_id,
            "opened leader negotiation window"
        );
    }

    /// Fold a competing bid into the running maximum.
    ///
    /// Applies only while a window is open; bids outside a window are
    /// ignored (the sender's own window will settle them).
    pub fn observe(&mut self, sender: DeviceId, priority: u8) {
        if !self.negotiation_active {
            return;
        }
        if self.outranks_current(sender, priority) {
            debug!(bidder = %sender, priority, "higher-priority bid observed");
            self.highest_priority_seen = priority;
            self.highest_priority_id = sender;
        }
    }

    /// Poll the negotiation deadline.
    ///
    /// Once `now` reaches the deadline the window concludes: this
    /// device becomes Leader exactly when its own bid is still the
    /// maximum (absence of competing bids means self-election).
    /// Returns `Some(became_leader)` on the conclusion call, `None`
    /// otherwise.
    pub fn poll(&mut self, now_micros: u64) -> Option<bool> {
        if !self.negotiation_active || now_micros < self.deadline_micros {
            return None;
        }
        self.negotiation_active = false;
        self.is_leader = self.highest_priority_id == self.local_id;
        if self.is_leader {
            self.current_leader = Some(self.local_id);
            info!(device = %self.local_id, "won leader negotiation");
        } else {
            self.current_leader = Some(self.highest_priority_id);
            // Fresh grace period: the winner has not had a chance to
            // send a heartbeat yet.
            self.last_leader_heartbeat_micros = now_micros;
            info!(
                leader = %self.highest_priority_id,
                priority = self.highest_priority_seen,
                "lost leader negotiation"
            );
        }
        Some(self.is_leader)
    }

    /// Record a Clock heartbeat claiming leadership.
    ///
    /// Unconditional: the claimant is tracked as the current leader
    /// with no validation against past election results (see module
    /// docs).
    pub fn on_leader_heartbeat(&mut self, sender: DeviceId, now_micros: u64) {
        self.current_leader = Some(sender);
        self.last_leader_heartbeat_micros = now_micros;
    }

    /// Whether the tracked leader has gone silent for longer than the
    /// timeout. Leaders never time out themselves, and an open
    /// negotiation suppresses the check.
    #[must_use]
    pub fn leader_timed_out(&self, now_micros: u64) -> bool {
        !self.is_leader
            && !self.negotiation_active
            && now_micros.saturating_sub(self.last_leader_heartbeat_micros)
                > self.leader_timeout_micros
    }

    fn outranks_current(&self, sender: DeviceId, priority: u8) -> bool {
        priority > self.highest_priority_seen
            || (priority == self.highest_priority_seen && sender < self.highest_priority_id)
    }
}
