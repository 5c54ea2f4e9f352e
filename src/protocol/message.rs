//! Sync message wire format.
//!
//! Every message is a fixed-size datagram: an 18-byte common header
//! followed by a fixed-size body determined by the type tag. All
//! multi-byte fields are big-endian (network order). Reserved bytes
//! are zero-filled on encode and ignored on decode, so future fields
//! can be added without breaking older peers.
//!
//! There is no streaming or partial decode: one received datagram is
//! exactly one message, and a datagram whose length does not match
//! the fixed size for its type tag is rejected outright.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::DecodeError;
use crate::types::DeviceId;

/// Wire message type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Clock pulse from the leader (24 PPQN, throttled by tempo).
    Clock = 1,
    /// Quarter-note announcement: tempo, beat position, multiplier.
    Beat = 2,
    /// Bar boundary: enabled-channel mask and total pattern length.
    Bar = 3,
    /// Per-channel pattern snapshot.
    Pattern = 4,
    /// Control: transport start/stop and election bids.
    Control = 5,
}

impl MessageType {
    /// Parse a type tag byte.
    ///
    /// # Errors
    /// [`DecodeError::UnknownType`] for an unrecognized tag.
    pub fn from_byte(value: u8) -> Result<Self, DecodeError> {
        match value {
            1 => Ok(Self::Clock),
            2 => Ok(Self::Beat),
            3 => Ok(Self::Bar),
            4 => Ok(Self::Pattern),
            5 => Ok(Self::Control),
            other => Err(DecodeError::UnknownType(other)),
        }
    }

    /// Fixed total wire size (header + body) for this message type.
    #[must_use]
    pub const fn wire_size(self) -> usize {
        HEADER_SIZE
            + match self {
                Self::Clock | Self::Pattern | Self::Control => 8,
                Self::Beat | Self::Bar => 12,
            }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clock => write!(f, "Clock"),
            Self::Beat => write!(f, "Beat"),
            Self::Bar => write!(f, "Bar"),
            Self::Pattern => write!(f, "Pattern"),
            Self::Control => write!(f, "Control"),
        }
    }
}

/// Common header size: type tag (1) + sequence (2) + priority (1) +
/// sender identity (6) + timestamp (8).
pub const HEADER_SIZE: usize = 18;

/// Control message commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlCommand {
    /// Start playback on all devices.
    Start = 1,
    /// Stop playback on all devices.
    Stop = 2,
    /// Reset. With `param1 == 1` this is an election negotiate bid
    /// carrying the bidder's priority in `value`.
    Reset = 3,
}

impl ControlCommand {
    /// Parse a command byte. Unknown commands are not a decode error
    /// (the byte is carried as-is); they are simply ignored on
    /// dispatch.
    #[must_use]
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Start),
            2 => Some(Self::Stop),
            3 => Some(Self::Reset),
            _ => None,
        }
    }
}

/// `param1` value marking a Control Reset as an election bid.
pub const NEGOTIATE_PARAM: u8 = 1;

/// Message body, one variant per [`MessageType`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncPayload {
    /// Leader clock pulse.
    Clock {
        /// Whether the sender currently claims leadership.
        is_leader: bool,
        /// 24-PPQN pulse counter at the sender.
        clock_tick: u32,
    },
    /// Quarter-note announcement.
    Beat {
        /// Sender's tempo in BPM.
        bpm: f32,
        /// Quarter-note index modulo the total pattern length.
        beat_position: u32,
        /// Active tempo-multiplier index.
        multiplier_idx: u8,
    },
    /// Bar boundary announcement.
    Bar {
        /// Global bar counter at the sender.
        global_bar: u32,
        /// Number of channels on the sender.
        channel_count: u8,
        /// LCM of enabled channels' bar lengths.
        pattern_length: u16,
        /// Active pattern slot (unused, always 0).
        active_pattern: u8,
        /// Bitmask of enabled channels.
        channel_mask: u32,
    },
    /// Per-channel pattern snapshot.
    Pattern {
        /// Channel index.
        channel_id: u8,
        /// Beats in this channel's bar.
        bar_length: u8,
        /// Per-beat bitmask.
        pattern: u16,
        /// Currently playing beat index.
        current_beat: u8,
        /// Whether the channel is enabled.
        enabled: bool,
    },
    /// Control message.
    Control {
        /// Command byte (see [`ControlCommand`]).
        command: u8,
        /// Command parameter 1.
        param1: u8,
        /// Command parameter 2.
        param2: u8,
        /// Command parameter 3.
        param3: u8,
        /// Command value.
        value: u32,
    },
}

impl SyncPayload {
    /// The type tag for this payload variant.
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Clock { .. } => MessageType::Clock,
            Self::Beat { .. } => MessageType::Beat,
            Self::Bar { .. } => MessageType::Bar,
            Self::Pattern { .. } => MessageType::Pattern,
            Self::Control { .. } => MessageType::Control,
        }
    }

    /// Build an election negotiate bid carrying `priority`.
    #[must_use]
    pub fn negotiate(priority: u8) -> Self {
        Self::Control {
            command: ControlCommand::Reset as u8,
            param1: NEGOTIATE_PARAM,
            param2: 0,
            param3: 0,
            value: u32::from(priority),
        }
    }

    /// Whether this is a Control negotiate bid.
    #[must_use]
    pub fn is_negotiate(&self) -> bool {
        matches!(
            self,
            Self::Control { command, param1, .. }
                if ControlCommand::from_byte(*command) == Some(ControlCommand::Reset)
                    && *param1 == NEGOTIATE_PARAM
        )
    }
}

/// One wire message: common header fields plus a typed payload.
///
/// Instances are transient, constructed per send or receive event and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncMessage {
    /// Per-sender monotonic counter; wraps. Diagnostic only, never
    /// used for ordering.
    pub seq: u16,
    /// Sender's election priority.
    pub priority: u8,
    /// Sender identity.
    pub sender: DeviceId,
    /// Sender's local monotonic clock at send time, in microseconds.
    pub timestamp_micros: u64,
    /// Typed payload.
    pub payload: SyncPayload,
}

impl SyncMessage {
    /// Encode to the fixed wire size for this message's type.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let msg_type = self.payload.message_type();
        let mut buf = BytesMut::with_capacity(msg_type.wire_size());

        buf.put_u8(msg_type as u8);
        buf.put_u16(self.seq);
        buf.put_u8(self.priority);
        buf.put_slice(self.sender.as_bytes());
        buf.put_u64(self.timestamp_micros);

        match self.payload {
            SyncPayload::Clock {
                is_leader,
                clock_tick,
            } => {
                buf.put_u8(u8::from(is_leader));
                buf.put_u32(clock_tick);
                buf.put_bytes(0, 3);
            }
            SyncPayload::Beat {
                bpm,
                beat_position,
                multiplier_idx,
            } => {
                buf.put_f32(bpm);
                buf.put_u32(beat_position);
                buf.put_u8(multiplier_idx);
                buf.put_bytes(0, 3);
            }
            SyncPayload::Bar {
                global_bar,
                channel_count,
                pattern_length,
                active_pattern,
                channel_mask,
            } => {
                buf.put_u32(global_bar);
                buf.put_u8(channel_count);
                buf.put_u16(pattern_length);
                buf.put_u8(active_pattern);
                buf.put_u32(channel_mask);
            }
            SyncPayload::Pattern {
                channel_id,
                bar_length,
                pattern,
                current_beat,
                enabled,
            } => {
                buf.put_u8(channel_id);
                buf.put_u8(bar_length);
                buf.put_u16(pattern);
                buf.put_u8(current_beat);
                buf.put_u8(u8::from(enabled));
                buf.put_bytes(0, 2);
            }
            SyncPayload::Control {
                command,
                param1,
                param2,
                param3,
                value,
            } => {
                buf.put_u8(command);
                buf.put_u8(param1);
                buf.put_u8(param2);
                buf.put_u8(param3);
                buf.put_u32(value);
            }
        }

        debug_assert_eq!(buf.len(), msg_type.wire_size());
        buf.freeze()
    }

    /// Decode a complete datagram.
    ///
    /// # Errors
    /// [`DecodeError::UnknownType`] for an unrecognized type tag,
    /// [`DecodeError::SizeMismatch`] when the datagram length does not
    /// equal the fixed size for the tag. Never partially parses.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let Some(&tag) = data.first() else {
            return Err(DecodeError::SizeMismatch {
                expected: HEADER_SIZE,
                actual: 0,
            });
        };
        let msg_type = MessageType::from_byte(tag)?;
        if data.len() != msg_type.wire_size() {
            return Err(DecodeError::SizeMismatch {
                expected: msg_type.wire_size(),
                actual: data.len(),
            });
        }

        let mut cursor = &data[1..];
        let seq = cursor.get_u16();
        let priority = cursor.get_u8();
        let mut sender_bytes = [0u8; DeviceId::SIZE];
        cursor.copy_to_slice(&mut sender_bytes);
        let sender = DeviceId::new(sender_bytes);
        let timestamp_micros = cursor.get_u64();

        let payload = match msg_type {
            MessageType::Clock => {
                let is_leader = cursor.get_u8() != 0;
                let clock_tick = cursor.get_u32();
                SyncPayload::Clock {
                    is_leader,
                    clock_tick,
                }
            }
            MessageType::Beat => {
                let bpm = cursor.get_f32();
                let beat_position = cursor.get_u32();
                let multiplier_idx = cursor.get_u8();
                SyncPayload::Beat {
                    bpm,
                    beat_position,
                    multiplier_idx,
                }
            }
            MessageType::Bar => {
                let global_bar = cursor.get_u32();
                let channel_count = cursor.get_u8();
                let pattern_length = cursor.get_u16();
                let active_pattern = cursor.get_u8();
                let channel_mask = cursor.get_u32();
                SyncPayload::Bar {
                    global_bar,
                    channel_count,
                    pattern_length,
                    active_pattern,
                    channel_mask,
                }
            }
            MessageType::Pattern => {
                let channel_id = cursor.get_u8();
                let bar_length = cursor.get_u8();
                let pattern = cursor.get_u16();
                let current_beat = cursor.get_u8();
                let enabled = cursor.get_u8() != 0;
                SyncPayload::Pattern {
                    channel_id,
                    bar_length,
                    pattern,
                    current_beat,
                    enabled,
                }
            }
            MessageType::Control => {
                let command = cursor.get_u8();
                let param1 = cursor.get_u8();
                let param2 = cursor.get_u8();
                let param3 = cursor.get_u8();
                let value = cursor.get_u32();
                SyncPayload::Control {
                    command,
                    param1,
                    param2,
                    param3,
                    value,
                }
            }
        };

        Ok(Self {
            seq,
            priority,
            sender,
            timestamp_micros,
            payload,
        })
    }
}
