//! Binary wire protocol for the broadcast radio link.
//!
//! Datagrams are fixed-size per message type, unordered, unacknowledged
//! and may be lost or duplicated; the protocol layers above tolerate
//! all of that by re-sending state periodically instead of building
//! reliability into the transport.

pub mod message;

#[cfg(test)]
mod tests;

pub use message::{
    ControlCommand, HEADER_SIZE, MessageType, NEGOTIATE_PARAM, SyncMessage, SyncPayload,
};
