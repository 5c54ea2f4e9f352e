use proptest::prelude::*;

use crate::error::DecodeError;
use crate::protocol::message::*;
use crate::types::DeviceId;

fn sender() -> DeviceId {
    DeviceId::new([0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01])
}

fn msg(payload: SyncPayload) -> SyncMessage {
    SyncMessage {
        seq: 42,
        priority: 100,
        sender: sender(),
        timestamp_micros: 1_234_567_890,
        payload,
    }
}

// ===== MessageType =====

#[test]
fn test_message_type_from_byte() {
    assert_eq!(MessageType::from_byte(1).unwrap(), MessageType::Clock);
    assert_eq!(MessageType::from_byte(2).unwrap(), MessageType::Beat);
    assert_eq!(MessageType::from_byte(3).unwrap(), MessageType::Bar);
    assert_eq!(MessageType::from_byte(4).unwrap(), MessageType::Pattern);
    assert_eq!(MessageType::from_byte(5).unwrap(), MessageType::Control);
}

#[test]
fn test_message_type_unknown_tag() {
    assert_eq!(
        MessageType::from_byte(0),
        Err(DecodeError::UnknownType(0))
    );
    assert_eq!(
        MessageType::from_byte(0xFF),
        Err(DecodeError::UnknownType(0xFF))
    );
}

#[test]
fn test_wire_sizes() {
    assert_eq!(MessageType::Clock.wire_size(), 26);
    assert_eq!(MessageType::Beat.wire_size(), 30);
    assert_eq!(MessageType::Bar.wire_size(), 30);
    assert_eq!(MessageType::Pattern.wire_size(), 26);
    assert_eq!(MessageType::Control.wire_size(), 26);
}

// ===== Round trips =====

#[test]
fn test_clock_round_trip() {
    let m = msg(SyncPayload::Clock {
        is_leader: true,
        clock_tick: 9_999,
    });
    let wire = m.encode();
    assert_eq!(wire.len(), MessageType::Clock.wire_size());
    assert_eq!(SyncMessage::decode(&wire).unwrap(), m);
}

#[test]
fn test_beat_round_trip() {
    let m = msg(SyncPayload::Beat {
        bpm: 137.5,
        beat_position: 11,
        multiplier_idx: 3,
    });
    assert_eq!(SyncMessage::decode(&m.encode()).unwrap(), m);
}

#[test]
fn test_bar_round_trip_boundary_values() {
    let m = SyncMessage {
        seq: u16::MAX,
        priority: 255,
        sender: DeviceId::new([0xFF; 6]),
        timestamp_micros: u64::MAX,
        payload: SyncPayload::Bar {
            global_bar: u32::MAX,
            channel_count: 255,
            pattern_length: u16::MAX,
            active_pattern: 255,
            channel_mask: 0xFFFF_FFFF,
        },
    };
    assert_eq!(SyncMessage::decode(&m.encode()).unwrap(), m);
}

#[test]
fn test_pattern_round_trip() {
    let m = msg(SyncPayload::Pattern {
        channel_id: 2,
        bar_length: 16,
        pattern: 0b1010_0101_1010_0101,
        current_beat: 7,
        enabled: false,
    });
    assert_eq!(SyncMessage::decode(&m.encode()).unwrap(), m);
}

#[test]
fn test_control_round_trip() {
    let m = msg(SyncPayload::Control {
        command: ControlCommand::Stop as u8,
        param1: 1,
        param2: 2,
        param3: 3,
        value: 0xCAFE_BABE,
    });
    assert_eq!(SyncMessage::decode(&m.encode()).unwrap(), m);
}

// ===== Size enforcement =====

#[test]
fn test_truncated_datagram_rejected() {
    let wire = msg(SyncPayload::Clock {
        is_leader: false,
        clock_tick: 1,
    })
    .encode();
    let err = SyncMessage::decode(&wire[..wire.len() - 1]).unwrap_err();
    assert_eq!(
        err,
        DecodeError::SizeMismatch {
            expected: 26,
            actual: 25
        }
    );
}

#[test]
fn test_oversized_datagram_rejected() {
    let mut wire = msg(SyncPayload::Pattern {
        channel_id: 0,
        bar_length: 4,
        pattern: 0,
        current_beat: 0,
        enabled: true,
    })
    .encode()
    .to_vec();
    wire.push(0);
    let err = SyncMessage::decode(&wire).unwrap_err();
    assert_eq!(
        err,
        DecodeError::SizeMismatch {
            expected: 26,
            actual: 27
        }
    );
}

#[test]
fn test_wrong_size_for_declared_type_rejected() {
    // A Beat-sized buffer tagged as Clock must not parse as either.
    let mut wire = msg(SyncPayload::Beat {
        bpm: 120.0,
        beat_position: 0,
        multiplier_idx: 0,
    })
    .encode()
    .to_vec();
    wire[0] = MessageType::Clock as u8;
    assert_eq!(
        SyncMessage::decode(&wire).unwrap_err(),
        DecodeError::SizeMismatch {
            expected: 26,
            actual: 30
        }
    );
}

#[test]
fn test_empty_datagram_rejected() {
    assert_eq!(
        SyncMessage::decode(&[]).unwrap_err(),
        DecodeError::SizeMismatch {
            expected: HEADER_SIZE,
            actual: 0
        }
    );
}

#[test]
fn test_unknown_type_tag_rejected() {
    let mut wire = msg(SyncPayload::Clock {
        is_leader: false,
        clock_tick: 0,
    })
    .encode()
    .to_vec();
    wire[0] = 99;
    assert_eq!(
        SyncMessage::decode(&wire).unwrap_err(),
        DecodeError::UnknownType(99)
    );
}

// ===== Reserved bytes =====

#[test]
fn test_clock_reserved_bytes_zero_filled() {
    let wire = msg(SyncPayload::Clock {
        is_leader: true,
        clock_tick: u32::MAX,
    })
    .encode();
    assert_eq!(&wire[23..26], &[0, 0, 0]);
}

#[test]
fn test_reserved_bytes_ignored_on_decode() {
    let m = msg(SyncPayload::Clock {
        is_leader: true,
        clock_tick: 7,
    });
    let mut wire = m.encode().to_vec();
    wire[23] = 0xAA;
    wire[24] = 0xBB;
    wire[25] = 0xCC;
    assert_eq!(SyncMessage::decode(&wire).unwrap(), m);
}

#[test]
fn test_nonzero_leader_flag_decodes_true() {
    let m = msg(SyncPayload::Clock {
        is_leader: true,
        clock_tick: 7,
    });
    let mut wire = m.encode().to_vec();
    wire[18] = 0x7F; // any nonzero byte reads as true
    assert_eq!(SyncMessage::decode(&wire).unwrap(), m);
}

// ===== Negotiate helpers =====

#[test]
fn test_negotiate_payload_shape() {
    let p = SyncPayload::negotiate(200);
    assert!(p.is_negotiate());
    let SyncPayload::Control { command, param1, value, .. } = p else {
        panic!("negotiate must be a Control payload");
    };
    assert_eq!(command, ControlCommand::Reset as u8);
    assert_eq!(param1, NEGOTIATE_PARAM);
    assert_eq!(value, 200);
}

#[test]
fn test_plain_reset_is_not_negotiate() {
    let p = SyncPayload::Control {
        command: ControlCommand::Reset as u8,
        param1: 0,
        param2: 0,
        param3: 0,
        value: 0,
    };
    assert!(!p.is_negotiate());
}

// ===== Properties =====

proptest! {
    #[test]
    fn prop_clock_round_trip(
        seq in any::<u16>(),
        priority in any::<u8>(),
        id in any::<[u8; 6]>(),
        ts in any::<u64>(),
        is_leader in any::<bool>(),
        tick in any::<u32>(),
    ) {
        let m = SyncMessage {
            seq,
            priority,
            sender: DeviceId::new(id),
            timestamp_micros: ts,
            payload: SyncPayload::Clock { is_leader, clock_tick: tick },
        };
        prop_assert_eq!(SyncMessage::decode(&m.encode()).unwrap(), m);
    }

    #[test]
    fn prop_beat_round_trip(
        bpm in 20.0f32..500.0,
        pos in any::<u32>(),
        mult in any::<u8>(),
    ) {
        let m = msg(SyncPayload::Beat {
            bpm,
            beat_position: pos,
            multiplier_idx: mult,
        });
        prop_assert_eq!(SyncMessage::decode(&m.encode()).unwrap(), m);
    }

    #[test]
    fn prop_random_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = SyncMessage::decode(&data);
    }
}
