use super::*;

#[test]
fn test_loopback_bus_queues_broadcasts_in_order() {
    let bus = LoopbackBus::new();
    let a = bus.endpoint();
    let b = bus.endpoint();
    a.broadcast(b"one").unwrap();
    b.broadcast(b"two").unwrap();
    assert_eq!(bus.drain(), vec![b"one".to_vec(), b"two".to_vec()]);
    assert_eq!(bus.pending(), 0);
}

#[test]
fn test_loopback_bus_rejects_oversized_payload() {
    let bus = LoopbackBus::new();
    let ep = bus.endpoint();
    let err = ep.broadcast(&vec![0u8; DEFAULT_MAX_DATAGRAM + 1]).unwrap_err();
    assert!(matches!(err, SendError::PayloadTooLarge { .. }));
    assert_eq!(bus.pending(), 0);
}

#[test]
fn test_total_loss_delivers_nothing_and_reports_ok() {
    let sim = NetworkSimulator {
        loss_rate: 1.0,
        duplicate_rate: 0.0,
    };
    let bus = LoopbackBus::with_simulator(sim);
    let ep = bus.endpoint();
    ep.broadcast(b"gone").unwrap();
    assert_eq!(bus.pending(), 0);
}

#[test]
fn test_always_duplicate_delivers_twice() {
    let sim = NetworkSimulator {
        loss_rate: 0.0,
        duplicate_rate: 1.0,
    };
    let bus = LoopbackBus::with_simulator(sim);
    bus.endpoint().broadcast(b"twice").unwrap();
    assert_eq!(bus.pending(), 2);
}

#[test]
fn test_manual_clock_advances() {
    let clock = ManualClock::new(10);
    assert_eq!(clock.now_micros(), 10);
    clock.advance(500);
    assert_eq!(clock.now_micros(), 510);
    let shared = clock.clone();
    shared.advance(1);
    assert_eq!(clock.now_micros(), 511);
}
