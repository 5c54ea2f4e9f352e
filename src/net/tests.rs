use super::*;

// ===== SystemClock =====

#[test]
fn test_system_clock_is_monotonic() {
    let clock = SystemClock::new();
    let a = clock.now_micros();
    let b = clock.now_micros();
    assert!(b >= a);
}

#[test]
fn test_system_clock_starts_near_zero() {
    let clock = SystemClock::new();
    assert!(clock.now_micros() < 1_000_000);
}

// ===== UdpBroadcastLink =====

#[cfg(feature = "tokio-runtime")]
mod udp {
    use std::sync::Arc;
    use std::sync::mpsc;

    use super::*;
    use crate::error::SendError;

    #[tokio::test]
    async fn test_oversized_payload_rejected_before_send() {
        let link = UdpBroadcastLink::bind(
            "127.0.0.1:0".parse().unwrap(),
            "127.0.0.1:9".parse().unwrap(),
            32,
        )
        .await
        .unwrap();
        let err = link.broadcast(&[0u8; 64]).unwrap_err();
        assert!(matches!(
            err,
            SendError::PayloadTooLarge { size: 64, max: 32 }
        ));
    }

    #[tokio::test]
    async fn test_datagram_reaches_registered_handler() {
        let receiver = UdpBroadcastLink::bind(
            "127.0.0.1:0".parse().unwrap(),
            "127.0.0.1:9".parse().unwrap(),
            DEFAULT_MAX_DATAGRAM,
        )
        .await
        .unwrap();
        let dest = receiver.local_addr().unwrap();

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let handle = receiver.spawn_receiver(Box::new(move |data, _src| {
            let _ = tx.send(data.to_vec());
        }));

        let sender = UdpBroadcastLink::bind(
            "127.0.0.1:0".parse().unwrap(),
            dest,
            DEFAULT_MAX_DATAGRAM,
        )
        .await
        .unwrap();
        let sender: Arc<dyn Transport> = Arc::new(sender);
        // tokio reports a freshly bound socket as not-writable until the
        // reactor polls once; park briefly so the non-blocking
        // try_send_to inside broadcast sees writable readiness.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        sender.broadcast(b"tick").unwrap();

        let got = tokio::task::spawn_blocking(move || {
            rx.recv_timeout(std::time::Duration::from_secs(2)).unwrap()
        })
        .await
        .unwrap();
        assert_eq!(got, b"tick");
        handle.abort();
    }
}
