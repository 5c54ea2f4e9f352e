//! UDP broadcast transport on tokio.
//!
//! Stands in for the hardware radio when running on a host: datagrams
//! go to the subnet broadcast address and arrive unordered and
//! unacknowledged, the same contract the sync core is built for.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use super::traits::{MonotonicClock, Transport};
use crate::error::SendError;
use crate::sync::SharedCoordinator;
use crate::types::MetronomeState;

/// Handler invoked once per received datagram.
pub type DatagramHandler = Box<dyn FnMut(&[u8], SocketAddr) + Send>;

/// UDP broadcast link: one socket, one destination broadcast address.
pub struct UdpBroadcastLink {
    socket: Arc<UdpSocket>,
    dest: SocketAddr,
    max_payload: usize,
}

impl UdpBroadcastLink {
    /// Bind a broadcast-enabled socket.
    ///
    /// # Errors
    /// Returns `std::io::Error` if binding or configuring the socket
    /// fails.
    pub async fn bind(
        local: SocketAddr,
        dest: SocketAddr,
        max_payload: usize,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        socket.set_broadcast(true)?;
        Ok(Self {
            socket: Arc::new(socket),
            dest,
            max_payload,
        })
    }

    /// Spawn the receive loop, invoking `handler` per datagram.
    ///
    /// This is the explicit registration that binds inbound traffic to
    /// one handler instance; there is no ambient global receiver.
    pub fn spawn_receiver(&self, mut handler: DatagramHandler) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        let max = self.max_payload;
        tokio::spawn(async move {
            let mut buf = vec![0u8; max.max(64)];
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, src)) => handler(&buf[..len], src),
                    Err(e) if is_transient_udp_error(&e) => {
                        tracing::debug!(error = %e, "transient receive error");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "receive loop terminating");
                        break;
                    }
                }
            }
        })
    }

    /// Spawn a receive loop that feeds a shared coordinator.
    ///
    /// Each datagram is applied under a short lock of the coordinator
    /// and the shared rhythmic state, timestamped by `clock` at
    /// delivery.
    pub fn attach_coordinator(
        &self,
        coordinator: SharedCoordinator,
        state: Arc<Mutex<MetronomeState>>,
        clock: Arc<dyn MonotonicClock>,
    ) -> JoinHandle<()> {
        self.spawn_receiver(Box::new(move |data, _src| {
            let now = clock.now_micros();
            let (Ok(mut coord), Ok(mut state)) = (coordinator.lock(), state.lock()) else {
                tracing::warn!("dropping datagram: shared state lock poisoned");
                return;
            };
            coord.on_datagram(data, now, &mut state);
        }))
    }

    /// The local address the socket is bound to.
    ///
    /// # Errors
    /// Returns `std::io::Error` if the socket has no local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Transport for UdpBroadcastLink {
    fn broadcast(&self, payload: &[u8]) -> Result<(), SendError> {
        if payload.len() > self.max_payload {
            return Err(SendError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload,
            });
        }
        // try_send_to keeps the call non-blocking for callback
        // contexts; a full socket buffer surfaces as WouldBlock and
        // the datagram is dropped like any other radio loss.
        self.socket
            .try_send_to(payload, self.dest)
            .map(|_| ())
            .map_err(SendError::Io)
    }

    fn max_payload(&self) -> usize {
        self.max_payload
    }
}

/// Whether a UDP error is transient and the receive loop should keep
/// going. `recv_from` can surface an ICMP "port unreachable" from an
/// earlier send as `ConnectionReset`; peers joining late make that
/// benign here.
fn is_transient_udp_error(e: &io::Error) -> bool {
    e.raw_os_error() == Some(10054) || e.kind() == io::ErrorKind::ConnectionReset
}
