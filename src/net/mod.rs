//! Transport abstraction layer.
//!
//! The sync core only ever sees the [`Transport`] trait; the tokio UDP
//! implementation is host-side plumbing behind the `tokio-runtime`
//! feature.

mod traits;

#[cfg(feature = "tokio-runtime")]
mod tokio_impl;

#[cfg(test)]
mod tests;

pub use traits::{DEFAULT_MAX_DATAGRAM, MonotonicClock, SystemClock, Transport};

#[cfg(feature = "tokio-runtime")]
pub use tokio_impl::{DatagramHandler, UdpBroadcastLink};
