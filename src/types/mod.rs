//! Core types: device identity, configuration, and shared rhythmic state.

mod config;
mod device;
mod state;


pub use config::SyncConfig;
pub use device::DeviceId;
pub use state::{MAX_BEATS, MAX_BPM, MIN_BPM, MetronomeChannel, MetronomeState, TEMPO_MULTIPLIERS};
