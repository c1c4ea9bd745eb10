use lockstep_shared::{
    FrameIndex, DEFAULT_FRAME_BUFFER, DEFAULT_MAX_PEER_DELAY, DEFAULT_PEER_COUNT,
    DEFAULT_PLAYOUT_DELAY, DEFAULT_PORT, DEFAULT_TICK_RATE,
};

use crate::network::network_config::NetworkConfig;

/// Contains Config properties which will be used by a Session
#[derive(Clone)]
pub struct SessionConfig {
    /// Frames the simulation trails the newest frame every peer is ready for
    pub playout_delay: FrameIndex,
    /// Frames local input may run ahead of the latest frame every peer
    /// acknowledged before input capture pauses
    pub max_peer_delay: FrameIndex,
    /// Ticks per second of the input, simulation and buffer clocks
    pub tick_rate: u32,
    /// Port a listening transport binds to
    pub port: u16,
    /// Initial number of frames each frame ring holds
    pub frame_buffer: usize,
    /// Number of peers in the session, ourselves included
    pub peer_count: u8,
    /// Configuration for the underlying Network. The expected remote peer
    /// count is derived from `peer_count`.
    pub network: NetworkConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            playout_delay: DEFAULT_PLAYOUT_DELAY,
            max_peer_delay: DEFAULT_MAX_PEER_DELAY,
            tick_rate: DEFAULT_TICK_RATE,
            port: DEFAULT_PORT,
            frame_buffer: DEFAULT_FRAME_BUFFER,
            peer_count: DEFAULT_PEER_COUNT,
            network: NetworkConfig::default(),
        }
    }
}
