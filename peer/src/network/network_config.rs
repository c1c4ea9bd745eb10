use lockstep_shared::PeerId;

/// Contains Config properties which will be used by the Network
#[derive(Clone)]
pub struct NetworkConfig {
    /// Our peer id. A random non-negative id is picked when unset.
    pub peer_id: Option<PeerId>,
    /// When an acknowledgment covers several frames, raise one acknowledged
    /// event per frame instead of one for the newest frame
    pub tick_all_acknowledged_frames: bool,
    /// How many identified remote peers must hold state before the session
    /// counts as synchronized
    pub remote_peer_count: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            peer_id: None,
            tick_all_acknowledged_frames: true,
            remote_peer_count: 1,
        }
    }
}
