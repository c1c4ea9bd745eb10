use crate::types::PeerId;

/// Readiness of a single frame
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReadyInfo {
    peers_ready: u8,
    ready_peer_ids: Vec<PeerId>,
    all_prior_frames_ready: bool,
}

impl FrameReadyInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peers_ready(&self) -> u8 {
        self.peers_ready
    }

    pub fn all_prior_frames_ready(&self) -> bool {
        self.all_prior_frames_ready
    }

    /// Enough peers have reported this frame, regardless of its predecessors
    pub fn has_all_peers(&self, peer_count: u8) -> bool {
        self.peers_ready >= peer_count
    }

    /// This frame and every frame before it can execute
    pub fn is_executable(&self, peer_count: u8) -> bool {
        self.has_all_peers(peer_count) && self.all_prior_frames_ready
    }

    pub(crate) fn set_all_prior_frames_ready(&mut self) {
        self.all_prior_frames_ready = true;
    }

    pub(crate) fn increment(&mut self) {
        self.peers_ready = self.peers_ready.saturating_add(1);
    }

    /// Counts `peer_id` once. Returns false if it was already counted.
    pub(crate) fn insert_peer(&mut self, peer_id: PeerId) -> bool {
        if self.ready_peer_ids.contains(&peer_id) {
            return false;
        }
        self.ready_peer_ids.push(peer_id);
        self.increment();
        true
    }
}
