use crate::{
    constants::NO_ACKNOWLEDGED_FRAME,
    peer::unacknowledged_queue::UnacknowledgedQueue,
    types::{ConnectionId, FrameIndex, PeerId},
};

/// Bookkeeping for one remote peer
pub struct Peer<I> {
    peer_id: Option<PeerId>,
    connection_id: ConnectionId,
    has_state: bool,
    acknowledged_frame: FrameIndex,
    sent_frame: FrameIndex,
    unacknowledged: UnacknowledgedQueue<I>,
}

impl<I> Peer<I> {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            peer_id: None,
            connection_id,
            has_state: false,
            acknowledged_frame: NO_ACKNOWLEDGED_FRAME,
            sent_frame: NO_ACKNOWLEDGED_FRAME,
            unacknowledged: UnacknowledgedQueue::new(),
        }
    }

    /// Known once the peer has introduced itself
    pub fn peer_id(&self) -> Option<PeerId> {
        self.peer_id
    }

    pub fn set_peer_id(&mut self, peer_id: PeerId) {
        self.peer_id = Some(peer_id);
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Moves the peer to a new connection, keeping everything else
    pub fn set_connection_id(&mut self, connection_id: ConnectionId) {
        self.connection_id = connection_id;
    }

    /// The peer holds a game state, either its own or one it acknowledged
    /// from us
    pub fn has_state(&self) -> bool {
        self.has_state
    }

    pub fn set_has_state(&mut self) {
        self.has_state = true;
    }

    /// Highest of our frames this peer has acknowledged
    pub fn acknowledged_frame(&self) -> FrameIndex {
        self.acknowledged_frame
    }

    /// Records an acknowledgment and drops the acknowledged inputs. Returns
    /// false if the acknowledgment was not newer than the last one.
    pub fn acknowledge(&mut self, frame_index: FrameIndex) -> bool {
        self.unacknowledged.acknowledge_frame_and_older(frame_index);
        if frame_index <= self.acknowledged_frame {
            return false;
        }
        self.acknowledged_frame = frame_index;
        true
    }

    /// Highest frame any message to this peer has covered
    pub fn sent_frame(&self) -> FrameIndex {
        self.sent_frame
    }

    pub fn record_sent(&mut self, frame_index: FrameIndex) {
        self.sent_frame = self.sent_frame.max(frame_index);
    }

    /// Restarts acknowledgment after `frame_index`, for a peer that was just
    /// sent a state for the frame after it. Older inputs are dropped, and
    /// newer ones have to be acknowledged again.
    pub fn resume_after(&mut self, frame_index: FrameIndex) {
        self.acknowledged_frame = self.acknowledged_frame.min(frame_index);
        self.unacknowledged.acknowledge_frame_and_older(frame_index);
    }

    pub fn unacknowledged(&self) -> &UnacknowledgedQueue<I> {
        &self.unacknowledged
    }

    pub fn unacknowledged_mut(&mut self) -> &mut UnacknowledgedQueue<I> {
        &mut self.unacknowledged
    }
}
