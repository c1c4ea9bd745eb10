/// Index of a simulation frame. Signed so that "nothing yet" can sit below
/// the first frame.
pub type FrameIndex = i32;
/// Identity a peer announces during the handshake
pub type PeerId = i32;
/// Transport-level handle for a remote endpoint
pub type ConnectionId = i32;
