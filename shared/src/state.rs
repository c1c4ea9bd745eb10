use lockstep_serde::Serde;

/// A complete, serializable snapshot of the simulated world.
///
/// The simulation owns exactly one of these and replaces it every executed
/// frame. Peers exchange it once during the state handshake.
pub trait State: Serde + 'static {}

/// One peer's input for one frame.
///
/// Equality is used by the delta encoding: a run of equal inputs is sent
/// as a single payload followed by "identical" flags.
pub trait Input: Serde + 'static {}
