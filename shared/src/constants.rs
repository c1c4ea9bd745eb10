use crate::types::FrameIndex;

/// Frames the simulation clock trails the executable frontier by
pub const DEFAULT_PLAYOUT_DELAY: FrameIndex = 4;
/// Frames local input may run ahead of the latest acknowledged frame
pub const DEFAULT_MAX_PEER_DELAY: FrameIndex = 16;
/// Ticks per second for input capture and simulation
pub const DEFAULT_TICK_RATE: u32 = 60;
pub const DEFAULT_PORT: u16 = 12500;
/// Initial number of frames kept by each frame ring
pub const DEFAULT_FRAME_BUFFER: usize = 64;
pub const DEFAULT_PEER_COUNT: u8 = 2;

/// Upper bound on any frame ring. Signals further ahead than this are
/// rejected rather than growing memory without limit.
pub const MAX_FRAME_WINDOW: usize = 4096;
/// The input count of an Input message is a single byte
pub const MAX_INPUTS_PER_MESSAGE: usize = u8::MAX as usize;

pub const FIRST_FRAME_INDEX: FrameIndex = 0;
pub const NO_ACKNOWLEDGED_FRAME: FrameIndex = -1;
