use std::time::Duration;

use crate::types::FrameIndex;

/// A source of fixed-rate frame ticks.
///
/// Each tick is reported as the elapsed frame count right after it fired,
/// offset by the start frame.
pub trait TickSource {
    fn elapsed_frame_count(&self) -> FrameIndex;

    fn start_frame(&self) -> FrameIndex;

    /// Moves the frame origin, used when joining a session already in progress
    fn set_start_frame(&mut self, start_frame: FrameIndex);

    fn is_running(&self) -> bool;

    fn set_running(&mut self, running: bool);

    fn start(&mut self) {
        self.set_running(true);
    }

    fn stop(&mut self) {
        self.set_running(false);
    }

    /// Lets `elapsed` time pass and returns the ticks that fired, oldest first
    fn advance(&mut self, elapsed: Duration) -> Vec<FrameIndex>;
}

/// Receives both phases of a tick.
///
/// `on_tick` is the early phase (input capture, simulation execution) and
/// `on_late_tick` the late phase (network flushing). Use [`dispatch_tick`] to
/// deliver a tick to several listeners.
pub trait TickListener<E> {
    fn on_tick(&mut self, _frame_index: FrameIndex) -> Result<(), E> {
        Ok(())
    }

    fn on_late_tick(&mut self, _frame_index: FrameIndex) -> Result<(), E> {
        Ok(())
    }
}

/// Delivers one tick: every listener's early phase in order, then every
/// listener's late phase in order.
///
/// If an early phase fails, the listeners after it receive nothing, while
/// those whose early phase already ran still get their late phase. Every
/// listener sees either both phases of the tick or neither. The first error
/// is returned.
pub fn dispatch_tick<E>(
    frame_index: FrameIndex,
    listeners: &mut [&mut dyn TickListener<E>],
) -> Result<(), E> {
    let mut result = Ok(());
    let mut delivered = 0;
    for listener in listeners.iter_mut() {
        if let Err(error) = listener.on_tick(frame_index) {
            result = Err(error);
            break;
        }
        delivered += 1;
    }
    for listener in listeners.iter_mut().take(delivered) {
        let late_result = listener.on_late_tick(frame_index);
        if result.is_ok() {
            result = late_result;
        }
    }
    result
}
