pub mod frame_ready_info;
pub mod manual_clock;
pub mod offset_clock;
pub mod playout_delayed_clock;
pub mod tick_source;
pub mod time_clock;
