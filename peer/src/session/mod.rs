pub mod events;
pub mod input_provider;
pub mod session;
pub mod session_config;

mod input_capture;
