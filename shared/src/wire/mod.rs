pub mod error;
pub mod input_message;
pub mod message;
pub mod message_type;
pub mod network_frame;
