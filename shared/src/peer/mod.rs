pub mod error;
pub mod peer;
pub mod unacknowledged_queue;
