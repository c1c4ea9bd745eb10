pub mod events;
pub mod network;
pub mod network_config;
