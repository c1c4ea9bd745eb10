pub mod error;
pub mod input_handler;
pub mod simulation;
pub mod simulation_frame;
