pub mod commands;
pub mod state;
pub mod trackers;
