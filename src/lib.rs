pub mod cli;
pub mod commands;
pub mod core;
pub mod error;
pub mod settings;
pub mod state;
pub mod types;
