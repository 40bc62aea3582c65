//! Ascend - headless runner library

pub mod commands;
pub mod config;
pub mod notifications;
mod state;

pub use config::AppConfig;
pub use state::AppState;
