//! Ascend Core - Shared data models, types, errors, and collaborator traits

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;
pub mod types;

pub use config::EngineConfig;
pub use errors::{Error, Result};
pub use models::*;
pub use traits::*;
pub use types::*;
