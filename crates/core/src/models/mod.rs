//! Data models for progression entities

mod account;
mod character;
mod gift;
mod reward;
mod streak;

pub use account::*;
pub use character::*;
pub use gift::*;
pub use reward::*;
pub use streak::*;
