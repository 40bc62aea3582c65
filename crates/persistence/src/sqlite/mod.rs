//! SQLite database management

mod accounts;
mod connection;
mod gifts;
mod settings;

pub use accounts::*;
pub use connection::Database;
pub use gifts::*;
pub use settings::*;
