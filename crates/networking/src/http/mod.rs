//! reqwest-based clients for the hosted backend

mod client;
mod generator;
mod rows;

pub use client::{AccountClient, ClientConfig};
pub use generator::GeneratorClient;
