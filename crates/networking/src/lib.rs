//! Ascend Networking - HTTP clients for the remote account store and reward generation

pub mod http;

pub use http::{AccountClient, ClientConfig, GeneratorClient};
