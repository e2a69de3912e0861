//! Client for the Netris controller REST API
//!
//! This library provides:
//! - `NetrisClient`, a session-authenticated HTTP client
//! - the object-safe `NetrisApi` trait the operator programs against
//! - typed wire models for every collection the operator reads

pub mod api;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;

pub use api::{list_typed, NetrisApi};
pub use client::{ClientConfig, NetrisClient};
pub use endpoint::Endpoint;
pub use error::{ClientError, Result};
