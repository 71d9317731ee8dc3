//! Backend implementations.
//!
//! This module contains concrete implementations of the `SqsBackend` trait.

pub mod http;
pub mod memory;

pub use http::HttpSqsBackend;
pub use memory::InMemorySqsBackend;
