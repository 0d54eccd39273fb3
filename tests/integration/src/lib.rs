//! Integration test utilities for the reaction engine
//!
//! Spins up an in-process fake of the remote chat API and drives the real
//! HTTP client and engine against it.

pub mod fake_api;
pub mod fixtures;
pub mod helpers;

pub use fake_api::*;
pub use fixtures::*;
pub use helpers::*;
