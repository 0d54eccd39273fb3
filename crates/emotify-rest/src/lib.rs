//! # emotify-rest
//!
//! HTTP implementation of the `DiscordApi` port using `reqwest`.

mod client;
mod response;

pub use client::{RestClient, RestClientConfig};
pub use response::retry_after;
