//! Client for remote text-generation inference endpoints.
//!
//! Hosted models exhibit two distinct failure families: cold starts (the
//! model is still being loaded into serving memory, surfaced as HTTP 503
//! with an estimated wait) and shared-capacity throttling (HTTP 429). Both
//! are worth retrying; credential and routing problems are not. The client
//! distinguishes the two so callers neither waste retries on permanent
//! failures nor give up on transient ones.

mod client;
mod response;
mod retry;
mod types;

pub use client::InferenceClient;
pub use response::extract_generated_text;
pub use retry::RetryPolicy;
pub use types::{GenerationParams, InferenceError};
