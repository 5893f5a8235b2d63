//! Model adapters used by the prompt service.
//!
//! Providers implement the trait-based interface defined in [`traits`]; the
//! [`gemini`] module talks to Google's `generateContent` REST endpoint.

#![warn(missing_docs, clippy::pedantic)]

pub mod gemini;
pub mod traits;

mod http_client;
