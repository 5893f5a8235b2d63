//! Script-to-storyboard prompt generation toolkit.
//!
//! Depend on this crate to pull in the Scene Forge library crates behind
//! feature flags; disable the ones you do not need.

#![warn(missing_docs, clippy::pedantic)]

/// Scene records, counts, style images and identifiers.
pub use scene_primitives as primitives;

/// Wizard reducer, controller, prompt service and exports (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use scene_kernel as kernel;

/// Model adapters (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use scene_adapters as adapters;

/// Instruction templates and response schemas (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use scene_prompts as prompts;

/// Configuration loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use scene_config as config;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use scene_telemetry as telemetry;
