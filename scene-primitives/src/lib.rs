//! Core shared types for the Scene Forge prompt wizard.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod scene;
mod style;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Identifiers for sessions and in-flight service requests.
pub use ids::{RequestToken, SessionId};
/// Scene-level prompt records and the image/video join.
pub use scene::{
    ImagePrompt, JoinedScene, JsonPromptRecord, MISSING_VIDEO_PROMPT, SceneElement, VideoPrompt,
    join_scenes,
};
/// Scene pacing and style payload types.
pub use style::{SceneCount, StyleImage};
