//! Scene-level prompt records returned by the prompt service.

use serde::{Deserialize, Serialize};

/// Placeholder used when an image prompt has no video prompt for its scene.
pub const MISSING_VIDEO_PROMPT: &str = "N/A";

/// Image-generation prompt for one scene.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ImagePrompt {
    /// 1-based scene number assigned by the service.
    pub scene: u32,
    /// Prompt text for an image generator.
    pub image_prompt: String,
}

impl ImagePrompt {
    /// Creates a new image prompt.
    #[must_use]
    pub fn new(scene: u32, image_prompt: impl Into<String>) -> Self {
        Self {
            scene,
            image_prompt: image_prompt.into(),
        }
    }
}

/// Motion prompt for one scene, keyed to an [`ImagePrompt`] by scene number.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct VideoPrompt {
    /// 1-based scene number assigned by the service.
    pub scene: u32,
    /// Prompt text for a video generator.
    pub video_prompt: String,
}

impl VideoPrompt {
    /// Creates a new video prompt.
    #[must_use]
    pub fn new(scene: u32, video_prompt: impl Into<String>) -> Self {
        Self {
            scene,
            video_prompt: video_prompt.into(),
        }
    }
}

/// Key visual element of a structured scene record.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SceneElement {
    /// Element category (map, character, icon, text, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-form description of the element.
    pub description: String,
}

/// Structured description of one scene.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct JsonPromptRecord {
    /// 1-based scene number.
    pub scene: u32,
    /// Short summary of the scene content.
    pub scene_description: String,
    /// Overall visual style.
    pub style: String,
    /// Camera movement or animation.
    pub camera_motion: String,
    /// Key visual elements, in the order the service returned them.
    pub elements: Vec<SceneElement>,
    /// Estimated clip duration, e.g. `8 seconds`.
    pub duration: String,
    /// Target resolution, e.g. `1080p`.
    pub resolution: String,
}

/// Image and video prompt of the same scene, as sent for JSON structuring.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct JoinedScene {
    /// Scene number taken from the image prompt.
    pub scene: u32,
    /// Image prompt text.
    pub image_prompt: String,
    /// Matching video prompt text, or [`MISSING_VIDEO_PROMPT`].
    pub video_prompt: String,
}

/// Joins video prompts onto image prompts by scene number.
///
/// Every image prompt yields exactly one joined record, in image order. When
/// several video prompts share a scene number the first one wins.
#[must_use]
pub fn join_scenes(image_prompts: &[ImagePrompt], video_prompts: &[VideoPrompt]) -> Vec<JoinedScene> {
    image_prompts
        .iter()
        .map(|image| {
            let video_prompt = video_prompts
                .iter()
                .find(|video| video.scene == image.scene)
                .map_or_else(
                    || MISSING_VIDEO_PROMPT.to_owned(),
                    |video| video.video_prompt.clone(),
                );
            JoinedScene {
                scene: image.scene,
                image_prompt: image.image_prompt.clone(),
                video_prompt,
            }
        })
        .collect()
}
