//! The instruction templates sent for each prompt service operation.

use scene_primitives::{ImagePrompt, JoinedScene, SceneCount};
use serde::Serialize;

use crate::template::{PromptTemplate, TemplateError, TemplateResult};

const SUMMARY_TEMPLATE: &str = "In one sentence, analyze the following script and describe its main theme or subject. Script: \"{{script}}\"";

const IMAGE_PROMPTS_TEMPLATE: &str = r#"You are an expert film director and prompt engineer. Your task is to break down a script into a specific number of scenes and generate exceptionally detailed and creative prompts for an AI image generator.

**Script:**
"{{script}}"

**Instructions:**
1. Analyze the script and divide it into exactly {{scene_count}} distinct, logical scenes.
2. For each scene, create a very detailed **Image Prompt** in an infographic style, similar to prompts for Leonardo or MidJourney.
3. Each Image Prompt must be a rich, descriptive paragraph of at least 40 words. Describe the visual elements, composition, colors, and overall aesthetic in a way that an AI image generator can create a high-quality, visually appealing infographic.
4. If a text style is provided, infuse it into every single Image Prompt. Style: "{{style}}".
5. If a reference image is provided, analyze its artistic style (e.g., color palette, lighting, composition, texture) and apply that style meticulously to every prompt.
6. Number the scenes from 1 to {{scene_count}} and return the output as a JSON array."#;

const VIDEO_PROMPTS_TEMPLATE: &str = r"You are an expert video animator. Based on the following set of detailed image prompts, generate a corresponding cinematic, motion-based descriptive **Video Prompt** for each scene.

**Image Prompts:**
{{image_prompts}}

**Instructions:**
1. For each scene, create one corresponding video prompt in the style of advanced video generation models like Kling AI or Hailuo AI, keeping the scene number of the image prompt it animates.
2. Describe dynamic camera movements (e.g., dolly zoom, crane shot, tracking shot), character actions, environmental effects (e.g., wind, rain), and seamless transitions to create a visually stunning and coherent video sequence.
3. Return the output as a JSON array.";

const JSON_PROMPTS_TEMPLATE: &str = r"You are a meticulous data architect. Your task is to convert a series of scene descriptions (image and video prompts) into a structured JSON format. Analyze the provided prompts for each scene and extract the key details.

**Scene Prompts:**
{{scenes}}

**Instructions:**
1. For each scene, create a single JSON object.
2. Populate the properties based on the details in the prompts. Infer reasonable values where necessary (e.g., duration, resolution).
3. The 'elements' property should be an array of objects, each describing a key visual component in the scene.
4. Return the output as a JSON array of these objects.";

/// Inputs for the image prompt instruction.
#[derive(Clone, Copy, Debug)]
pub struct ImagePromptInput<'a> {
    /// Full script text.
    pub script: &'a str,
    /// Exact number of scenes requested.
    pub scene_count: SceneCount,
    /// Style description; may be empty when only an image is supplied.
    pub style: &'a str,
}

/// Holds the four instruction templates used by the prompt service.
#[derive(Clone, Debug)]
pub struct PromptCatalog {
    summary: PromptTemplate,
    image_prompts: PromptTemplate,
    video_prompts: PromptTemplate,
    json_prompts: PromptTemplate,
}

impl PromptCatalog {
    /// Builds the catalog from the bundled templates.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Malformed`] if a bundled template is invalid.
    pub fn new() -> TemplateResult<Self> {
        Ok(Self {
            summary: PromptTemplate::builder(SUMMARY_TEMPLATE)
                .with_required_variable("script")
                .build()?,
            image_prompts: PromptTemplate::builder(IMAGE_PROMPTS_TEMPLATE)
                .with_required_variable("script")
                .with_required_variable("scene_count")
                .with_variable("style", "")
                .build()?,
            video_prompts: PromptTemplate::builder(VIDEO_PROMPTS_TEMPLATE)
                .with_required_variable("image_prompts")
                .build()?,
            json_prompts: PromptTemplate::builder(JSON_PROMPTS_TEMPLATE)
                .with_required_variable("scenes")
                .build()?,
        })
    }

    /// Instruction asking for a one-sentence theme summary.
    ///
    /// # Errors
    ///
    /// Propagates template rendering failures.
    pub fn summary(&self, script: &str) -> TemplateResult<String> {
        self.summary.render_with(&[("script", script)])
    }

    /// Instruction asking for one image prompt per scene.
    ///
    /// # Errors
    ///
    /// Propagates template rendering failures.
    pub fn image_prompts(&self, input: ImagePromptInput<'_>) -> TemplateResult<String> {
        let scene_count = input.scene_count.to_string();
        self.image_prompts.render_with(&[
            ("script", input.script),
            ("scene_count", scene_count.as_str()),
            ("style", input.style),
        ])
    }

    /// Instruction asking for one video prompt per image prompt.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Context`] if the prompts cannot be encoded.
    pub fn video_prompts(&self, image_prompts: &[ImagePrompt]) -> TemplateResult<String> {
        let context = encode_context(image_prompts)?;
        self.video_prompts
            .render_with(&[("image_prompts", context.as_str())])
    }

    /// Instruction asking for structured records of the joined scenes.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Context`] if the scenes cannot be encoded.
    pub fn json_prompts(&self, scenes: &[JoinedScene]) -> TemplateResult<String> {
        let context = encode_context(scenes)?;
        self.json_prompts.render_with(&[("scenes", context.as_str())])
    }
}

fn encode_context<T: Serialize + ?Sized>(value: &T) -> TemplateResult<String> {
    serde_json::to_string_pretty(value).map_err(|err| TemplateError::Context {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_primitives::{VideoPrompt, join_scenes};

    fn catalog() -> PromptCatalog {
        PromptCatalog::new().expect("bundled templates are valid")
    }

    #[test]
    fn summary_quotes_script() {
        let rendered = catalog().summary("A lone astronaut drifts.").unwrap();
        assert!(rendered.starts_with("In one sentence"));
        assert!(rendered.ends_with("Script: \"A lone astronaut drifts.\""));
    }

    #[test]
    fn image_instruction_embeds_count_and_style() {
        let rendered = catalog()
            .image_prompts(ImagePromptInput {
                script: "A lone astronaut drifts.",
                scene_count: SceneCount::new(4).unwrap(),
                style: "cinematic",
            })
            .unwrap();

        assert!(rendered.contains("divide it into exactly 4 distinct"));
        assert!(rendered.contains("from 1 to 4"));
        assert!(rendered.contains("Style: \"cinematic\""));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn image_instruction_allows_empty_style() {
        let rendered = catalog()
            .image_prompts(ImagePromptInput {
                script: "s",
                scene_count: SceneCount::DEFAULT,
                style: "",
            })
            .unwrap();
        assert!(rendered.contains("Style: \"\""));
    }

    #[test]
    fn video_instruction_embeds_image_prompts_as_json() {
        let prompts = vec![ImagePrompt::new(1, "a red door")];
        let rendered = catalog().video_prompts(&prompts).unwrap();
        assert!(rendered.contains("\"image_prompt\": \"a red door\""));
        assert!(rendered.contains("\"scene\": 1"));
    }

    #[test]
    fn json_instruction_embeds_joined_scenes() {
        let images = vec![ImagePrompt::new(1, "a"), ImagePrompt::new(2, "b")];
        let videos = vec![VideoPrompt::new(1, "pan")];
        let rendered = catalog().json_prompts(&join_scenes(&images, &videos)).unwrap();
        assert!(rendered.contains("\"video_prompt\": \"pan\""));
        assert!(rendered.contains("\"video_prompt\": \"N/A\""));
    }
}
