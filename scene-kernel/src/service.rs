//! Prompt service boundary and its model-backed implementation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use scene_adapters::traits::{
    AdapterError, ContentPart, GenerationRequest, ModelAdapter,
};
use scene_primitives::{
    ImagePrompt, JsonPromptRecord, SceneCount, StyleImage, VideoPrompt, join_scenes,
};
use scene_prompts::{
    ImagePromptInput, PromptCatalog, ResponseSchema, SchemaViolation, TemplateError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Result alias for prompt service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures of a single prompt service round trip.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The model adapter failed (transport, status, rate limit, envelope).
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// An instruction could not be rendered.
    #[error("failed to render instruction: {0}")]
    Template(#[from] TemplateError),

    /// The structured reply did not match its declared schema.
    #[error("reply rejected: {0}")]
    Schema(#[from] SchemaViolation),

    /// The reply was not valid JSON or could not be decoded.
    #[error("failed to decode reply: {0}")]
    Decode(#[from] serde_json::Error),

    /// The model returned no text.
    #[error("model returned an empty reply")]
    EmptyResponse,
}

/// The generative operations the wizard depends on.
///
/// Each method is a single round trip with no retry or caching.
#[async_trait]
pub trait PromptService: Send + Sync {
    /// One sentence describing the script's main theme.
    async fn summarize(&self, script: &str) -> ServiceResult<String>;

    /// Splits the script into `scene_count` scenes with one image prompt each.
    async fn generate_image_prompts(
        &self,
        script: &str,
        scene_count: SceneCount,
        style: &str,
        image: Option<&StyleImage>,
    ) -> ServiceResult<Vec<ImagePrompt>>;

    /// One motion-oriented prompt per image prompt.
    async fn generate_video_prompts(
        &self,
        image_prompts: &[ImagePrompt],
    ) -> ServiceResult<Vec<VideoPrompt>>;

    /// Structured records for the joined image and video prompts.
    async fn generate_json_prompts(
        &self,
        image_prompts: &[ImagePrompt],
        video_prompts: &[VideoPrompt],
    ) -> ServiceResult<Vec<JsonPromptRecord>>;
}

/// [`PromptService`] backed by a [`ModelAdapter`] and the bundled
/// [`PromptCatalog`].
#[derive(Clone)]
pub struct GenerativePromptService {
    adapter: Arc<dyn ModelAdapter>,
    catalog: PromptCatalog,
    temperature: Option<f32>,
}

impl fmt::Debug for GenerativePromptService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metadata = self.adapter.metadata();
        f.debug_struct("GenerativePromptService")
            .field("provider", &metadata.provider())
            .field("model", &metadata.model())
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl GenerativePromptService {
    /// Creates a service that sends every request through `adapter`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Template`] if the bundled instructions are
    /// malformed.
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> ServiceResult<Self> {
        Ok(Self {
            adapter,
            catalog: PromptCatalog::new()?,
            temperature: None,
        })
    }

    /// Overrides the sampling temperature for every request.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    async fn send(&self, mut request: GenerationRequest) -> ServiceResult<String> {
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let metadata = self.adapter.metadata();
        debug!(
            provider = metadata.provider(),
            model = metadata.model(),
            parts = request.parts().len(),
            structured = request.response_schema().is_some(),
            "sending generation request"
        );

        let output = self.adapter.generate(request).await?;
        let text = output.text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(text.to_owned())
    }

    async fn structured<T: DeserializeOwned>(
        &self,
        parts: Vec<ContentPart>,
        schema: ResponseSchema,
    ) -> ServiceResult<T> {
        let request = GenerationRequest::new(parts)?.with_json_schema(schema.clone());
        let text = self.send(request).await?;
        decode_structured(&text, &schema)
    }
}

/// Parses `text` as JSON, checks it against `schema`, then decodes it.
///
/// # Errors
///
/// Returns [`ServiceError::Decode`] for invalid JSON and
/// [`ServiceError::Schema`] for a value that does not match `schema`.
pub fn decode_structured<T: DeserializeOwned>(
    text: &str,
    schema: &ResponseSchema,
) -> ServiceResult<T> {
    let value: Value = serde_json::from_str(text.trim())?;
    schema.validate(&value)?;
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl PromptService for GenerativePromptService {
    async fn summarize(&self, script: &str) -> ServiceResult<String> {
        let instruction = self.catalog.summary(script)?;
        self.send(GenerationRequest::from_text(instruction)).await
    }

    async fn generate_image_prompts(
        &self,
        script: &str,
        scene_count: SceneCount,
        style: &str,
        image: Option<&StyleImage>,
    ) -> ServiceResult<Vec<ImagePrompt>> {
        let instruction = self.catalog.image_prompts(ImagePromptInput {
            script,
            scene_count,
            style,
        })?;

        let mut parts = vec![ContentPart::text(instruction)];
        if let Some(image) = image {
            parts.push(ContentPart::inline_data(image.mime_type(), image.base64()));
        }

        let prompts: Vec<ImagePrompt> = self
            .structured(parts, ResponseSchema::image_prompts())
            .await?;
        if prompts.len() != scene_count.get() as usize {
            warn!(
                requested = scene_count.get(),
                returned = prompts.len(),
                "model returned a different number of scenes"
            );
        }
        Ok(prompts)
    }

    async fn generate_video_prompts(
        &self,
        image_prompts: &[ImagePrompt],
    ) -> ServiceResult<Vec<VideoPrompt>> {
        let instruction = self.catalog.video_prompts(image_prompts)?;
        self.structured(
            vec![ContentPart::text(instruction)],
            ResponseSchema::video_prompts(),
        )
        .await
    }

    async fn generate_json_prompts(
        &self,
        image_prompts: &[ImagePrompt],
        video_prompts: &[VideoPrompt],
    ) -> ServiceResult<Vec<JsonPromptRecord>> {
        let scenes = join_scenes(image_prompts, video_prompts);
        let instruction = self.catalog.json_prompts(&scenes)?;
        self.structured(
            vec![ContentPart::text(instruction)],
            ResponseSchema::json_prompts(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scene_adapters::traits::{AdapterMetadata, AdapterResult, GenerationOutput};
    use std::sync::Mutex;

    struct StaticAdapter {
        metadata: AdapterMetadata,
        response: String,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl StaticAdapter {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                metadata: AdapterMetadata::new("test", "static"),
                response: response.to_owned(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> GenerationRequest {
            self.seen.lock().unwrap().last().cloned().expect("request sent")
        }
    }

    #[async_trait]
    impl ModelAdapter for StaticAdapter {
        fn metadata(&self) -> &AdapterMetadata {
            &self.metadata
        }

        async fn generate(&self, request: GenerationRequest) -> AdapterResult<GenerationOutput> {
            self.seen.lock().unwrap().push(request);
            Ok(GenerationOutput::new(self.response.clone()))
        }
    }

    struct FailingAdapter {
        metadata: AdapterMetadata,
    }

    #[async_trait]
    impl ModelAdapter for FailingAdapter {
        fn metadata(&self) -> &AdapterMetadata {
            &self.metadata
        }

        async fn generate(&self, _request: GenerationRequest) -> AdapterResult<GenerationOutput> {
            Err(AdapterError::transport("connection reset"))
        }
    }

    fn service(adapter: Arc<StaticAdapter>) -> GenerativePromptService {
        GenerativePromptService::new(adapter).expect("catalog builds")
    }

    #[tokio::test]
    async fn summary_is_trimmed() {
        let adapter = StaticAdapter::new("  Isolation in deep space.\n");
        let summary = service(adapter.clone()).summarize("A lone astronaut").await.unwrap();
        assert_eq!(summary, "Isolation in deep space.");

        let request = adapter.last_request();
        assert!(request.response_schema().is_none());
        assert!(request.parts()[0].as_text().unwrap().contains("A lone astronaut"));
    }

    #[tokio::test]
    async fn empty_summary_is_an_error() {
        let err = service(StaticAdapter::new("   "))
            .summarize("script")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptyResponse));
    }

    #[tokio::test]
    async fn image_prompts_attach_reference_image() {
        let adapter = StaticAdapter::new(r#"[{"scene":1,"image_prompt":"drift"}]"#);
        let image = StyleImage::new("aGk=", "image/png").unwrap();
        let prompts = service(adapter.clone())
            .with_temperature(0.4)
            .generate_image_prompts("script", SceneCount::new(3).unwrap(), "", Some(&image))
            .await
            .unwrap();
        assert_eq!(prompts, vec![ImagePrompt::new(1, "drift")]);

        let request = adapter.last_request();
        assert_eq!(request.parts().len(), 2);
        assert_eq!(
            request.parts()[1],
            ContentPart::inline_data("image/png", "aGk=")
        );
        assert_eq!(request.temperature(), Some(0.4));
        assert_eq!(request.response_mime_type(), Some("application/json"));
    }

    #[tokio::test]
    async fn structured_reply_must_match_schema() {
        let adapter = StaticAdapter::new(r#"[{"scene":1,"video_prompt":"pan","extra":true}]"#);
        let err = service(adapter)
            .generate_video_prompts(&[ImagePrompt::new(1, "a")])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Schema(_)));
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let err = service(StaticAdapter::new("not json"))
            .generate_video_prompts(&[ImagePrompt::new(1, "a")])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[tokio::test]
    async fn json_prompts_embed_joined_scenes() {
        let reply = r#"[{
            "scene": 1,
            "scene_description": "An astronaut adrift",
            "style": "cinematic",
            "camera_motion": "slow dolly",
            "elements": [{"type": "character", "description": "astronaut"}],
            "duration": "8 seconds",
            "resolution": "4K"
        }]"#;
        let adapter = StaticAdapter::new(reply);
        let records = service(adapter.clone())
            .generate_json_prompts(
                &[ImagePrompt::new(1, "adrift"), ImagePrompt::new(2, "earth")],
                &[VideoPrompt::new(1, "dolly")],
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].elements[0].kind, "character");

        let instruction = adapter.last_request().parts()[0]
            .as_text()
            .unwrap()
            .to_owned();
        assert!(instruction.contains("\"video_prompt\": \"N/A\""));
    }

    #[tokio::test]
    async fn adapter_failures_propagate() {
        let adapter = Arc::new(FailingAdapter {
            metadata: AdapterMetadata::new("test", "failing"),
        });
        let service = GenerativePromptService::new(adapter).unwrap();
        let err = service.summarize("script").await.unwrap_err();
        assert!(matches!(err, ServiceError::Adapter(AdapterError::Transport { .. })));
    }

    #[test]
    fn decode_structured_trims_whitespace() {
        let prompts: Vec<ImagePrompt> = decode_structured(
            "\n [{\"scene\": 2, \"image_prompt\": \"x\"}] \n",
            &ResponseSchema::image_prompts(),
        )
        .unwrap();
        assert_eq!(prompts[0].scene, 2);
    }
}
