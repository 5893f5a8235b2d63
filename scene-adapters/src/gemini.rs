//! Google Gemini adapter.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use hyper::body::to_bytes;
use hyper::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use hyper::{Body, Request, StatusCode, Uri};
use scene_prompts::ResponseSchema;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use crate::http_client::{HyperClient, build_https_client};
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, ContentPart, GenerationOutput,
    GenerationRequest, ModelAdapter,
};

/// Primary credential variable.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Public endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini adapter.
#[derive(Clone)]
pub struct GeminiConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_temperature", &self.default_temperature)
            .finish()
    }
}

impl GeminiConfig {
    /// Creates a configuration using the supplied model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(60),
            default_temperature: None,
        }
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the default sampling temperature used when requests omit it.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supplies an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns the configured model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Gemini adapter calling `models/{model}:generateContent` over HTTPS.
pub struct GeminiAdapter {
    client: HyperClient,
    endpoint: Uri,
    metadata: AdapterMetadata,
    api_key: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiAdapter {
    /// Constructs a new adapter with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the API key is missing or
    /// the model identifier does not form a valid endpoint.
    pub fn new(config: GeminiConfig) -> AdapterResult<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AdapterError::configuration("Gemini adapter requires an API key"))?;

        let model = config.model.trim();
        if model.is_empty() {
            return Err(AdapterError::configuration("Gemini model identifier is empty"));
        }

        let endpoint = format!(
            "{}v1beta/models/{model}:generateContent",
            config.base_url
        )
        .parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("invalid Gemini endpoint: {err}")))?;

        Ok(Self {
            client: build_https_client(),
            endpoint,
            metadata: AdapterMetadata::new("gemini", model),
            api_key,
            timeout: config.timeout,
            default_temperature: config.default_temperature,
        })
    }

    fn build_request<'a>(&self, request: &'a GenerationRequest) -> GenerateContentRequest<'a> {
        let system_instruction = request.system_prompt().map(|prompt| SystemInstruction {
            parts: vec![Part::text(prompt)],
        });

        let contents = vec![Content {
            role: "user",
            parts: request.parts().iter().map(Part::from_content).collect(),
        }];

        let temperature = request.temperature().or(self.default_temperature);
        let generation_config = if temperature.is_some()
            || request.max_output_tokens().is_some()
            || request.response_mime_type().is_some()
        {
            Some(GenerationConfig {
                temperature,
                max_output_tokens: request.max_output_tokens(),
                response_mime_type: request.response_mime_type(),
                response_schema: request.response_schema(),
            })
        } else {
            None
        };

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config,
        }
    }
}

#[async_trait]
impl ModelAdapter for GeminiAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn generate(&self, request: GenerationRequest) -> AdapterResult<GenerationOutput> {
        let payload = self.build_request(&request);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode Gemini request: {err}"))
        })?;

        let req = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .body(Body::from(body))
            .map_err(|err| {
                AdapterError::transport(format!("failed to build Gemini request: {err}"))
            })?;

        debug!(model = self.metadata.model(), parts = request.parts().len(), "sending Gemini request");

        let response = timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| AdapterError::transport("Gemini request timed out"))?
            .map_err(|err| AdapterError::transport(format!("Gemini request failed: {err}")))?;

        let status = response.status();
        let retry_after = retry_after(response.headers());
        let bytes = timeout(self.timeout, to_bytes(response.into_body()))
            .await
            .map_err(|_| AdapterError::transport("Gemini response timed out"))?
            .map_err(|err| {
                AdapterError::transport(format!("failed to read Gemini response: {err}"))
            })?;

        parse_response(status, retry_after, &bytes)
    }
}

/// Interprets a raw `generateContent` reply.
fn parse_response(
    status: StatusCode,
    retry_after: Option<Duration>,
    bytes: &[u8],
) -> AdapterResult<GenerationOutput> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AdapterError::RateLimited { retry_after });
    }

    if !status.is_success() {
        let reason = String::from_utf8_lossy(bytes);
        return Err(AdapterError::response(format!(
            "Gemini returned {status}: {reason}"
        )));
    }

    let response: GenerateContentResponse = serde_json::from_slice(bytes)
        .map_err(|err| AdapterError::response(format!("failed to decode Gemini response: {err}")))?;

    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(AdapterError::response(format!(
            "Gemini blocked the prompt: {reason}"
        )));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(AdapterError::response("Gemini returned no candidates"));
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(GenerationOutput {
        text,
        finish_reason: candidate.finish_reason,
    })
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

impl<'a> Part<'a> {
    const fn text(text: &'a str) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn from_content(part: &'a ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Self::text(text),
            ContentPart::InlineData { mime_type, data } => Self {
                text: None,
                inline_data: Some(InlineData { mime_type, data }),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a ResponseSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn sanitize_base_url(input: &str) -> AdapterResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AdapterError::configuration(
            "Gemini base URL must start with http:// or https://",
        ));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("invalid Gemini base URL: {err}")))?;
    Ok(base)
}
