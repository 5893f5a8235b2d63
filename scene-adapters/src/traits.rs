//! Shared model adapter traits and data structures.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use scene_prompts::ResponseSchema;
use thiserror::Error;

/// Result alias used by model adapters.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// MIME type requesting a JSON-encoded reply.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Error type shared by adapter implementations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Adapter is misconfigured or missing credentials.
    #[error("adapter not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// The supplied request was invalid for the target model.
    #[error("invalid generation request: {reason}")]
    InvalidRequest {
        /// Reason describing why the request could not be processed.
        reason: String,
    },

    /// Transport-level failures (network, TLS, timeout).
    #[error("adapter transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The provider rejected the request due to rate limiting.
    #[error("adapter rate limited (retry after {retry_after:?})")]
    RateLimited {
        /// Suggested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// The provider returned an error status or a malformed envelope.
    #[error("adapter response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },
}

impl AdapterError {
    /// Convenience constructor for invalid requests.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for response failures.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Minimal metadata describing a model adapter instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterMetadata {
    provider: &'static str,
    model: String,
}

impl AdapterMetadata {
    /// Creates metadata for the supplied provider and model identifier.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the provider identifier (e.g., "gemini").
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// One piece of request content.
#[derive(Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain instruction text.
    Text(String),
    /// Binary payload sent inline, base64-encoded.
    InlineData {
        /// MIME type of the payload, e.g. `image/png`.
        mime_type: String,
        /// Base64-encoded bytes.
        data: String,
    },
}

impl ContentPart {
    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates an inline data part from an already encoded payload.
    #[must_use]
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Returns the text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::InlineData { .. } => None,
        }
    }
}

impl fmt::Debug for ContentPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::InlineData { mime_type, data } => f
                .debug_struct("InlineData")
                .field("mime_type", mime_type)
                .field("encoded_len", &data.len())
                .finish(),
        }
    }
}

/// Single-turn request submitted to a model adapter.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    system_prompt: Option<String>,
    parts: Vec<ContentPart>,
    max_output_tokens: Option<u32>,
    temperature: Option<f32>,
    response_mime_type: Option<String>,
    response_schema: Option<ResponseSchema>,
}

impl GenerationRequest {
    /// Creates a request carrying the supplied content parts.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidRequest`] if the part list is empty.
    pub fn new(parts: Vec<ContentPart>) -> AdapterResult<Self> {
        if parts.is_empty() {
            return Err(AdapterError::invalid_request(
                "generation request requires at least one content part",
            ));
        }

        Ok(Self {
            system_prompt: None,
            parts,
            max_output_tokens: None,
            temperature: None,
            response_mime_type: None,
            response_schema: None,
        })
    }

    /// Creates a request with a single text part.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            parts: vec![ContentPart::text(text)],
            max_output_tokens: None,
            temperature: None,
            response_mime_type: None,
            response_schema: None,
        }
    }

    /// Sets the system prompt that guides model behaviour.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum output token budget.
    #[must_use]
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Requests a JSON reply conforming to `schema`.
    #[must_use]
    pub fn with_json_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_mime_type = Some(JSON_MIME_TYPE.to_owned());
        self.response_schema = Some(schema);
        self
    }

    /// Returns the system prompt if configured.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Returns the content parts in order.
    #[must_use]
    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    /// Returns the configured maximum output tokens.
    #[must_use]
    pub const fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }

    /// Returns the configured sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Returns the requested reply MIME type, if any.
    #[must_use]
    pub fn response_mime_type(&self) -> Option<&str> {
        self.response_mime_type.as_deref()
    }

    /// Returns the requested reply schema, if any.
    #[must_use]
    pub const fn response_schema(&self) -> Option<&ResponseSchema> {
        self.response_schema.as_ref()
    }
}

/// Reply produced by a model adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationOutput {
    /// Concatenated text of the reply.
    pub text: String,
    /// Provider-specific reason the generation stopped, when reported.
    pub finish_reason: Option<String>,
}

impl GenerationOutput {
    /// Creates an output with no finish reason.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
        }
    }
}

/// Trait implemented by all model adapters.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Returns basic metadata describing the adapter instance.
    fn metadata(&self) -> &AdapterMetadata;

    /// Executes one generation round trip.
    async fn generate(&self, request: GenerationRequest) -> AdapterResult<GenerationOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_request_parts() {
        let err = GenerationRequest::new(Vec::new()).expect_err("parts required");
        assert!(matches!(err, AdapterError::InvalidRequest { .. }));
    }

    #[test]
    fn builds_request() {
        let request = GenerationRequest::new(vec![
            ContentPart::text("describe the style"),
            ContentPart::inline_data("image/png", "aGk="),
        ])
        .unwrap()
        .with_max_output_tokens(256)
        .with_temperature(0.7)
        .with_json_schema(ResponseSchema::image_prompts());

        assert_eq!(request.parts().len(), 2);
        assert_eq!(request.parts()[0].as_text(), Some("describe the style"));
        assert_eq!(request.max_output_tokens(), Some(256));
        assert_eq!(request.temperature(), Some(0.7));
        assert_eq!(request.response_mime_type(), Some(JSON_MIME_TYPE));
        assert!(request.response_schema().is_some());
    }

    #[test]
    fn inline_data_debug_hides_payload() {
        let part = ContentPart::inline_data("image/png", "c2VjcmV0");
        let rendered = format!("{part:?}");
        assert!(rendered.contains("image/png"));
        assert!(!rendered.contains("c2VjcmV0"));
    }
}
