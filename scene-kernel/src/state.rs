//! Wizard steps and the single per-session state value.

use std::fmt;

use scene_primitives::{
    ImagePrompt, JsonPromptRecord, RequestToken, SceneCount, StyleImage, VideoPrompt,
};

/// Named stages of the wizard, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    /// Initial stage: the user provides the script.
    ScriptInput,
    /// Script summary is shown and the scene count is chosen.
    ScenePacing,
    /// Style text and/or reference image are collected.
    StyleInput,
    /// Image prompts are being generated.
    Loading,
    /// Image prompts are shown.
    ImagePromptsResults,
    /// Video prompts are being generated.
    VideoPromptsLoading,
    /// Image and video prompts are shown.
    VideoPromptsResults,
    /// Structured records are being generated.
    JsonPromptsLoading,
    /// Structured records are shown. No forward transition exists.
    JsonPromptsResults,
}

impl WizardStep {
    /// Every step, in order.
    pub const ALL: [Self; 9] = [
        Self::ScriptInput,
        Self::ScenePacing,
        Self::StyleInput,
        Self::Loading,
        Self::ImagePromptsResults,
        Self::VideoPromptsLoading,
        Self::VideoPromptsResults,
        Self::JsonPromptsLoading,
        Self::JsonPromptsResults,
    ];

    /// Returns `true` for the stages that only wait on the prompt service.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(
            self,
            Self::Loading | Self::VideoPromptsLoading | Self::JsonPromptsLoading
        )
    }

    /// Returns `true` for the final stage.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::JsonPromptsResults)
    }

    /// Short stable name used in logs and the shell.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ScriptInput => "script-input",
            Self::ScenePacing => "scene-pacing",
            Self::StyleInput => "style-input",
            Self::Loading => "loading",
            Self::ImagePromptsResults => "image-prompts-results",
            Self::VideoPromptsLoading => "video-prompts-loading",
            Self::VideoPromptsResults => "video-prompts-results",
            Self::JsonPromptsLoading => "json-prompts-loading",
            Self::JsonPromptsResults => "json-prompts-results",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of prompt service call a request token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// One-sentence script summary.
    Summary,
    /// Image prompt generation.
    ImagePrompts,
    /// Video prompt generation.
    VideoPrompts,
    /// Structured record generation.
    JsonPrompts,
}

/// The outstanding service request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingRequest {
    pub(crate) token: RequestToken,
    pub(crate) kind: CallKind,
    /// Step entered when the request was issued; navigating before it
    /// abandons the request.
    pub(crate) issued_at: WizardStep,
}

/// All data collected and derived during one wizard session.
///
/// Values are replaced wholesale by [`WizardState::apply`](crate::WizardState::apply);
/// nothing outside the controller mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub(crate) step: WizardStep,
    pub(crate) script: String,
    pub(crate) script_summary: String,
    pub(crate) scene_count: SceneCount,
    pub(crate) image_style: String,
    pub(crate) style_image: Option<StyleImage>,
    pub(crate) image_prompts: Option<Vec<ImagePrompt>>,
    pub(crate) video_prompts: Option<Vec<VideoPrompt>>,
    pub(crate) json_prompts: Option<Vec<JsonPromptRecord>>,
    pub(crate) error: Option<String>,
    pub(crate) pending: Option<PendingRequest>,
    /// Summary request superseded by a later call; its result still fills
    /// `script_summary`.
    pub(crate) late_summary: Option<RequestToken>,
    pub(crate) last_token: RequestToken,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::initial(RequestToken::ZERO)
    }
}

impl WizardState {
    /// Initial snapshot; `last_token` carries the token counter across resets.
    pub(crate) fn initial(last_token: RequestToken) -> Self {
        Self {
            step: WizardStep::ScriptInput,
            script: String::new(),
            script_summary: String::new(),
            scene_count: SceneCount::DEFAULT,
            image_style: String::new(),
            style_image: None,
            image_prompts: None,
            video_prompts: None,
            json_prompts: None,
            error: None,
            pending: None,
            late_summary: None,
            last_token,
        }
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// Trimmed script text.
    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// One-sentence summary, or the fallback text after a failed analysis.
    #[must_use]
    pub fn script_summary(&self) -> &str {
        &self.script_summary
    }

    /// Number of scenes requested.
    #[must_use]
    pub const fn scene_count(&self) -> SceneCount {
        self.scene_count
    }

    /// Style description; empty when only an image was given.
    #[must_use]
    pub fn image_style(&self) -> &str {
        &self.image_style
    }

    /// Reference image, if one was submitted.
    #[must_use]
    pub const fn style_image(&self) -> Option<&StyleImage> {
        self.style_image.as_ref()
    }

    /// Generated image prompts.
    #[must_use]
    pub fn image_prompts(&self) -> Option<&[ImagePrompt]> {
        self.image_prompts.as_deref()
    }

    /// Generated video prompts.
    #[must_use]
    pub fn video_prompts(&self) -> Option<&[VideoPrompt]> {
        self.video_prompts.as_deref()
    }

    /// Generated structured records.
    #[must_use]
    pub fn json_prompts(&self) -> Option<&[JsonPromptRecord]> {
        self.json_prompts.as_deref()
    }

    /// User-facing error message from the last failed call.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a service request is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Token of the outstanding request.
    #[must_use]
    pub fn pending_token(&self) -> Option<RequestToken> {
        self.pending.map(|pending| pending.token)
    }

    /// Kind of the outstanding request.
    #[must_use]
    pub fn pending_call(&self) -> Option<CallKind> {
        self.pending.map(|pending| pending.kind)
    }

    /// Whether a resolution carrying `token` would still be applied.
    #[must_use]
    pub fn awaits(&self, token: RequestToken) -> bool {
        self.pending_token() == Some(token) || self.late_summary == Some(token)
    }

    /// Most recently issued token; never decreases, even across resets.
    #[must_use]
    pub const fn last_token(&self) -> RequestToken {
        self.last_token
    }

    /// Returns `true` when every field matches the initial snapshot, ignoring
    /// the token counter.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        *self == Self::initial(self.last_token)
    }
}
