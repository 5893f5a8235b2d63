//! Pure wizard reducer: `(state, event) -> (state, effect)`.
//!
//! The reducer never performs I/O. Transitions that need the prompt service
//! return an [`Effect`] tagged with a fresh [`RequestToken`]; the caller runs
//! it and feeds the result back as [`WizardEvent::Resolved`]. Only the
//! resolution carrying the outstanding token is applied, so a reply that
//! arrives after the user navigated away or reset is dropped. A summary
//! superseded by the image prompt request is the exception: it still fills
//! in the script summary when it lands.

use scene_primitives::{
    ImagePrompt, JsonPromptRecord, RequestToken, SceneCount, StyleImage, VideoPrompt,
};
use thiserror::Error;
use tracing::debug;

use crate::state::{CallKind, PendingRequest, WizardState, WizardStep};

/// Placeholder summary stored when script analysis fails.
pub const SUMMARY_FALLBACK: &str = "Analysis failed. Please proceed.";
/// Error shown when script analysis fails.
pub const SUMMARY_ERROR: &str = "Could not analyze script. Please try again.";
/// Error shown when image prompt generation fails.
pub const IMAGE_PROMPTS_ERROR: &str =
    "Failed to generate prompts. Please check your inputs and try again.";
/// Error shown when video prompt generation fails.
pub const VIDEO_PROMPTS_ERROR: &str = "Failed to generate video prompts.";
/// Error shown when structured record generation fails.
pub const JSON_PROMPTS_ERROR: &str = "Failed to generate JSON prompts.";

/// Result alias for reducer operations.
pub type WizardResult<T> = Result<T, WizardError>;

/// Inputs accepted by the wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// Script text entered on the first step.
    SubmitScript(String),
    /// Live scene count edit on the pacing step.
    SetSceneCount(SceneCount),
    /// Pacing confirmed with the given scene count.
    SubmitPacing(SceneCount),
    /// Style description and/or reference image confirmed.
    SubmitStyle {
        /// Free-form style text, possibly empty.
        style: String,
        /// Optional reference image.
        image: Option<StyleImage>,
    },
    /// Ask for one video prompt per image prompt.
    RequestVideoPrompts,
    /// Ask for structured records of the joined scenes.
    RequestJsonPrompts,
    /// Navigate to an earlier, non-loading step.
    GoBack(WizardStep),
    /// Discard everything and start over.
    Reset,
    /// Completion of a previously issued effect.
    Resolved {
        /// Token the effect was issued with.
        token: RequestToken,
        /// Service result.
        outcome: CallOutcome,
    },
}

impl WizardEvent {
    /// Short stable name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitScript(_) => "submit-script",
            Self::SetSceneCount(_) => "set-scene-count",
            Self::SubmitPacing(_) => "submit-pacing",
            Self::SubmitStyle { .. } => "submit-style",
            Self::RequestVideoPrompts => "request-video-prompts",
            Self::RequestJsonPrompts => "request-json-prompts",
            Self::GoBack(_) => "go-back",
            Self::Reset => "reset",
            Self::Resolved { .. } => "resolved",
        }
    }
}

/// Result of one prompt service call. Failures carry a diagnostic string for
/// logging; the user-facing message is fixed per call kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// Script summary.
    Summary(Result<String, String>),
    /// Image prompts.
    ImagePrompts(Result<Vec<ImagePrompt>, String>),
    /// Video prompts.
    VideoPrompts(Result<Vec<VideoPrompt>, String>),
    /// Structured records.
    JsonPrompts(Result<Vec<JsonPromptRecord>, String>),
}

impl CallOutcome {
    /// Kind of call that produced this outcome.
    #[must_use]
    pub const fn kind(&self) -> CallKind {
        match self {
            Self::Summary(_) => CallKind::Summary,
            Self::ImagePrompts(_) => CallKind::ImagePrompts,
            Self::VideoPrompts(_) => CallKind::VideoPrompts,
            Self::JsonPrompts(_) => CallKind::JsonPrompts,
        }
    }

    /// Returns `true` if the call failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        match self {
            Self::Summary(result) => result.is_err(),
            Self::ImagePrompts(result) => result.is_err(),
            Self::VideoPrompts(result) => result.is_err(),
            Self::JsonPrompts(result) => result.is_err(),
        }
    }
}

/// Service call requested by a transition, with the inputs captured at the
/// time the transition was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    /// Summarise the script.
    Summarize {
        /// Trimmed script.
        script: String,
    },
    /// Generate image prompts.
    ImagePrompts {
        /// Trimmed script.
        script: String,
        /// Requested scene count.
        scene_count: SceneCount,
        /// Style text.
        style: String,
        /// Optional reference image.
        image: Option<StyleImage>,
    },
    /// Generate video prompts.
    VideoPrompts {
        /// Image prompts to animate.
        image_prompts: Vec<ImagePrompt>,
    },
    /// Generate structured records.
    JsonPrompts {
        /// Image prompts.
        image_prompts: Vec<ImagePrompt>,
        /// Video prompts.
        video_prompts: Vec<VideoPrompt>,
    },
}

impl ServiceCall {
    /// Kind of this call.
    #[must_use]
    pub const fn kind(&self) -> CallKind {
        match self {
            Self::Summarize { .. } => CallKind::Summary,
            Self::ImagePrompts { .. } => CallKind::ImagePrompts,
            Self::VideoPrompts { .. } => CallKind::VideoPrompts,
            Self::JsonPrompts { .. } => CallKind::JsonPrompts,
        }
    }
}

/// A service call tagged with the token its resolution must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    /// Token identifying this request.
    pub token: RequestToken,
    /// Call to perform.
    pub call: ServiceCall,
}

/// Output of [`WizardState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Next state.
    pub state: WizardState,
    /// Service call to run, if any.
    pub effect: Option<Effect>,
}

impl Transition {
    const fn settled(state: WizardState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

/// Errors returned by the reducer. The state is never modified on error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// Script text was empty after trimming.
    #[error("script must not be empty")]
    EmptyScript,

    /// Neither style text nor a reference image was provided.
    #[error("a style description or reference image is required")]
    MissingStyle,

    /// Event is not accepted in the current step.
    #[error("invalid wizard transition from {from} via {event}")]
    InvalidTransition {
        /// Step the event was applied to.
        from: WizardStep,
        /// Name of the rejected event.
        event: &'static str,
    },

    /// Back navigation target is a loading step or lies ahead.
    #[error("cannot go back from {from} to {to}")]
    InvalidBackTarget {
        /// Current step.
        from: WizardStep,
        /// Requested target.
        to: WizardStep,
    },

    /// A resolution for the outstanding token carried the wrong call kind.
    #[error("resolution for {token} carried {found:?}, expected {expected:?}")]
    OutcomeMismatch {
        /// Outstanding token.
        token: RequestToken,
        /// Kind the token was issued for.
        expected: CallKind,
        /// Kind carried by the resolution.
        found: CallKind,
    },
}

impl WizardState {
    /// Applies `event`, returning the next state and any effect to run.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError`] when the event is not valid for the current
    /// step or its payload fails validation.
    pub fn apply(&self, event: WizardEvent) -> WizardResult<Transition> {
        let name = event.name();
        let transition = match (self.step, event) {
            (_, WizardEvent::Reset) => Transition::settled(Self::initial(self.last_token)),
            (_, WizardEvent::Resolved { token, outcome }) => self.resolve(token, outcome)?,
            (_, WizardEvent::GoBack(target)) => self.go_back(target)?,
            (WizardStep::ScriptInput, WizardEvent::SubmitScript(script)) => {
                self.submit_script(&script)?
            }
            (WizardStep::ScenePacing, WizardEvent::SetSceneCount(count)) => {
                let mut next = self.clone();
                next.scene_count = count;
                Transition::settled(next)
            }
            (WizardStep::ScenePacing, WizardEvent::SubmitPacing(count)) => {
                let mut next = self.clone();
                next.scene_count = count;
                next.error = None;
                next.step = WizardStep::StyleInput;
                Transition::settled(next)
            }
            (WizardStep::StyleInput, WizardEvent::SubmitStyle { style, image }) => {
                self.submit_style(&style, image)?
            }
            (WizardStep::ImagePromptsResults, WizardEvent::RequestVideoPrompts) => {
                match self.image_prompts.clone() {
                    Some(image_prompts) => self.issue(
                        WizardStep::VideoPromptsLoading,
                        ServiceCall::VideoPrompts { image_prompts },
                    ),
                    None => Transition::settled(self.clone()),
                }
            }
            (WizardStep::VideoPromptsResults, WizardEvent::RequestJsonPrompts) => {
                match (self.image_prompts.clone(), self.video_prompts.clone()) {
                    (Some(image_prompts), Some(video_prompts)) => self.issue(
                        WizardStep::JsonPromptsLoading,
                        ServiceCall::JsonPrompts {
                            image_prompts,
                            video_prompts,
                        },
                    ),
                    _ => Transition::settled(self.clone()),
                }
            }
            (from, _) => {
                return Err(WizardError::InvalidTransition { from, event: name });
            }
        };

        if transition.state.step != self.step {
            debug!(
                from = %self.step,
                to = %transition.state.step,
                event = name,
                token = ?transition.effect.as_ref().map(|effect| effect.token),
                "wizard transition"
            );
        }

        Ok(transition)
    }

    fn submit_script(&self, script: &str) -> WizardResult<Transition> {
        let script = script.trim();
        if script.is_empty() {
            return Err(WizardError::EmptyScript);
        }

        let mut next = self.clone();
        next.script = script.to_owned();
        next.error = None;
        Ok(next.issue(
            WizardStep::ScenePacing,
            ServiceCall::Summarize {
                script: script.to_owned(),
            },
        ))
    }

    fn submit_style(&self, style: &str, image: Option<StyleImage>) -> WizardResult<Transition> {
        let style = style.trim();
        if style.is_empty() && image.is_none() {
            return Err(WizardError::MissingStyle);
        }

        let mut next = self.clone();
        next.image_style = style.to_owned();
        next.style_image.clone_from(&image);
        next.error = None;
        let call = ServiceCall::ImagePrompts {
            script: next.script.clone(),
            scene_count: next.scene_count,
            style: style.to_owned(),
            image,
        };
        Ok(next.issue(WizardStep::Loading, call))
    }

    /// Enters `step` and records `call` as the single outstanding request.
    fn issue(&self, step: WizardStep, call: ServiceCall) -> Transition {
        let token = self.last_token.next();
        let mut next = self.clone();
        next.step = step;
        next.error = None;
        next.last_token = token;
        next.late_summary = match self.pending {
            _ if call.kind() == CallKind::Summary => None,
            Some(pending) if pending.kind == CallKind::Summary => Some(pending.token),
            _ => self.late_summary,
        };
        next.pending = Some(PendingRequest {
            token,
            kind: call.kind(),
            issued_at: step,
        });
        Transition {
            state: next,
            effect: Some(Effect { token, call }),
        }
    }

    fn go_back(&self, target: WizardStep) -> WizardResult<Transition> {
        if target.is_loading() || target > self.step {
            return Err(WizardError::InvalidBackTarget {
                from: self.step,
                to: target,
            });
        }

        let mut next = self.clone();
        next.step = target;
        next.error = None;
        if let Some(pending) = self.pending {
            if target < pending.issued_at {
                debug!(token = %pending.token, kind = ?pending.kind, "abandoning request");
                next.pending = None;
            }
        }
        if target < WizardStep::ScenePacing {
            next.late_summary = None;
        }
        Ok(Transition::settled(next))
    }

    fn resolve(&self, token: RequestToken, outcome: CallOutcome) -> WizardResult<Transition> {
        if self.late_summary == Some(token) {
            return self.resolve_late_summary(token, outcome);
        }

        let Some(pending) = self.pending.filter(|pending| pending.token == token) else {
            debug!(
                %token,
                outstanding = ?self.pending.map(|pending| pending.token),
                "discarding stale resolution"
            );
            return Ok(Transition::settled(self.clone()));
        };

        if pending.kind != outcome.kind() {
            return Err(WizardError::OutcomeMismatch {
                token,
                expected: pending.kind,
                found: outcome.kind(),
            });
        }

        let mut next = self.clone();
        next.pending = None;
        match outcome {
            CallOutcome::Summary(Ok(summary)) => next.script_summary = summary,
            CallOutcome::Summary(Err(_)) => {
                next.script_summary = SUMMARY_FALLBACK.to_owned();
                next.error = Some(SUMMARY_ERROR.to_owned());
            }
            CallOutcome::ImagePrompts(Ok(prompts)) => {
                next.image_prompts = Some(prompts);
                next.step = WizardStep::ImagePromptsResults;
            }
            CallOutcome::ImagePrompts(Err(_)) => {
                next.error = Some(IMAGE_PROMPTS_ERROR.to_owned());
                next.step = WizardStep::StyleInput;
            }
            CallOutcome::VideoPrompts(Ok(prompts)) => {
                next.video_prompts = Some(prompts);
                next.step = WizardStep::VideoPromptsResults;
            }
            CallOutcome::VideoPrompts(Err(_)) => {
                next.error = Some(VIDEO_PROMPTS_ERROR.to_owned());
                next.step = WizardStep::ImagePromptsResults;
            }
            CallOutcome::JsonPrompts(Ok(records)) => {
                next.json_prompts = Some(records);
                next.step = WizardStep::JsonPromptsResults;
            }
            CallOutcome::JsonPrompts(Err(_)) => {
                next.error = Some(JSON_PROMPTS_ERROR.to_owned());
                next.step = WizardStep::VideoPromptsResults;
            }
        }
        Ok(Transition::settled(next))
    }

    /// Stores a summary that arrived after a later request was issued. The
    /// step, the outstanding request and the error banner belong to that
    /// later request and stay as they are.
    fn resolve_late_summary(
        &self,
        token: RequestToken,
        outcome: CallOutcome,
    ) -> WizardResult<Transition> {
        let summary = match outcome {
            CallOutcome::Summary(summary) => summary,
            other => {
                return Err(WizardError::OutcomeMismatch {
                    token,
                    expected: CallKind::Summary,
                    found: other.kind(),
                });
            }
        };

        let mut next = self.clone();
        next.late_summary = None;
        next.script_summary = summary.unwrap_or_else(|_| SUMMARY_FALLBACK.to_owned());
        debug!(%token, "late summary stored");
        Ok(Transition::settled(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(state: &WizardState, event: WizardEvent) -> Transition {
        state.apply(event).expect("transition accepted")
    }

    fn pending_effect(transition: &Transition) -> Effect {
        transition.effect.clone().expect("effect issued")
    }

    fn on_pacing() -> WizardState {
        let submitted = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("A lone astronaut drifts.".into()),
        );
        let token = pending_effect(&submitted).token;
        step(
            &submitted.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::Summary(Ok("Isolation in space.".into())),
            },
        )
        .state
    }

    fn on_image_results() -> WizardState {
        let pacing = step(&on_pacing(), WizardEvent::SubmitPacing(SceneCount::new(2).unwrap()));
        let loading = step(
            &pacing.state,
            WizardEvent::SubmitStyle {
                style: "noir".into(),
                image: None,
            },
        );
        let token = pending_effect(&loading).token;
        step(
            &loading.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::ImagePrompts(Ok(vec![
                    ImagePrompt::new(1, "a"),
                    ImagePrompt::new(2, "b"),
                ])),
            },
        )
        .state
    }

    #[test]
    fn submit_script_trims_and_issues_summary() {
        let transition = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("  hello world \n".into()),
        );
        assert_eq!(transition.state.step(), WizardStep::ScenePacing);
        assert_eq!(transition.state.script(), "hello world");
        assert!(transition.state.is_loading());
        assert_eq!(
            transition.effect,
            Some(Effect {
                token: RequestToken::ZERO.next(),
                call: ServiceCall::Summarize {
                    script: "hello world".into()
                },
            })
        );
    }

    #[test]
    fn empty_script_is_rejected() {
        let err = WizardState::default()
            .apply(WizardEvent::SubmitScript(" \t\n".into()))
            .unwrap_err();
        assert_eq!(err, WizardError::EmptyScript);
    }

    #[test]
    fn summary_failure_keeps_step_and_sets_fallback() {
        let submitted = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("script".into()),
        );
        let token = pending_effect(&submitted).token;
        let failed = step(
            &submitted.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::Summary(Err("timeout".into())),
            },
        );
        assert_eq!(failed.state.step(), WizardStep::ScenePacing);
        assert_eq!(failed.state.script_summary(), SUMMARY_FALLBACK);
        assert_eq!(failed.state.error(), Some(SUMMARY_ERROR));
        assert!(!failed.state.is_loading());
    }

    #[test]
    fn pacing_updates_count_and_clears_error() {
        let state = on_pacing();
        let live = step(&state, WizardEvent::SetSceneCount(SceneCount::new(7).unwrap()));
        assert_eq!(live.state.scene_count().get(), 7);
        assert_eq!(live.state.step(), WizardStep::ScenePacing);

        let confirmed = step(&live.state, WizardEvent::SubmitPacing(SceneCount::new(5).unwrap()));
        assert_eq!(confirmed.state.step(), WizardStep::StyleInput);
        assert_eq!(confirmed.state.scene_count().get(), 5);
        assert!(confirmed.effect.is_none());
    }

    #[test]
    fn style_requires_text_or_image() {
        let style = step(&on_pacing(), WizardEvent::SubmitPacing(SceneCount::DEFAULT)).state;
        let err = style
            .apply(WizardEvent::SubmitStyle {
                style: "   ".into(),
                image: None,
            })
            .unwrap_err();
        assert_eq!(err, WizardError::MissingStyle);

        let image = StyleImage::new("aGk=", "image/png").unwrap();
        let transition = step(
            &style,
            WizardEvent::SubmitStyle {
                style: String::new(),
                image: Some(image.clone()),
            },
        );
        assert_eq!(transition.state.step(), WizardStep::Loading);
        assert_eq!(transition.state.style_image(), Some(&image));
        match pending_effect(&transition).call {
            ServiceCall::ImagePrompts {
                scene_count, image: sent, ..
            } => {
                assert_eq!(scene_count, SceneCount::DEFAULT);
                assert_eq!(sent, Some(image));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn image_failure_returns_to_style_input() {
        let style = step(&on_pacing(), WizardEvent::SubmitPacing(SceneCount::DEFAULT)).state;
        let loading = step(
            &style,
            WizardEvent::SubmitStyle {
                style: "noir".into(),
                image: None,
            },
        );
        let token = pending_effect(&loading).token;
        let failed = step(
            &loading.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::ImagePrompts(Err("bad json".into())),
            },
        );
        assert_eq!(failed.state.step(), WizardStep::StyleInput);
        assert_eq!(failed.state.error(), Some(IMAGE_PROMPTS_ERROR));
        assert!(failed.state.image_prompts().is_none());
    }

    #[test]
    fn video_then_json_flow() {
        let results = on_image_results();
        let video = step(&results, WizardEvent::RequestVideoPrompts);
        assert_eq!(video.state.step(), WizardStep::VideoPromptsLoading);
        let token = pending_effect(&video).token;
        let done = step(
            &video.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::VideoPrompts(Ok(vec![VideoPrompt::new(1, "pan")])),
            },
        );
        assert_eq!(done.state.step(), WizardStep::VideoPromptsResults);

        let json = step(&done.state, WizardEvent::RequestJsonPrompts);
        assert_eq!(json.state.step(), WizardStep::JsonPromptsLoading);
        let token = pending_effect(&json).token;
        let failed = step(
            &json.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::JsonPrompts(Err("schema".into())),
            },
        );
        assert_eq!(failed.state.step(), WizardStep::VideoPromptsResults);
        assert_eq!(failed.state.error(), Some(JSON_PROMPTS_ERROR));
    }

    #[test]
    fn video_failure_returns_to_image_results() {
        let video = step(&on_image_results(), WizardEvent::RequestVideoPrompts);
        let token = pending_effect(&video).token;
        let failed = step(
            &video.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::VideoPrompts(Err("429".into())),
            },
        );
        assert_eq!(failed.state.step(), WizardStep::ImagePromptsResults);
        assert_eq!(failed.state.error(), Some(VIDEO_PROMPTS_ERROR));
    }

    #[test]
    fn events_outside_their_step_are_rejected() {
        let state = WizardState::default();
        let err = state.apply(WizardEvent::RequestVideoPrompts).unwrap_err();
        assert_eq!(
            err,
            WizardError::InvalidTransition {
                from: WizardStep::ScriptInput,
                event: "request-video-prompts",
            }
        );
        assert!(state.apply(WizardEvent::SubmitPacing(SceneCount::DEFAULT)).is_err());
    }

    #[test]
    fn stale_resolution_is_ignored() {
        let submitted = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("script".into()),
        );
        let stale = step(
            &submitted.state,
            WizardEvent::Resolved {
                token: RequestToken::ZERO,
                outcome: CallOutcome::Summary(Ok("old".into())),
            },
        );
        assert_eq!(stale.state, submitted.state);
    }

    #[test]
    fn mismatched_outcome_is_an_error() {
        let submitted = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("script".into()),
        );
        let token = pending_effect(&submitted).token;
        let err = submitted
            .state
            .apply(WizardEvent::Resolved {
                token,
                outcome: CallOutcome::VideoPrompts(Ok(Vec::new())),
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::OutcomeMismatch { .. }));
    }

    #[test]
    fn go_back_rules() {
        let results = on_image_results();
        let err = results.apply(WizardEvent::GoBack(WizardStep::Loading)).unwrap_err();
        assert!(matches!(err, WizardError::InvalidBackTarget { .. }));
        let err = results
            .apply(WizardEvent::GoBack(WizardStep::JsonPromptsResults))
            .unwrap_err();
        assert!(matches!(err, WizardError::InvalidBackTarget { .. }));

        let back = step(&results, WizardEvent::GoBack(WizardStep::StyleInput));
        assert_eq!(back.state.step(), WizardStep::StyleInput);
        assert!(back.state.image_prompts().is_some());
    }

    #[test]
    fn go_back_before_issuing_step_abandons_request() {
        let loading = step(&on_image_results(), WizardEvent::RequestVideoPrompts);
        let token = pending_effect(&loading).token;
        let back = step(&loading.state, WizardEvent::GoBack(WizardStep::ImagePromptsResults));
        assert!(!back.state.is_loading());

        let late = step(
            &back.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::VideoPrompts(Ok(vec![VideoPrompt::new(1, "late")])),
            },
        );
        assert_eq!(late.state.step(), WizardStep::ImagePromptsResults);
        assert!(late.state.video_prompts().is_none());
    }

    #[test]
    fn summary_survives_moving_forward() {
        let submitted = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("script".into()),
        );
        let token = pending_effect(&submitted).token;
        let style = step(&submitted.state, WizardEvent::SubmitPacing(SceneCount::DEFAULT));
        assert!(style.state.is_loading());

        let resolved = step(
            &style.state,
            WizardEvent::Resolved {
                token,
                outcome: CallOutcome::Summary(Ok("theme".into())),
            },
        );
        assert_eq!(resolved.state.step(), WizardStep::StyleInput);
        assert_eq!(resolved.state.script_summary(), "theme");
    }

    #[test]
    fn summary_arriving_after_style_submission_is_kept() {
        let submitted = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("script".into()),
        );
        let summary_token = pending_effect(&submitted).token;
        let style = step(&submitted.state, WizardEvent::SubmitPacing(SceneCount::DEFAULT));
        let loading = step(
            &style.state,
            WizardEvent::SubmitStyle {
                style: "ink".into(),
                image: None,
            },
        );
        let image_token = pending_effect(&loading).token;
        assert!(loading.state.awaits(summary_token));
        assert!(loading.state.awaits(image_token));

        let resolved = step(
            &loading.state,
            WizardEvent::Resolved {
                token: summary_token,
                outcome: CallOutcome::Summary(Ok("theme".into())),
            },
        );
        assert_eq!(resolved.state.script_summary(), "theme");
        assert_eq!(resolved.state.step(), WizardStep::Loading);
        assert_eq!(resolved.state.pending_token(), Some(image_token));
        assert!(!resolved.state.awaits(summary_token));

        let again = step(
            &resolved.state,
            WizardEvent::Resolved {
                token: summary_token,
                outcome: CallOutcome::Summary(Ok("other".into())),
            },
        );
        assert_eq!(again.state.script_summary(), "theme");
    }

    #[test]
    fn late_summary_failure_uses_fallback_without_banner() {
        let submitted = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("script".into()),
        );
        let summary_token = pending_effect(&submitted).token;
        let style = step(&submitted.state, WizardEvent::SubmitPacing(SceneCount::DEFAULT));
        let loading = step(
            &style.state,
            WizardEvent::SubmitStyle {
                style: "ink".into(),
                image: None,
            },
        );

        let resolved = step(
            &loading.state,
            WizardEvent::Resolved {
                token: summary_token,
                outcome: CallOutcome::Summary(Err("boom".into())),
            },
        );
        assert_eq!(resolved.state.script_summary(), SUMMARY_FALLBACK);
        assert_eq!(resolved.state.error(), None);

        let err = loading
            .state
            .apply(WizardEvent::Resolved {
                token: summary_token,
                outcome: CallOutcome::ImagePrompts(Ok(Vec::new())),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            WizardError::OutcomeMismatch {
                expected: CallKind::Summary,
                ..
            }
        ));
    }

    #[test]
    fn late_summary_is_dropped_when_returning_to_script() {
        let submitted = step(
            &WizardState::default(),
            WizardEvent::SubmitScript("script".into()),
        );
        let summary_token = pending_effect(&submitted).token;
        let style = step(&submitted.state, WizardEvent::SubmitPacing(SceneCount::DEFAULT));
        let loading = step(
            &style.state,
            WizardEvent::SubmitStyle {
                style: "ink".into(),
                image: None,
            },
        );
        let back = step(&loading.state, WizardEvent::GoBack(WizardStep::ScriptInput));
        assert!(!back.state.awaits(summary_token));

        let resolved = step(
            &back.state,
            WizardEvent::Resolved {
                token: summary_token,
                outcome: CallOutcome::Summary(Ok("theme".into())),
            },
        );
        assert_eq!(resolved.state.script_summary(), "");
    }

    #[test]
    fn reset_keeps_token_counter() {
        let results = on_image_results();
        let last = results.last_token();
        let reset = step(&results, WizardEvent::Reset);
        assert!(reset.state.is_initial());
        assert_eq!(reset.state.last_token(), last);

        let again = step(&reset.state, WizardEvent::SubmitScript("next".into()));
        assert!(pending_effect(&again).token > last);
    }
}
