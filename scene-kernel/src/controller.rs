//! Owns the wizard state for one session and runs the effects it requests.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use scene_primitives::{SceneCount, SessionId, StyleImage};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::service::{PromptService, ServiceError};
use crate::state::{WizardState, WizardStep};
use crate::wizard::{CallOutcome, Effect, ServiceCall, WizardEvent, WizardResult};

/// Session-scoped driver around the pure reducer.
///
/// [`dispatch`](Self::dispatch) applies an event synchronously and hands back
/// the effect to run; [`execute`](Self::execute) turns an effect into a future
/// resolving to the matching [`WizardEvent::Resolved`]. Callers that do not
/// need to interleave input with in-flight requests can use
/// [`drive`](Self::drive) instead.
pub struct WizardController {
    service: Arc<dyn PromptService>,
    state: WizardState,
    session_id: SessionId,
}

impl fmt::Debug for WizardController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("session_id", &self.session_id)
            .field("step", &self.state.step())
            .field("is_loading", &self.state.is_loading())
            .finish_non_exhaustive()
    }
}

impl WizardController {
    /// Creates a controller with a fresh session id and the initial state.
    #[must_use]
    pub fn new(service: Arc<dyn PromptService>) -> Self {
        Self::with_session_id(service, SessionId::random())
    }

    /// Creates a controller bound to `session_id`.
    #[must_use]
    pub fn with_session_id(service: Arc<dyn PromptService>, session_id: SessionId) -> Self {
        info!(%session_id, "wizard session started");
        Self {
            service,
            state: WizardState::default(),
            session_id,
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &WizardState {
        &self.state
    }

    /// Session identifier attached to every log line.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Applies `event` and returns the effect the caller must run, if any.
    ///
    /// # Errors
    ///
    /// Propagates [`WizardError`](crate::WizardError) from the reducer; the
    /// state is left untouched in that case.
    pub fn dispatch(&mut self, event: WizardEvent) -> WizardResult<Option<Effect>> {
        let transition = self.state.apply(event)?;
        self.state = transition.state;
        Ok(transition.effect)
    }

    /// Runs `effect` against the prompt service.
    ///
    /// The returned future owns everything it needs, so it can be polled
    /// alongside input handling. Failures are logged and folded into the
    /// resolution; the future itself never fails.
    #[must_use]
    pub fn execute(&self, effect: Effect) -> BoxFuture<'static, WizardEvent> {
        let service = Arc::clone(&self.service);
        let span = info_span!(
            "prompt_service",
            session_id = %self.session_id,
            token = %effect.token,
            call = ?effect.call.kind(),
        );
        run_effect(service, effect).instrument(span).boxed()
    }

    /// Applies `event` and runs every resulting effect to completion.
    ///
    /// # Errors
    ///
    /// Propagates reducer errors for `event` or for any resolution.
    pub async fn drive(&mut self, event: WizardEvent) -> WizardResult<()> {
        let mut effect = self.dispatch(event)?;
        while let Some(pending) = effect.take() {
            let resolved = self.execute(pending).await;
            effect = self.dispatch(resolved)?;
        }
        Ok(())
    }

    /// Submits the script typed on the first step.
    ///
    /// # Errors
    ///
    /// See [`WizardController::dispatch`].
    pub fn submit_script(&mut self, script: impl Into<String>) -> WizardResult<Option<Effect>> {
        self.dispatch(WizardEvent::SubmitScript(script.into()))
    }

    /// Updates the scene count without leaving the pacing step.
    ///
    /// # Errors
    ///
    /// See [`WizardController::dispatch`].
    pub fn set_scene_count(&mut self, count: SceneCount) -> WizardResult<Option<Effect>> {
        self.dispatch(WizardEvent::SetSceneCount(count))
    }

    /// Confirms pacing.
    ///
    /// # Errors
    ///
    /// See [`WizardController::dispatch`].
    pub fn submit_pacing(&mut self, count: SceneCount) -> WizardResult<Option<Effect>> {
        self.dispatch(WizardEvent::SubmitPacing(count))
    }

    /// Confirms the visual style and requests image prompts.
    ///
    /// # Errors
    ///
    /// See [`WizardController::dispatch`].
    pub fn submit_style(
        &mut self,
        style: impl Into<String>,
        image: Option<StyleImage>,
    ) -> WizardResult<Option<Effect>> {
        self.dispatch(WizardEvent::SubmitStyle {
            style: style.into(),
            image,
        })
    }

    /// Requests video prompts for the current image prompts.
    ///
    /// # Errors
    ///
    /// See [`WizardController::dispatch`].
    pub fn request_video_prompts(&mut self) -> WizardResult<Option<Effect>> {
        self.dispatch(WizardEvent::RequestVideoPrompts)
    }

    /// Requests structured records for the current prompts.
    ///
    /// # Errors
    ///
    /// See [`WizardController::dispatch`].
    pub fn request_json_prompts(&mut self) -> WizardResult<Option<Effect>> {
        self.dispatch(WizardEvent::RequestJsonPrompts)
    }

    /// Navigates back to `target`.
    ///
    /// # Errors
    ///
    /// See [`WizardController::dispatch`].
    pub fn go_back(&mut self, target: WizardStep) -> WizardResult<()> {
        self.dispatch(WizardEvent::GoBack(target)).map(drop)
    }

    /// Returns to the initial state, keeping the token counter.
    ///
    /// # Errors
    ///
    /// See [`WizardController::dispatch`].
    pub fn reset(&mut self) -> WizardResult<()> {
        self.dispatch(WizardEvent::Reset)?;
        debug!(session_id = %self.session_id, "wizard reset");
        Ok(())
    }
}

async fn run_effect(service: Arc<dyn PromptService>, effect: Effect) -> WizardEvent {
    let Effect { token, call } = effect;
    debug!("prompt service call started");

    let outcome = match call {
        ServiceCall::Summarize { script } => {
            CallOutcome::Summary(report(service.summarize(&script).await))
        }
        ServiceCall::ImagePrompts {
            script,
            scene_count,
            style,
            image,
        } => CallOutcome::ImagePrompts(report(
            service
                .generate_image_prompts(&script, scene_count, &style, image.as_ref())
                .await,
        )),
        ServiceCall::VideoPrompts { image_prompts } => CallOutcome::VideoPrompts(report(
            service.generate_video_prompts(&image_prompts).await,
        )),
        ServiceCall::JsonPrompts {
            image_prompts,
            video_prompts,
        } => CallOutcome::JsonPrompts(report(
            service
                .generate_json_prompts(&image_prompts, &video_prompts)
                .await,
        )),
    };

    WizardEvent::Resolved { token, outcome }
}

fn report<T>(result: Result<T, ServiceError>) -> Result<T, String> {
    match result {
        Ok(value) => {
            debug!("prompt service call succeeded");
            Ok(value)
        }
        Err(err) => {
            warn!(error = %err, "prompt service call failed");
            Err(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scene_primitives::{ImagePrompt, JsonPromptRecord, VideoPrompt};

    use crate::service::ServiceResult;

    struct EchoService;

    #[async_trait]
    impl PromptService for EchoService {
        async fn summarize(&self, script: &str) -> ServiceResult<String> {
            Ok(format!("about {script}"))
        }

        async fn generate_image_prompts(
            &self,
            _script: &str,
            scene_count: SceneCount,
            style: &str,
            _image: Option<&StyleImage>,
        ) -> ServiceResult<Vec<ImagePrompt>> {
            Ok((1..=scene_count.get())
                .map(|scene| ImagePrompt::new(scene, style))
                .collect())
        }

        async fn generate_video_prompts(
            &self,
            _image_prompts: &[ImagePrompt],
        ) -> ServiceResult<Vec<VideoPrompt>> {
            Err(ServiceError::EmptyResponse)
        }

        async fn generate_json_prompts(
            &self,
            _image_prompts: &[ImagePrompt],
            _video_prompts: &[VideoPrompt],
        ) -> ServiceResult<Vec<JsonPromptRecord>> {
            Ok(Vec::new())
        }
    }

    fn controller() -> WizardController {
        WizardController::new(Arc::new(EchoService))
    }

    #[tokio::test]
    async fn drive_runs_effects_to_completion() {
        let mut controller = controller();
        controller
            .drive(WizardEvent::SubmitScript("the sea".into()))
            .await
            .unwrap();
        assert_eq!(controller.state().step(), WizardStep::ScenePacing);
        assert_eq!(controller.state().script_summary(), "about the sea");
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn execute_folds_failures_into_resolution() {
        let mut controller = controller();
        controller
            .drive(WizardEvent::SubmitScript("s".into()))
            .await
            .unwrap();
        controller.submit_pacing(SceneCount::new(2).unwrap()).unwrap();
        let effect = controller.submit_style("ink", None).unwrap().unwrap();
        let resolved = controller.execute(effect).await;
        controller.dispatch(resolved).unwrap();
        assert_eq!(controller.state().image_prompts().map(<[_]>::len), Some(2));

        let effect = controller.request_video_prompts().unwrap().unwrap();
        match controller.execute(effect).await {
            WizardEvent::Resolved {
                outcome: CallOutcome::VideoPrompts(Err(reason)),
                ..
            } => assert!(reason.contains("empty")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut controller = controller();
        let effect = controller.submit_script("script").unwrap().unwrap();
        controller.reset().unwrap();
        assert!(controller.state().is_initial());
        assert!(!controller.state().is_loading());
        assert_eq!(controller.state().last_token(), effect.token);

        let late = WizardEvent::Resolved {
            token: effect.token,
            outcome: CallOutcome::Summary(Ok("late".into())),
        };
        assert_eq!(controller.dispatch(late).unwrap(), None);
        assert!(controller.state().is_initial());
    }
}
