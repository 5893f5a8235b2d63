//! Interactive loop tying terminal input, the views and the controller.

use std::future::poll_fn;
use std::io::Write;
use std::path::PathBuf;
use std::task::Poll;
use std::time::Duration;

use futures::future::BoxFuture;
use scene_kernel::{Effect, WizardController, WizardEvent, export_from_state, write_export};
use scene_primitives::RequestToken;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::error::StudioResult;
use crate::upload::load_style_image;
use crate::views::{StepView, ViewAction, view_for};

/// Interval between loading message rotations.
pub const LOADING_ROTATION: Duration = Duration::from_millis(2500);

/// Command accepted on every step to leave the studio.
pub const QUIT_COMMAND: &str = "quit";

enum Flow {
    Continue(Option<Effect>),
    Quit,
}

struct InFlight {
    token: RequestToken,
    future: BoxFuture<'static, WizardEvent>,
}

/// Renders the current step and routes input to the controller.
///
/// Service calls are polled alongside input so the user can navigate back
/// while waiting; completed calls take priority over pending input. Besides
/// the outstanding request, a superseded summary keeps running until it
/// lands. A call the wizard no longer waits for is dropped.
pub struct Shell<W: Write> {
    controller: WizardController,
    view: Box<dyn StepView>,
    output_dir: PathBuf,
    out: W,
}

impl<W: Write> Shell<W> {
    /// Creates a shell writing views to `out` and exports under `output_dir`.
    pub fn new(controller: WizardController, output_dir: impl Into<PathBuf>, out: W) -> Self {
        let view = view_for(controller.state());
        Self {
            controller,
            view,
            output_dir: output_dir.into(),
            out,
        }
    }

    /// The wrapped controller.
    #[must_use]
    pub const fn controller(&self) -> &WizardController {
        &self.controller
    }

    /// Consumes the shell and returns its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs until `quit` or end of input.
    ///
    /// On end of input an outstanding request is still awaited so its result
    /// is applied before returning.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Io`](crate::StudioError::Io) if reading input
    /// or writing output fails.
    pub async fn run<R>(&mut self, mut input: R) -> StudioResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::new();
        let mut in_flight: Vec<InFlight> = Vec::new();
        let mut input_closed = false;
        let mut ticker = interval_at(Instant::now() + LOADING_ROTATION, LOADING_ROTATION);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(session_id = %self.controller.session_id(), "studio started");
        self.render()?;

        loop {
            if input_closed && in_flight.is_empty() {
                break;
            }

            let effect = tokio::select! {
                biased;

                resolved = next_resolution(&mut in_flight), if !in_flight.is_empty() => {
                    self.apply(resolved)?
                }
                read = input.read_until(b'\n', &mut line), if !input_closed => {
                    read?;
                    if line.is_empty() {
                        debug!(waiting = in_flight.len(), "input closed");
                        input_closed = true;
                        None
                    } else {
                        let text = self.decode_line(&line)?;
                        line.clear();
                        match self.handle_line(&text).await? {
                            Flow::Continue(effect) => effect,
                            Flow::Quit => break,
                        }
                    }
                }
                _ = ticker.tick() => {
                    if let Some(status) = self.view.tick() {
                        writeln!(self.out, "{status}")?;
                        self.out.flush()?;
                    }
                    None
                }
            };

            if let Some(effect) = effect {
                in_flight.push(InFlight {
                    token: effect.token,
                    future: self.controller.execute(effect),
                });
            }
            let state = self.controller.state();
            in_flight.retain(|call| {
                let awaited = state.awaits(call.token);
                if !awaited {
                    debug!(token = %call.token, "dropping abandoned request");
                }
                awaited
            });
        }

        info!(step = %self.controller.state().step(), "studio stopped");
        self.out.flush()?;
        Ok(())
    }

    /// Strips the line ending and replaces invalid UTF-8.
    fn decode_line(&mut self, raw: &[u8]) -> StudioResult<String> {
        let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        match std::str::from_utf8(raw) {
            Ok(text) => Ok(text.to_owned()),
            Err(err) => {
                warn!(error = %err, "input line is not valid UTF-8");
                writeln!(
                    self.out,
                    "! Input contained invalid UTF-8; unreadable bytes were replaced."
                )?;
                Ok(String::from_utf8_lossy(raw).into_owned())
            }
        }
    }

    async fn handle_line(&mut self, line: &str) -> StudioResult<Flow> {
        if line.trim() == QUIT_COMMAND {
            return Ok(Flow::Quit);
        }

        let action = self.view.handle(line, self.controller.state());
        let effect = match action {
            ViewAction::Dispatch(event) => self.apply(event)?,
            ViewAction::LoadImage(path) => {
                match load_style_image(&path).await {
                    Ok(upload) => {
                        for warning in &upload.warnings {
                            writeln!(self.out, "warning: {warning}")?;
                        }
                        self.view.image_loaded(upload);
                        self.render()?;
                    }
                    Err(err) => {
                        warn!(error = %err, "style image rejected");
                        writeln!(self.out, "! {err}")?;
                    }
                }
                None
            }
            ViewAction::Save => {
                self.save().await?;
                None
            }
            ViewAction::Redraw => {
                self.render()?;
                None
            }
            ViewAction::Notice(notice) => {
                writeln!(self.out, "{notice}")?;
                None
            }
            ViewAction::None => None,
        };
        self.out.flush()?;
        Ok(Flow::Continue(effect))
    }

    fn apply(&mut self, event: WizardEvent) -> StudioResult<Option<Effect>> {
        let before = self.controller.state().clone();
        match self.controller.dispatch(event) {
            Ok(effect) => {
                if *self.controller.state() != before {
                    if self.view.step() != self.controller.state().step() {
                        self.view = view_for(self.controller.state());
                    }
                    self.render()?;
                }
                Ok(effect)
            }
            Err(err) => {
                warn!(error = %err, "event rejected");
                writeln!(self.out, "! {err}")?;
                Ok(None)
            }
        }
    }

    async fn save(&mut self) -> StudioResult<()> {
        let written = match export_from_state(self.controller.state()) {
            Ok(document) => write_export(&self.output_dir, &document).await,
            Err(err) => Err(err),
        };
        match written {
            Ok(path) => writeln!(self.out, "Saved {}", path.display())?,
            Err(err) => {
                warn!(error = %err, "export failed");
                writeln!(self.out, "! {err}")?;
            }
        }
        Ok(())
    }

    fn render(&mut self) -> StudioResult<()> {
        let state = self.controller.state();
        self.view.render(state, &mut self.out)?;
        if let Some(error) = state.error() {
            writeln!(self.out)?;
            writeln!(self.out, "! {error}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Resolves with the first finished call and removes it from `calls`.
async fn next_resolution(calls: &mut Vec<InFlight>) -> WizardEvent {
    poll_fn(|cx| {
        for index in 0..calls.len() {
            if let Poll::Ready(event) = calls[index].future.as_mut().poll(cx) {
                calls.swap_remove(index);
                return Poll::Ready(event);
            }
        }
        Poll::Pending
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use scene_kernel::{PromptService, ServiceError, ServiceResult, WizardStep};
    use scene_primitives::{ImagePrompt, JsonPromptRecord, SceneCount, StyleImage, VideoPrompt};

    struct OfflineService;

    #[async_trait]
    impl PromptService for OfflineService {
        async fn summarize(&self, _script: &str) -> ServiceResult<String> {
            Err(ServiceError::EmptyResponse)
        }

        async fn generate_image_prompts(
            &self,
            _script: &str,
            _scene_count: SceneCount,
            _style: &str,
            _image: Option<&StyleImage>,
        ) -> ServiceResult<Vec<ImagePrompt>> {
            Err(ServiceError::EmptyResponse)
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
            Err(ServiceError::EmptyResponse)
        }
    }

    fn shell() -> Shell<Vec<u8>> {
        Shell::new(
            WizardController::new(Arc::new(OfflineService)),
            std::env::temp_dir(),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn failures_show_error_banner() {
        let mut shell = shell();
        shell.run(&b"a script\n\n"[..]).await.unwrap();

        let state = shell.controller().state();
        assert_eq!(state.step(), WizardStep::ScenePacing);
        assert!(!state.is_loading());

        let output = String::from_utf8(shell.into_output()).unwrap();
        assert!(output.contains("Step 2: Scene Pacing"));
        assert!(output.contains("! Could not analyze script. Please try again."));
        assert!(output.contains("Analysis failed. Please proceed."));
    }

    #[tokio::test]
    async fn quit_stops_before_remaining_input() {
        let mut shell = shell();
        shell.run(&b"quit\nignored\n\n"[..]).await.unwrap();
        assert!(shell.controller().state().is_initial());
    }

    #[tokio::test]
    async fn generation_failure_returns_to_style_input() {
        let mut shell = shell();
        shell
            .run(&b"script\n\n\n\nstyle ink\ngenerate\n"[..])
            .await
            .unwrap();
        let state = shell.controller().state();
        assert_eq!(state.step(), WizardStep::StyleInput);
        let output = String::from_utf8(shell.into_output()).unwrap();
        assert!(output.contains(
            "! Failed to generate prompts. Please check your inputs and try again."
        ));
    }
}
