use std::io::{self, Write};

use scene_kernel::{
    WizardEvent, WizardState, WizardStep, image_prompt_blocks, json_export, video_prompt_blocks,
};

use super::{StepView, ViewAction, heading};

/// Shows generated prompts and offers the next generation step.
#[derive(Debug, Clone, Copy)]
pub struct ResultsView {
    step: WizardStep,
}

impl ResultsView {
    /// Builds the view for one of the three results steps.
    #[must_use]
    pub const fn new(step: WizardStep) -> Self {
        Self { step }
    }

    fn commands(self) -> &'static str {
        match self.step {
            WizardStep::ImagePromptsResults => {
                "Commands: `video` for video animation prompts, `save`, `restart`."
            }
            WizardStep::VideoPromptsResults => {
                "Commands: `json` for a structured format, `save`, `restart`."
            }
            _ => "Commands: `save`, `restart`.",
        }
    }
}

impl StepView for ResultsView {
    fn step(&self) -> WizardStep {
        self.step
    }

    fn render(&self, state: &WizardState, out: &mut dyn Write) -> io::Result<()> {
        match self.step {
            WizardStep::JsonPromptsResults => {
                heading(out, "Structured JSON Output", "")?;
                let records = state.json_prompts().unwrap_or_default();
                match json_export(records) {
                    Ok(json) => writeln!(out, "{json}")?,
                    Err(err) => writeln!(out, "(could not display records: {err})")?,
                }
            }
            _ => {
                heading(out, "Image Prompts (Infographic Style)", "")?;
                let images = state.image_prompts().unwrap_or_default();
                writeln!(out, "{}", image_prompt_blocks(images))?;
                if self.step == WizardStep::VideoPromptsResults {
                    heading(out, "Video Animation Prompts (Cinematic Style)", "")?;
                    let videos = state.video_prompts().unwrap_or_default();
                    writeln!(out, "{}", video_prompt_blocks(videos))?;
                }
            }
        }
        writeln!(out)?;
        writeln!(out, "{}", self.commands())
    }

    fn handle(&mut self, line: &str, _state: &WizardState) -> ViewAction {
        match (self.step, line.trim()) {
            (WizardStep::ImagePromptsResults, "video") => {
                ViewAction::Dispatch(WizardEvent::RequestVideoPrompts)
            }
            (WizardStep::VideoPromptsResults, "json") => {
                ViewAction::Dispatch(WizardEvent::RequestJsonPrompts)
            }
            (_, "save") => ViewAction::Save,
            (_, "restart") => ViewAction::Dispatch(WizardEvent::Reset),
            (_, "") => ViewAction::None,
            (_, other) => ViewAction::Notice(format!(
                "Unknown command `{other}`. {}",
                self.commands()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commands_depend_on_step() {
        let state = WizardState::default();
        let mut images = ResultsView::new(WizardStep::ImagePromptsResults);
        assert_eq!(
            images.handle("video", &state),
            ViewAction::Dispatch(WizardEvent::RequestVideoPrompts)
        );
        assert!(matches!(images.handle("json", &state), ViewAction::Notice(_)));

        let mut videos = ResultsView::new(WizardStep::VideoPromptsResults);
        assert_eq!(
            videos.handle("json", &state),
            ViewAction::Dispatch(WizardEvent::RequestJsonPrompts)
        );

        let mut json = ResultsView::new(WizardStep::JsonPromptsResults);
        assert_eq!(json.handle("save", &state), ViewAction::Save);
        assert_eq!(
            json.handle("restart", &state),
            ViewAction::Dispatch(WizardEvent::Reset)
        );
    }
}
