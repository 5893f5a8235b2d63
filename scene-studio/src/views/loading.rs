use std::io::{self, Write};

use scene_kernel::{WizardEvent, WizardState, WizardStep};

use super::{StepView, ViewAction, heading};

/// Status lines cycled while image prompts are generated.
pub const LOADING_MESSAGES: [&str; 6] = [
    "Warming up the director's chair...",
    "Consulting with the AI cinematographer...",
    "Storyboarding your scenes...",
    "Adjusting the virtual camera lenses...",
    "Adding a touch of cinematic magic...",
    "Finalizing the shot list...",
];

/// Shown first when a reference image was supplied.
pub const IMAGE_ANALYSIS_MESSAGE: &str = "Analyzing your style reference image...";

/// Waiting screen for the three loading steps.
#[derive(Debug, Clone)]
pub struct LoadingView {
    step: WizardStep,
    title: &'static str,
    messages: Vec<&'static str>,
    index: usize,
}

impl LoadingView {
    /// Builds the view for a loading step.
    ///
    /// Image prompt generation rotates through [`LOADING_MESSAGES`],
    /// starting with [`IMAGE_ANALYSIS_MESSAGE`] when `has_image` is set; the
    /// other steps show a single fixed message.
    #[must_use]
    pub fn for_step(step: WizardStep, has_image: bool) -> Self {
        let (title, messages) = match step {
            WizardStep::VideoPromptsLoading => (
                "Generating Videos",
                vec!["Crafting cinematic video prompts..."],
            ),
            WizardStep::JsonPromptsLoading => (
                "Structuring Data",
                vec!["Building the detailed JSON output..."],
            ),
            _ => {
                let mut messages = Vec::with_capacity(LOADING_MESSAGES.len() + 1);
                if has_image {
                    messages.push(IMAGE_ANALYSIS_MESSAGE);
                }
                messages.extend(LOADING_MESSAGES);
                ("Generating Prompts", messages)
            }
        };
        Self {
            step,
            title,
            messages,
            index: 0,
        }
    }

    /// Message currently displayed.
    #[must_use]
    pub fn current_message(&self) -> &'static str {
        self.messages.get(self.index).copied().unwrap_or_default()
    }

    const fn back_target(&self) -> WizardStep {
        match self.step {
            WizardStep::VideoPromptsLoading => WizardStep::ImagePromptsResults,
            WizardStep::JsonPromptsLoading => WizardStep::VideoPromptsResults,
            _ => WizardStep::StyleInput,
        }
    }
}

impl StepView for LoadingView {
    fn step(&self) -> WizardStep {
        self.step
    }

    fn render(&self, _state: &WizardState, out: &mut dyn Write) -> io::Result<()> {
        heading(out, self.title, self.current_message())?;
        writeln!(out, "Type `back` to stop waiting.")
    }

    fn handle(&mut self, line: &str, _state: &WizardState) -> ViewAction {
        match line.trim() {
            "back" => ViewAction::Dispatch(WizardEvent::GoBack(self.back_target())),
            "" => ViewAction::None,
            _ => ViewAction::Notice("Still working, please wait...".into()),
        }
    }

    fn tick(&mut self) -> Option<String> {
        if self.messages.len() < 2 {
            return None;
        }
        self.index = (self.index + 1) % self.messages.len();
        Some(self.current_message().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_analysis_message_comes_first() {
        let mut view = LoadingView::for_step(WizardStep::Loading, true);
        assert_eq!(view.current_message(), IMAGE_ANALYSIS_MESSAGE);
        assert_eq!(view.tick().as_deref(), Some(LOADING_MESSAGES[0]));
    }

    #[test]
    fn messages_wrap_around() {
        let mut view = LoadingView::for_step(WizardStep::Loading, false);
        assert_eq!(view.current_message(), LOADING_MESSAGES[0]);
        for _ in 0..LOADING_MESSAGES.len() {
            view.tick();
        }
        assert_eq!(view.current_message(), LOADING_MESSAGES[0]);
    }

    #[test]
    fn fixed_message_does_not_rotate() {
        let mut view = LoadingView::for_step(WizardStep::JsonPromptsLoading, false);
        assert_eq!(view.tick(), None);
        assert_eq!(
            view.handle("back", &WizardState::default()),
            ViewAction::Dispatch(WizardEvent::GoBack(WizardStep::VideoPromptsResults))
        );
    }
}
