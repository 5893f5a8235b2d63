use std::io::{self, Write};

use scene_kernel::{CallKind, WizardEvent, WizardState, WizardStep};
use scene_primitives::SceneCount;

use super::{StepView, ViewAction, heading};

/// Shows the script summary and asks for the scene count.
#[derive(Debug, Default)]
pub struct PacingView;

impl StepView for PacingView {
    fn step(&self) -> WizardStep {
        WizardStep::ScenePacing
    }

    fn render(&self, state: &WizardState, out: &mut dyn Write) -> io::Result<()> {
        if state.pending_call() == Some(CallKind::Summary) {
            writeln!(out)?;
            writeln!(out, "Analyzing Script...")?;
            writeln!(
                out,
                "The AI is reading your script to understand its core themes..."
            )?;
        } else {
            writeln!(out)?;
            writeln!(out, "Script Received!")?;
            writeln!(out, "{}", state.script_summary())?;
        }

        heading(
            out,
            "Step 2: Scene Pacing",
            "How many scenes (or images) should I create from this paragraph of your script?",
        )?;
        writeln!(out, "Scenes: {}", state.scene_count())?;
        writeln!(
            out,
            "Enter a number to change it, an empty line to continue, or `back`."
        )
    }

    fn handle(&mut self, line: &str, state: &WizardState) -> ViewAction {
        match line.trim() {
            "" => ViewAction::Dispatch(WizardEvent::SubmitPacing(state.scene_count())),
            "back" => ViewAction::Dispatch(WizardEvent::GoBack(WizardStep::ScriptInput)),
            input => ViewAction::Dispatch(WizardEvent::SetSceneCount(SceneCount::parse_lenient(
                input,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_are_parsed_leniently() {
        let state = WizardState::default();
        let mut view = PacingView;
        assert_eq!(
            view.handle("5 scenes", &state),
            ViewAction::Dispatch(WizardEvent::SetSceneCount(SceneCount::new(5).unwrap()))
        );
        assert_eq!(
            view.handle("-2", &state),
            ViewAction::Dispatch(WizardEvent::SetSceneCount(SceneCount::MIN))
        );
    }

    #[test]
    fn empty_line_accepts_current_count() {
        let state = WizardState::default();
        assert_eq!(
            PacingView.handle("", &state),
            ViewAction::Dispatch(WizardEvent::SubmitPacing(SceneCount::DEFAULT))
        );
        assert_eq!(
            PacingView.handle("back", &state),
            ViewAction::Dispatch(WizardEvent::GoBack(WizardStep::ScriptInput))
        );
    }
}
