use std::io::{self, Write};

use scene_kernel::{WizardEvent, WizardState, WizardStep};

use super::{StepView, ViewAction, heading};

/// Collects script lines until an empty line.
#[derive(Debug, Default)]
pub struct ScriptView {
    lines: Vec<String>,
}

impl StepView for ScriptView {
    fn step(&self) -> WizardStep {
        WizardStep::ScriptInput
    }

    fn render(&self, _state: &WizardState, out: &mut dyn Write) -> io::Result<()> {
        heading(
            out,
            "Step 1: Provide Your Script",
            "Paste your paragraph or long-form script below.",
        )?;
        writeln!(out, "Finish with an empty line. Type `quit` to exit.")
    }

    fn handle(&mut self, line: &str, _state: &WizardState) -> ViewAction {
        if !line.trim().is_empty() {
            self.lines.push(line.to_owned());
            return ViewAction::None;
        }

        let script = self.lines.join("\n");
        if script.trim().is_empty() {
            return ViewAction::Notice("The script is empty; type or paste some text first.".into());
        }
        self.lines.clear();
        ViewAction::Dispatch(WizardEvent::SubmitScript(script))
    }
}
