//! One terminal view per wizard step.
//!
//! Views render the current [`WizardState`] and translate input lines into
//! [`ViewAction`]s. They never talk to the prompt service; the shell turns
//! their actions into wizard events and runs the resulting effects.

use std::io::{self, Write};
use std::path::PathBuf;

use scene_kernel::{WizardEvent, WizardState, WizardStep};

use crate::upload::UploadedImage;

mod loading;
mod pacing;
mod results;
mod script;
mod style;

pub use loading::{IMAGE_ANALYSIS_MESSAGE, LOADING_MESSAGES, LoadingView};
pub use pacing::PacingView;
pub use results::ResultsView;
pub use script::ScriptView;
pub use style::StyleView;

/// What the shell should do with an input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    /// Apply a wizard event.
    Dispatch(WizardEvent),
    /// Read a reference image from disk and hand it back to the view.
    LoadImage(PathBuf),
    /// Write the export for the current results step.
    Save,
    /// Draw the view again.
    Redraw,
    /// Print a one-line hint.
    Notice(String),
    /// Nothing to do.
    None,
}

/// A terminal rendering of one wizard step.
pub trait StepView: Send {
    /// Step this view renders.
    fn step(&self) -> WizardStep;

    /// Writes the full view.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    fn render(&self, state: &WizardState, out: &mut dyn Write) -> io::Result<()>;

    /// Interprets one input line.
    fn handle(&mut self, line: &str, state: &WizardState) -> ViewAction;

    /// Receives an image requested with [`ViewAction::LoadImage`].
    fn image_loaded(&mut self, _upload: UploadedImage) {}

    /// Called periodically; returns a status line to print, if any.
    fn tick(&mut self) -> Option<String> {
        None
    }
}

/// Builds the view for the state's current step.
#[must_use]
pub fn view_for(state: &WizardState) -> Box<dyn StepView> {
    match state.step() {
        WizardStep::ScriptInput => Box::new(ScriptView::default()),
        WizardStep::ScenePacing => Box::new(PacingView),
        WizardStep::StyleInput => Box::new(StyleView::default()),
        step @ (WizardStep::Loading
        | WizardStep::VideoPromptsLoading
        | WizardStep::JsonPromptsLoading) => {
            Box::new(LoadingView::for_step(step, state.style_image().is_some()))
        }
        step @ (WizardStep::ImagePromptsResults
        | WizardStep::VideoPromptsResults
        | WizardStep::JsonPromptsResults) => Box::new(ResultsView::new(step)),
    }
}

fn heading(out: &mut dyn Write, title: &str, subtitle: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "== {title} ==")?;
    writeln!(out, "{subtitle}")
}
