use std::io::{self, Write};
use std::path::PathBuf;

use scene_kernel::{WizardEvent, WizardState, WizardStep};
use scene_primitives::StyleImage;
use tracing::warn;

use super::{StepView, ViewAction, heading};
use crate::preview::PreviewHandle;
use crate::upload::UploadedImage;

/// Collects a style description and an optional reference image.
///
/// The selected image lives only in this view until `generate` is entered;
/// its preview copy is released when the image is replaced or removed, or
/// when the view is dropped.
#[derive(Debug, Default)]
pub struct StyleView {
    style: String,
    image: Option<StyleImage>,
    preview: Option<PreviewHandle>,
}

impl StyleView {
    /// Current preview, if an image is selected.
    #[must_use]
    pub const fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    fn remove_image(&mut self) {
        self.image = None;
        self.preview = None;
    }
}

impl StepView for StyleView {
    fn step(&self) -> WizardStep {
        WizardStep::StyleInput
    }

    fn render(&self, _state: &WizardState, out: &mut dyn Write) -> io::Result<()> {
        heading(
            out,
            "Step 3: Define Image Style",
            "Enter a style description, upload a reference image, or both!",
        )?;
        if self.style.is_empty() {
            writeln!(out, "Style: (none)")?;
        } else {
            writeln!(out, "Style: {}", self.style)?;
        }
        match (&self.image, &self.preview) {
            (Some(image), Some(preview)) => writeln!(
                out,
                "Image: {} ({}), preview at {}",
                preview.file_name(),
                image.mime_type(),
                preview.path().display()
            )?,
            (Some(image), None) => writeln!(out, "Image: {}", image.mime_type())?,
            (None, _) => writeln!(out, "Image: (none) PNG, JPG, GIF up to 10MB")?,
        }
        writeln!(
            out,
            "Commands: `style <text>`, `image <path>`, `remove`, `generate`, `back`."
        )
    }

    fn handle(&mut self, line: &str, _state: &WizardState) -> ViewAction {
        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(command, rest)| (command, rest.trim()));

        match command {
            "style" => {
                argument.clone_into(&mut self.style);
                ViewAction::Redraw
            }
            "image" if argument.is_empty() => {
                ViewAction::Notice("Usage: image <path>".into())
            }
            "image" => ViewAction::LoadImage(PathBuf::from(argument)),
            "remove" => {
                self.remove_image();
                ViewAction::Redraw
            }
            "generate" => {
                if self.style.trim().is_empty() && self.image.is_none() {
                    return ViewAction::Notice(
                        "Enter a style description or upload a reference image first.".into(),
                    );
                }
                ViewAction::Dispatch(WizardEvent::SubmitStyle {
                    style: self.style.trim().to_owned(),
                    image: self.image.clone(),
                })
            }
            "back" => ViewAction::Dispatch(WizardEvent::GoBack(WizardStep::ScenePacing)),
            "" => ViewAction::None,
            other => ViewAction::Notice(format!("Unknown command `{other}`.")),
        }
    }

    fn image_loaded(&mut self, upload: UploadedImage) {
        let preview = match PreviewHandle::create(&upload) {
            Ok(preview) => Some(preview),
            Err(err) => {
                warn!(error = %err, "preview unavailable");
                None
            }
        };
        self.preview = preview;
        self.image = Some(upload.image);
    }
}
