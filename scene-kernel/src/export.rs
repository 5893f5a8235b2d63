//! Plain-text and JSON export documents.

use std::io;
use std::path::{Path, PathBuf};

use scene_primitives::{ImagePrompt, JsonPromptRecord, VideoPrompt};
use thiserror::Error;
use tracing::info;

use crate::state::{WizardState, WizardStep};

/// File name of the plain-text export.
pub const TEXT_EXPORT_FILENAME: &str = "alpha-prompts.txt";
/// File name of the JSON export.
pub const JSON_EXPORT_FILENAME: &str = "alpha-prompts.json";

const TEXT_HEADER: &str = "--- ALPHA PROMPT GENERATOR ---\n\n";
const IMAGE_SECTION: &str = "--- IMAGE PROMPTS ---\n\n";
const VIDEO_SECTION: &str = "\n\n\n--- VIDEO PROMPTS ---\n\n";

/// Result alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors produced while building or writing exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The current step has nothing to export.
    #[error("nothing to export at step {step}")]
    NothingToExport {
        /// Step the export was requested from.
        step: WizardStep,
    },

    /// Records could not be serialised.
    #[error("failed to encode export: {0}")]
    Encode(#[from] serde_json::Error),

    /// The export file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Kind of export document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// `alpha-prompts.txt`.
    Text,
    /// `alpha-prompts.json`.
    Json,
}

impl ExportFormat {
    /// Fixed file name for this format.
    #[must_use]
    pub const fn filename(self) -> &'static str {
        match self {
            Self::Text => TEXT_EXPORT_FILENAME,
            Self::Json => JSON_EXPORT_FILENAME,
        }
    }
}

/// Rendered export ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    /// Document kind.
    pub format: ExportFormat,
    /// File contents.
    pub contents: String,
}

impl ExportDocument {
    /// Fixed file name of the document.
    #[must_use]
    pub const fn filename(&self) -> &'static str {
        self.format.filename()
    }
}

/// `SCENE n` blocks for image prompts, separated by blank lines.
#[must_use]
pub fn image_prompt_blocks(prompts: &[ImagePrompt]) -> String {
    scene_blocks(prompts.iter().map(|p| (p.scene, p.image_prompt.as_str())))
}

/// `SCENE n` blocks for video prompts, separated by blank lines.
#[must_use]
pub fn video_prompt_blocks(prompts: &[VideoPrompt]) -> String {
    scene_blocks(prompts.iter().map(|p| (p.scene, p.video_prompt.as_str())))
}

fn scene_blocks<'a>(blocks: impl Iterator<Item = (u32, &'a str)>) -> String {
    blocks
        .map(|(scene, prompt)| format!("SCENE {scene}\n{prompt}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the plain-text export. The video section is present only when
/// `video_prompts` is given.
#[must_use]
pub fn text_export(image_prompts: &[ImagePrompt], video_prompts: Option<&[VideoPrompt]>) -> String {
    let mut contents = String::from(TEXT_HEADER);
    contents.push_str(IMAGE_SECTION);
    contents.push_str(&image_prompt_blocks(image_prompts));
    if let Some(video_prompts) = video_prompts {
        contents.push_str(VIDEO_SECTION);
        contents.push_str(&video_prompt_blocks(video_prompts));
    }
    contents
}

/// Pretty-printed JSON array of records.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if serialisation fails.
pub fn json_export(records: &[JsonPromptRecord]) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parses a document produced by [`json_export`].
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if `contents` is not a record array.
pub fn parse_json_export(contents: &str) -> ExportResult<Vec<JsonPromptRecord>> {
    Ok(serde_json::from_str(contents)?)
}

/// Builds the export offered by the current results step.
///
/// # Errors
///
/// Returns [`ExportError::NothingToExport`] outside the results steps.
pub fn export_from_state(state: &WizardState) -> ExportResult<ExportDocument> {
    let nothing = || ExportError::NothingToExport { step: state.step() };
    match state.step() {
        WizardStep::ImagePromptsResults => {
            let images = state.image_prompts().ok_or_else(nothing)?;
            Ok(ExportDocument {
                format: ExportFormat::Text,
                contents: text_export(images, None),
            })
        }
        WizardStep::VideoPromptsResults => {
            let images = state.image_prompts().ok_or_else(nothing)?;
            Ok(ExportDocument {
                format: ExportFormat::Text,
                contents: text_export(images, state.video_prompts()),
            })
        }
        WizardStep::JsonPromptsResults => {
            let records = state.json_prompts().ok_or_else(nothing)?;
            Ok(ExportDocument {
                format: ExportFormat::Json,
                contents: json_export(records)?,
            })
        }
        _ => Err(nothing()),
    }
}

/// Writes `document` under `dir`, creating the directory if needed, and
/// returns the written path.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the directory or file cannot be written.
pub async fn write_export(dir: &Path, document: &ExportDocument) -> ExportResult<PathBuf> {
    let path = dir.join(document.filename());
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    tokio::fs::write(&path, document.contents.as_bytes())
        .await
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), bytes = document.contents.len(), "export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scene_primitives::SceneElement;

    fn records() -> Vec<JsonPromptRecord> {
        vec![JsonPromptRecord {
            scene: 1,
            scene_description: "An astronaut adrift".into(),
            style: "cinematic".into(),
            camera_motion: "slow dolly \"in\"".into(),
            elements: vec![SceneElement {
                kind: "character".into(),
                description: "astronaut".into(),
            }],
            duration: "8 seconds".into(),
            resolution: "4K".into(),
        }]
    }

    #[test]
    fn text_export_without_video() {
        let text = text_export(
            &[ImagePrompt::new(1, "first"), ImagePrompt::new(2, "second")],
            None,
        );
        assert_eq!(
            text,
            "--- ALPHA PROMPT GENERATOR ---\n\n--- IMAGE PROMPTS ---\n\nSCENE 1\nfirst\n\nSCENE 2\nsecond"
        );
    }

    #[test]
    fn text_export_with_video() {
        let text = text_export(
            &[ImagePrompt::new(1, "first")],
            Some(&[VideoPrompt::new(1, "pan")]),
        );
        assert!(text.ends_with("SCENE 1\nfirst\n\n\n--- VIDEO PROMPTS ---\n\nSCENE 1\npan"));
    }

    #[test]
    fn json_export_parses_back_equal() {
        let records = records();
        let contents = json_export(&records).unwrap();
        assert!(contents.contains("\n  {"));
        assert!(contents.contains("\"type\": \"character\""));
        assert_eq!(parse_json_export(&contents).unwrap(), records);
    }

    #[test]
    fn nothing_to_export_before_results() {
        let err = export_from_state(&WizardState::default()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::NothingToExport {
                step: WizardStep::ScriptInput
            }
        ));
    }

    #[tokio::test]
    async fn writes_into_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports");
        let document = ExportDocument {
            format: ExportFormat::Json,
            contents: json_export(&records()).unwrap(),
        };
        let path = write_export(&nested, &document).await.unwrap();
        assert_eq!(path, nested.join(JSON_EXPORT_FILENAME));
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(parse_json_export(&written).unwrap(), records());
    }
}
