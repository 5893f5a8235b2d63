//! Wizard state machine, prompt service client, and exports.
//!
//! The wizard is a pure reducer over [`WizardState`]: applying a
//! [`WizardEvent`] yields the next state plus, for steps that need the model,
//! an [`Effect`] tagged with a fresh request token. [`WizardController`] owns
//! the state for one session and runs effects through a [`PromptService`].

#![warn(missing_docs, clippy::pedantic)]

mod controller;
mod export;
mod service;
mod state;
mod wizard;

pub use controller::WizardController;
pub use export::{
    ExportDocument, ExportError, ExportFormat, ExportResult, JSON_EXPORT_FILENAME,
    TEXT_EXPORT_FILENAME, export_from_state, image_prompt_blocks, json_export, parse_json_export,
    text_export, video_prompt_blocks, write_export,
};
pub use service::{
    GenerativePromptService, PromptService, ServiceError, ServiceResult, decode_structured,
};
pub use state::{CallKind, WizardState, WizardStep};
pub use wizard::{
    CallOutcome, Effect, IMAGE_PROMPTS_ERROR, JSON_PROMPTS_ERROR, SUMMARY_ERROR,
    SUMMARY_FALLBACK, ServiceCall, Transition, VIDEO_PROMPTS_ERROR, WizardError, WizardEvent,
    WizardResult,
};
