//! Prompt construction and response validation for the prompt service.
//!
//! [`template`] holds the `{{variable}}` engine, [`catalog`] the four
//! instruction templates, and [`schema`] the response shapes requested from
//! the model together with the strict local check applied to every reply.

#![warn(missing_docs, clippy::pedantic)]

pub mod catalog;
pub mod schema;
pub mod template;

pub use catalog::{ImagePromptInput, PromptCatalog};
pub use schema::{ResponseSchema, SchemaType, SchemaViolation};
pub use template::{PromptTemplate, TemplateBuilder, TemplateError, TemplateResult};
