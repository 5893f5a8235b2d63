//! Terminal front end for the scene prompt wizard.
//!
//! The [`Shell`] renders one [`views::StepView`] per wizard step, reads
//! commands line by line and runs the controller's service calls in the
//! background so navigation stays responsive.

#![warn(missing_docs, clippy::pedantic)]

pub mod error;
pub mod preview;
pub mod shell;
pub mod upload;
pub mod views;

pub use error::{StudioError, StudioResult};
pub use preview::PreviewHandle;
pub use shell::{LOADING_ROTATION, QUIT_COMMAND, Shell};
pub use upload::{UploadedImage, load_style_image};
