//! Scoped on-disk preview of the selected style image.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StudioError, StudioResult};
use crate::upload::{UploadedImage, extension_for_mime};

/// Temporary copy of an uploaded image that external viewers can open.
///
/// The file is deleted when the handle is dropped, so replacing or removing
/// the image, or leaving the style step, releases it.
#[derive(Debug)]
pub struct PreviewHandle {
    file: NamedTempFile,
    file_name: String,
}

impl PreviewHandle {
    /// Writes a temporary copy of `upload`.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Preview`] if the file cannot be created.
    pub fn create(upload: &UploadedImage) -> StudioResult<Self> {
        let suffix = extension_for_mime(upload.image.mime_type())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let mut file = tempfile::Builder::new()
            .prefix("scene-forge-preview-")
            .suffix(&suffix)
            .tempfile()
            .map_err(StudioError::Preview)?;
        file.write_all(&upload.bytes)
            .and_then(|()| file.flush())
            .map_err(StudioError::Preview)?;
        debug!(path = %file.path().display(), "preview created");

        Ok(Self {
            file,
            file_name: upload.file_name.clone(),
        })
    }

    /// Location of the temporary copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Name of the original file.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}
