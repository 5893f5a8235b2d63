//! Turns a local image file into a [`StyleImage`] payload.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use scene_primitives::StyleImage;
use tracing::{debug, warn};

use crate::error::{StudioError, StudioResult};

/// Uploads above this size are accepted with a warning.
pub const ADVISORY_MAX_BYTES: usize = 10 * 1024 * 1024;

/// MIME type used when the content is not a recognised image.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A reference image read from disk.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Encoded payload sent to the model.
    pub image: StyleImage,
    /// Display name of the source file.
    pub file_name: String,
    /// Raw file contents, kept for the preview copy.
    pub bytes: Vec<u8>,
    /// Advisory problems found while loading.
    pub warnings: Vec<String>,
}

/// Reads `path`, sniffs its MIME type and base64-encodes it.
///
/// # Errors
///
/// Returns [`StudioError::Read`] if the file cannot be read and
/// [`StudioError::Image`] if it is empty.
pub async fn load_style_image(path: &Path) -> StudioResult<UploadedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| StudioError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let mut warnings = Vec::new();
    if bytes.len() > ADVISORY_MAX_BYTES {
        warnings.push(format!(
            "{} is {} bytes, larger than the recommended 10 MB",
            path.display(),
            bytes.len()
        ));
    }

    let mime_type = sniff_mime_type(&bytes, path).unwrap_or_else(|| {
        warnings.push(format!(
            "{} does not look like an image; sending it as {FALLBACK_MIME_TYPE}",
            path.display()
        ));
        FALLBACK_MIME_TYPE
    });

    for warning in &warnings {
        warn!(path = %path.display(), "{warning}");
    }

    let image = StyleImage::new(STANDARD.encode(&bytes), mime_type)?;
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    debug!(%file_name, mime_type, size = bytes.len(), "style image loaded");

    Ok(UploadedImage {
        image,
        file_name,
        bytes,
        warnings,
    })
}

/// Detects the image MIME type from magic bytes, falling back to the file
/// extension.
#[must_use]
pub fn sniff_mime_type(bytes: &[u8], path: &Path) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .and_then(mime_for_format)
        .or_else(|| {
            path.extension()
                .and_then(ImageFormat::from_extension)
                .and_then(mime_for_format)
        })
}

/// Preferred file extension for an image MIME type.
#[must_use]
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    Some(match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/x-icon" => "ico",
        "image/avif" => "avif",
        _ => return None,
    })
}

fn mime_for_format(format: ImageFormat) -> Option<&'static str> {
    Some(match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn magic_bytes_win_over_extension() {
        assert_eq!(
            sniff_mime_type(PNG_MAGIC, Path::new("photo.jpg")),
            Some("image/png")
        );
    }

    #[test]
    fn falls_back_to_extension() {
        assert_eq!(
            sniff_mime_type(b"not really", Path::new("photo.jpeg")),
            Some("image/jpeg")
        );
        assert_eq!(sniff_mime_type(b"plain", Path::new("notes.txt")), None);
    }

    #[tokio::test]
    async fn loads_and_encodes_file() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(PNG_MAGIC).unwrap();

        let upload = load_style_image(file.path()).await.unwrap();
        assert_eq!(upload.image.mime_type(), "image/png");
        assert_eq!(upload.image.base64(), STANDARD.encode(PNG_MAGIC));
        assert_eq!(upload.bytes, PNG_MAGIC);
        assert!(upload.warnings.is_empty());
    }

    #[tokio::test]
    async fn unknown_content_is_accepted_with_warning() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"opaque").unwrap();

        let upload = load_style_image(file.path()).await.unwrap();
        assert_eq!(upload.image.mime_type(), FALLBACK_MIME_TYPE);
        assert_eq!(upload.warnings.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = load_style_image(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::Read { .. }));
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = load_style_image(file.path()).await.unwrap_err();
        assert!(matches!(err, StudioError::Image(_)));
    }
}
