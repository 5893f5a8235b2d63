//! Scene pacing and style payload types.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of scenes the script is divided into. Never zero.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneCount(NonZeroU32);

impl SceneCount {
    /// Scene count used before the user picks one.
    pub const DEFAULT: Self = Self(NonZeroU32::new(3).unwrap());

    /// The smallest allowed scene count.
    pub const MIN: Self = Self(NonZeroU32::MIN);

    /// Creates a scene count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSceneCount`] when `value` is zero.
    pub fn new(value: u32) -> Result<Self> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(Error::InvalidSceneCount {
                value: i64::from(value),
            })
    }

    /// Parses user input the way a numeric form field does.
    ///
    /// Leading whitespace is ignored and only the leading integer is read, so
    /// `"4 scenes"` yields 4. Anything non-numeric or below one clamps to one;
    /// values beyond `u32::MAX` saturate.
    #[must_use]
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim_start();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let end = digits
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(digits.len());
        let digits = &digits[..end];

        if negative || digits.is_empty() {
            return Self::MIN;
        }

        let value = digits.parse::<u32>().unwrap_or(u32::MAX);
        NonZeroU32::new(value).map_or(Self::MIN, Self)
    }

    /// Returns the count as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for SceneCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SceneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for SceneCount {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

/// Reference image used to bias the visual style of generated prompts.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleImage {
    base64: String,
    mime_type: String,
}

impl StyleImage {
    /// Creates a style image from an already encoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStyleImage`] when the payload or MIME type is
    /// empty.
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Result<Self> {
        let base64 = base64.into();
        let mime_type = mime_type.into();
        if base64.is_empty() {
            return Err(Error::InvalidStyleImage {
                reason: "image payload is empty".to_owned(),
            });
        }
        if mime_type.trim().is_empty() {
            return Err(Error::InvalidStyleImage {
                reason: "MIME type is empty".to_owned(),
            });
        }
        Ok(Self { base64, mime_type })
    }

    /// Returns the base64-encoded image bytes.
    #[must_use]
    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// Returns the MIME type, e.g. `image/png`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

impl fmt::Debug for StyleImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleImage")
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.base64.len())
            .finish()
    }
}
