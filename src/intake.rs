//! # Image Intake
//!
//! Turns user-supplied images into self-contained sources that can be dropped
//! straight into an `<img src>` or a CSS `url(...)`:
//!
//! - uploaded bytes become an inline `data:` URL (no network needed later)
//! - stock or remote images keep their URL as-is
//!
//! Slots are replaced as whole values, so a failed read never leaves a
//! half-updated image behind.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::PlacardError;

/// Where an image's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// Bytes encoded in place.
    Inline {
        mime: String,
        #[serde(skip)]
        base64: String,
    },
    /// A URL the renderer loads itself.
    Remote { url: String },
}

/// A named image usable directly as an image source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFile {
    pub name: String,
    pub source: ImageSource,
}

impl ImageFile {
    /// Encode raw file bytes as an inline image.
    ///
    /// The MIME type comes from the magic bytes, falling back to the file
    /// extension for formats the decoder does not sniff (e.g. SVG).
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, PlacardError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(PlacardError::Image(format!("'{}' is empty", name)));
        }

        let mime = match image::guess_format(bytes) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(_) => mime_guess::from_path(&name)
                .first()
                .filter(|m| m.type_() == mime_guess::mime::IMAGE)
                .map(|m| m.essence_str().to_string())
                .ok_or_else(|| {
                    PlacardError::Image(format!("'{}' is not a recognized image", name))
                })?,
        };

        Ok(Self {
            name,
            source: ImageSource::Inline {
                mime,
                base64: STANDARD.encode(bytes),
            },
        })
    }

    /// Use a remote (e.g. stock) image by URL without downloading it.
    pub fn from_stock(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            source: ImageSource::Remote { url },
        }
    }

    /// Wrap an existing `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(name: impl Into<String>, data_url: &str) -> Result<Self, PlacardError> {
        let (mime, payload) = data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .ok_or_else(|| PlacardError::Image("malformed data URL".to_string()))?;
        if mime.is_empty() || payload.is_empty() {
            return Err(PlacardError::Image("malformed data URL".to_string()));
        }
        Ok(Self {
            name: name.into(),
            source: ImageSource::Inline {
                mime: mime.to_string(),
                base64: payload.to_string(),
            },
        })
    }

    /// Read a local file and encode it inline.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, PlacardError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Self::from_bytes(name, &bytes)
    }

    /// The value to place in an image source attribute.
    pub fn src(&self) -> String {
        match &self.source {
            ImageSource::Inline { mime, base64 } => format!("data:{};base64,{}", mime, base64),
            ImageSource::Remote { url } => url.clone(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.source, ImageSource::Remote { .. })
    }
}

/// The three independent image slots of a flyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSlot {
    Logo,
    Speaker,
    Background,
}

impl ImageSlot {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "logo" => Some(ImageSlot::Logo),
            "speaker" | "promo" => Some(ImageSlot::Speaker),
            "background" | "bg" => Some(ImageSlot::Background),
            _ => None,
        }
    }
}
