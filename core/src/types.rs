//! Plain data shared by the request builder, the session and the view.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64_ENGINE;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::GenError;

/// MIME types the file picker accepts.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// User-selected generation intent.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Chat,
    ImageGen,
    ImageEdit,
    VideoGen,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Chat, Mode::ImageGen, Mode::VideoGen, Mode::ImageEdit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::ImageGen => "image-gen",
            Mode::ImageEdit => "image-edit",
            Mode::VideoGen => "video-gen",
        }
    }

    /// Modes billed against a paid key.
    pub fn requires_paid_credential(&self) -> bool {
        matches!(self, Mode::ImageGen | Mode::VideoGen)
    }

    pub fn requires_attachment(&self) -> bool {
        matches!(self, Mode::ImageEdit)
    }
}

/// A user-supplied image pending inclusion in the next submission.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub base64: String,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Result<Self, GenError> {
        let mime_type = mime_type.into();
        if !ACCEPTED_IMAGE_TYPES.contains(&mime_type.as_str()) {
            return Err(GenError::InvalidInput(format!(
                "Unsupported file type {mime_type}; use PNG, JPEG or WebP."
            )));
        }
        let base64 = base64.into();
        if base64.is_empty() {
            return Err(GenError::InvalidInput("The selected file is empty.".to_string()));
        }
        Ok(Self { base64, mime_type })
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self, GenError> {
        Self::new(B64_ENGINE.encode(bytes), mime_type)
    }

    /// Read a local image, guessing its type from the extension.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, GenError> {
        let path = path.as_ref();
        let mime = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            GenError::InvalidInput(format!("Could not read {}: {err}", path.display()))
        })?;
        Self::from_bytes(&bytes, mime)
    }

    pub fn data_url(&self) -> String {
        data_url(&self.mime_type, &self.base64)
    }
}

pub(crate) fn data_url(mime_type: &str, base64: &str) -> String {
    format!("data:{mime_type};base64,{base64}")
}

/// Knobs edited by the settings form. Strings are passed to the provider as-is.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub aspect_ratio: String,
    pub image_size: String,
    pub video_resolution: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: "1:1".to_string(),
            image_size: "1K".to_string(),
            video_resolution: "1080p".to_string(),
        }
    }
}

/// Partial settings change; unset fields keep their value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
    pub video_resolution: Option<String>,
}

impl GenerationSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.aspect_ratio {
            self.aspect_ratio = v;
        }
        if let Some(v) = patch.image_size {
            self.image_size = v;
        }
        if let Some(v) = patch.video_resolution {
            self.video_resolution = v;
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

/// Provider output reduced to what the conversation can display.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
}

impl GenerationResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn media(url: impl Into<String>, media_type: MediaType, caption: Option<&str>) -> Self {
        Self {
            text: caption.map(str::to_string),
            media_url: Some(url.into()),
            media_type: Some(media_type),
        }
    }
}
