//! Maps a submission onto the provider call shape for its mode.

use crate::errors::GenError;
use crate::types::{Attachment, GenerationSettings, Mode};

use super::wire::{
    Content, GenerateContentRequest, GenerateVideosRequest, GenerationConfig, ImageConfig, Part,
    VideoImage, VideoInstance, VideoParameters,
};

pub const CHAT_LITE_MODEL: &str = "gemini-flash-lite-latest";
pub const CHAT_ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
pub const IMAGE_GEN_MODEL: &str = "gemini-3-pro-image-preview";
pub const IMAGE_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Highest resolution tier the video model offers.
pub const VIDEO_RESOLUTION: &str = "1080p";
const VIDEO_PORTRAIT: &str = "9:16";
const VIDEO_LANDSCAPE: &str = "16:9";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    Content(GenerateContentRequest),
    Video(GenerateVideosRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    pub mode: Mode,
    pub model: &'static str,
    pub payload: ProviderRequest,
}

pub fn build_request(
    mode: Mode,
    prompt: &str,
    attachment: Option<&Attachment>,
    settings: &GenerationSettings,
) -> Result<BuiltRequest, GenError> {
    if prompt.trim().is_empty() && attachment.is_none() {
        return Err(GenError::InvalidInput(
            "Type a prompt or attach an image.".to_string(),
        ));
    }

    let (model, payload) = match mode {
        Mode::Chat => {
            let model = if attachment.is_some() {
                CHAT_ANALYSIS_MODEL
            } else {
                CHAT_LITE_MODEL
            };
            (model, content_request(user_parts(attachment, prompt), None))
        }
        Mode::ImageGen => {
            let config = GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: settings.aspect_ratio.clone(),
                    image_size: settings.image_size.clone(),
                }),
            };
            (
                IMAGE_GEN_MODEL,
                content_request(user_parts(None, prompt), Some(config)),
            )
        }
        Mode::ImageEdit => {
            let attachment = attachment.ok_or_else(|| {
                GenError::InvalidInput("Please upload an image to edit.".to_string())
            })?;
            (
                IMAGE_EDIT_MODEL,
                content_request(user_parts(Some(attachment), prompt), None),
            )
        }
        Mode::VideoGen => {
            let instance = VideoInstance {
                prompt: prompt.to_string(),
                image: attachment.map(|a| VideoImage {
                    bytes_base64_encoded: a.base64.clone(),
                    mime_type: a.mime_type.clone(),
                }),
            };
            let request = GenerateVideosRequest {
                instances: vec![instance],
                parameters: VideoParameters {
                    aspect_ratio: video_aspect_ratio(&settings.aspect_ratio).to_string(),
                    resolution: VIDEO_RESOLUTION.to_string(),
                    sample_count: 1,
                },
            };
            (VIDEO_MODEL, ProviderRequest::Video(request))
        }
    };

    Ok(BuiltRequest {
        mode,
        model,
        payload,
    })
}

/// The video model only renders portrait or landscape; anything else is landscape.
pub fn video_aspect_ratio(requested: &str) -> &'static str {
    if requested == VIDEO_PORTRAIT {
        VIDEO_PORTRAIT
    } else {
        VIDEO_LANDSCAPE
    }
}

/// Attachment first, then the prompt; an empty prompt adds no part.
fn user_parts(attachment: Option<&Attachment>, prompt: &str) -> Vec<Part> {
    let mut parts = Vec::with_capacity(2);
    if let Some(att) = attachment {
        parts.push(Part::inline(att.mime_type.clone(), att.base64.clone()));
    }
    if !prompt.is_empty() {
        parts.push(Part::text(prompt));
    }
    parts
}

fn content_request(parts: Vec<Part>, config: Option<GenerationConfig>) -> ProviderRequest {
    ProviderRequest::Content(GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: config,
    })
}
