//! Reduces provider responses to a [`GenerationResult`].

use reqwest::Url;

use crate::errors::GenError;
use crate::types::{data_url, GenerationResult, MediaType, Mode};

use super::gateway::ProviderResponse;
use super::wire::GenerateContentResponse;

const IMAGE_GEN_CAPTION: &str = "Generated with Gemini 3 Pro Image";
const IMAGE_EDIT_CAPTION: &str = "Edited with Gemini 2.5 Flash Image";

/// `api_key` is embedded into video links so the viewer can fetch them directly.
pub fn normalize(
    mode: Mode,
    response: ProviderResponse,
    api_key: &str,
) -> Result<GenerationResult, GenError> {
    match (mode, response) {
        (Mode::Chat, ProviderResponse::Content(resp)) => {
            check_blocked(&resp)?;
            resp.text()
                .filter(|t| !t.trim().is_empty())
                .map(GenerationResult::text)
                .ok_or_else(|| GenError::GenerationFailed("The model returned no text.".into()))
        }
        (Mode::ImageGen, ProviderResponse::Content(resp)) => {
            check_blocked(&resp)?;
            inline_image(&resp, IMAGE_GEN_CAPTION)
                .ok_or_else(|| GenError::GenerationFailed("No image generated".into()))
        }
        (Mode::ImageEdit, ProviderResponse::Content(resp)) => {
            check_blocked(&resp)?;
            if let Some(result) = inline_image(&resp, IMAGE_EDIT_CAPTION) {
                return Ok(result);
            }
            // The model may decline the edit and explain why in prose.
            resp.text()
                .filter(|t| !t.trim().is_empty())
                .map(GenerationResult::text)
                .ok_or_else(|| GenError::GenerationFailed("Image editing failed.".into()))
        }
        (Mode::VideoGen, ProviderResponse::Video(operation)) => {
            let uri = operation.video_uri().ok_or_else(|| {
                GenError::GenerationFailed("Video generation failed or returned no URI".into())
            })?;
            Ok(GenerationResult::media(
                signed_video_url(uri, api_key)?,
                MediaType::Video,
                None,
            ))
        }
        (mode, _) => Err(GenError::GenerationFailed(format!(
            "Unexpected provider response for {} mode",
            mode.as_str()
        ))),
    }
}

fn inline_image(resp: &GenerateContentResponse, caption: &str) -> Option<GenerationResult> {
    resp.first_inline().map(|blob| {
        GenerationResult::media(
            data_url(&blob.mime_type, &blob.data),
            MediaType::Image,
            Some(caption),
        )
    })
}

fn check_blocked(resp: &GenerateContentResponse) -> Result<(), GenError> {
    match resp.block_reason() {
        Some(reason) if resp.candidates.is_empty() => Err(GenError::GenerationFailed(format!(
            "The request was blocked ({reason})."
        ))),
        _ => Ok(()),
    }
}

fn signed_video_url(uri: &str, api_key: &str) -> Result<String, GenError> {
    let mut url = Url::parse(uri)
        .map_err(|err| GenError::GenerationFailed(format!("Invalid video URI {uri}: {err}")))?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url.into())
}
