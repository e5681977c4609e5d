//! Provider boundary: the `GenerationGateway` trait, its Gemini REST
//! implementation, and the dispatcher that runs synchronous calls or the
//! submit-then-poll loop for video jobs.

use async_trait::async_trait;
use log::Level;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use anyhow::Context;

use crate::config::{GenAiConfig, PollPolicy};
use crate::errors::GenError;
use crate::logging::log_event;

use super::request::{BuiltRequest, ProviderRequest};
use super::wire::{
    ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerateVideosRequest,
    OperationHandle, VideoOperation,
};

/// Every call carries the API key to use, so a key picked mid-session takes
/// effect on the next request.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenError>;

    /// Start a video job; the returned operation is usually not done yet.
    async fn submit_video(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateVideosRequest,
    ) -> Result<VideoOperation, GenError>;

    async fn poll_video(
        &self,
        api_key: &str,
        handle: &OperationHandle,
    ) -> Result<VideoOperation, GenError>;
}

/// Raw provider output for one dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResponse {
    Content(GenerateContentResponse),
    /// A finished video operation.
    Video(VideoOperation),
}

pub async fn dispatch(
    gateway: &dyn GenerationGateway,
    request: &BuiltRequest,
    api_key: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<ProviderResponse, GenError> {
    match &request.payload {
        ProviderRequest::Content(body) => {
            let response = tokio::select! {
                _ = cancel.cancelled() => return Err(GenError::Cancelled),
                res = gateway.generate_content(api_key, request.model, body) => res?,
            };
            Ok(ProviderResponse::Content(response))
        }
        ProviderRequest::Video(body) => {
            let submitted = tokio::select! {
                _ = cancel.cancelled() => return Err(GenError::Cancelled),
                res = gateway.submit_video(api_key, request.model, body) => res?,
            };
            let finished = await_video(gateway, api_key, submitted, policy, cancel).await?;
            Ok(ProviderResponse::Video(finished))
        }
    }
}

/// Poll at a fixed interval until the job reports `done`.
async fn await_video(
    gateway: &dyn GenerationGateway,
    api_key: &str,
    mut operation: VideoOperation,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<VideoOperation, GenError> {
    let handle = operation.handle();
    if !operation.done && handle.as_str().is_empty() {
        return Err(GenError::GenerationFailed(
            "Video job was accepted without an operation handle".to_string(),
        ));
    }
    log_event(
        Level::Info,
        Some("VID-0100"),
        "genai.video",
        "Video job submitted",
        None,
        Some(json!({ "operation": handle.as_str() })),
    );

    let mut attempts: u32 = 0;
    while !operation.done {
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(GenError::PollTimeout { attempts });
        }
        tokio::select! {
            _ = cancel.cancelled() => return Err(GenError::Cancelled),
            _ = sleep(policy.interval) => {}
        }
        attempts += 1;
        operation = tokio::select! {
            _ = cancel.cancelled() => return Err(GenError::Cancelled),
            res = gateway.poll_video(api_key, &handle) => res?,
        };
        log::debug!(target: "chaitanya", "video job {} poll #{attempts}: done={}", handle.as_str(), operation.done);
    }

    if let Some(err) = operation.error.take() {
        log_event(
            Level::Warn,
            Some("VID-0201"),
            "genai.video",
            "Video job failed",
            None,
            Some(json!({ "operation": handle.as_str(), "code": err.code, "error": err.message })),
        );
        let message = if err.message.is_empty() {
            "Video generation failed".to_string()
        } else {
            err.message
        };
        return Err(GenError::GenerationFailed(message));
    }

    log_event(
        Level::Info,
        Some("VID-0200"),
        "genai.video",
        "Video job finished",
        None,
        Some(json!({ "operation": handle.as_str(), "polls": attempts })),
    );
    Ok(operation)
}

/// Gemini REST client.
pub struct GeminiGateway {
    client: Client,
    base_url: String,
}

impl GeminiGateway {
    pub fn new(config: &GenAiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("Chaitanya-Core/0.1")
            .build()
            .context("failed to construct HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        api_key: &str,
        url: String,
        body: &B,
    ) -> Result<T, GenError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenError> {
        self.post(api_key, self.model_url(model, "generateContent"), request)
            .await
    }

    async fn submit_video(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateVideosRequest,
    ) -> Result<VideoOperation, GenError> {
        self.post(api_key, self.model_url(model, "predictLongRunning"), request)
            .await
    }

    async fn poll_video(
        &self,
        api_key: &str,
        handle: &OperationHandle,
    ) -> Result<VideoOperation, GenError> {
        let url = format!("{}/{}", self.base_url, handle.as_str().trim_start_matches('/'));
        let response = self
            .client
            .get(url)
            .header("x-goog-api-key", api_key)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GenError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(map_status(status, &body));
    }
    Ok(serde_json::from_slice(&body)?)
}

fn map_status(status: StatusCode, body: &[u8]) -> GenError {
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return GenError::CredentialMissing;
    }
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    GenError::Provider {
        status: status.as_u16(),
        message,
    }
}
