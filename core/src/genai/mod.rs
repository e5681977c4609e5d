//! Generation pipeline: build the provider request, make sure a paid key is
//! active when the mode needs one, dispatch, and normalize the answer.

use std::sync::Arc;
use std::time::Instant;

use log::Level;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::config::GenAiConfig;
use crate::errors::GenError;
use crate::logging::{log_event, preview};
use crate::types::{Attachment, GenerationResult, GenerationSettings, Mode};

pub mod credentials;
pub mod gateway;
pub mod normalizer;
pub mod request;
pub mod wire;

pub use credentials::{ensure_paid_credential, AlwaysActive, CredentialGate};
pub use gateway::{dispatch, GeminiGateway, GenerationGateway, ProviderResponse};
pub use normalizer::normalize;
pub use request::{build_request, BuiltRequest, ProviderRequest};

pub struct Generator {
    config: GenAiConfig,
    gateway: Arc<dyn GenerationGateway>,
    credentials: Arc<dyn CredentialGate>,
}

impl Generator {
    pub fn new(
        config: GenAiConfig,
        gateway: Arc<dyn GenerationGateway>,
        credentials: Arc<dyn CredentialGate>,
    ) -> Self {
        Self {
            config,
            gateway,
            credentials,
        }
    }

    /// Production wiring: Gemini over HTTP, no interactive key picker.
    pub fn from_config(config: GenAiConfig) -> anyhow::Result<Self> {
        let gateway = GeminiGateway::new(&config)?;
        Ok(Self::new(config, Arc::new(gateway), Arc::new(AlwaysActive)))
    }

    pub fn config(&self) -> &GenAiConfig {
        &self.config
    }

    /// Run one submission end to end. Validation failures return before any
    /// network call. A rejected key triggers one key prompt and one retry.
    pub async fn generate(
        &self,
        mode: Mode,
        prompt: &str,
        attachment: Option<&Attachment>,
        settings: &GenerationSettings,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, GenError> {
        let request = build_request(mode, prompt, attachment, settings)?;
        if mode.requires_paid_credential() {
            ensure_paid_credential(self.credentials.as_ref()).await?;
        }

        match self.run(&request, cancel).await {
            Err(GenError::CredentialMissing) => {
                log_event(
                    Level::Warn,
                    Some(GenError::CredentialMissing.code()),
                    "genai",
                    "Provider rejected the API key, prompting once",
                    Some(GenError::CredentialMissing.explain()),
                    Some(json!({ "mode": mode.as_str(), "model": request.model })),
                );
                self.credentials.request_credential_selection().await?;
                self.run(&request, cancel).await
            }
            other => other,
        }
    }

    async fn run(
        &self,
        request: &BuiltRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, GenError> {
        // Re-read on every run so a key picked after a rejection is used.
        let api_key = self
            .credentials
            .active_key()
            .await
            .unwrap_or_else(|| self.config.api_key.clone());
        let started = Instant::now();
        let response =
            dispatch(self.gateway.as_ref(), request, &api_key, self.config.poll, cancel).await?;
        let result = normalize(request.mode, response, &api_key)?;
        log_event(
            Level::Info,
            Some("GEN-0200"),
            "genai",
            "Generation succeeded",
            None,
            Some(json!({
                "mode": request.mode.as_str(),
                "model": request.model,
                "latency_ms": started.elapsed().as_millis() as u64,
                "media_type": result.media_type,
                "preview": result.text.as_deref().map(preview),
            })),
        );
        Ok(result)
    }
}
