use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::interface::ASRInterface;
use crate::error::UpstreamError;
use crate::openai_service::OpenAIServiceClient;

/// Whisper transcription through the hosted `/audio/transcriptions` endpoint.
pub struct OpenAIWhisperASR {
    model: String,
    service: Arc<OpenAIServiceClient>,
}

impl OpenAIWhisperASR {
    pub fn new(model: String, service: Arc<OpenAIServiceClient>) -> Self {
        info!("Initialized OpenAIWhisperASR: model={}", model);
        Self { model, service }
    }
}

#[async_trait]
impl ASRInterface for OpenAIWhisperASR {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, UpstreamError> {
        let response = self.service.transcribe(audio_path, &self.model).await?;
        debug!("Transcribed {} chars", response.text.len());
        Ok(response.text)
    }
}
