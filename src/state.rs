use std::sync::Arc;
use uuid::Uuid;

use crate::asr::{ASRInterface, OpenAIWhisperASR};
use crate::config::Config;
use crate::llm::{OpenAICompatibleLLM, StatelessLLMInterface};
use crate::openai_service::OpenAIServiceClient;

/// Immutable per-process state shared by every connection.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub asr: Arc<dyn ASRInterface>,
    pub llm: Arc<dyn StatelessLLMInterface>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let openai = &config.openai;
        if openai.api_key.is_none() {
            tracing::warn!("No OpenAI API key configured; upstream calls will be rejected");
        }

        let service = Arc::new(OpenAIServiceClient::new(openai));
        let asr = Arc::new(OpenAIWhisperASR::new(
            openai.transcription_model.clone(),
            service.clone(),
        ));
        let llm = Arc::new(OpenAICompatibleLLM::new(openai.chat_model.clone(), service));

        Self::with_collaborators(config, asr, llm)
    }

    pub fn with_collaborators(
        config: Config,
        asr: Arc<dyn ASRInterface>,
        llm: Arc<dyn StatelessLLMInterface>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            asr,
            llm,
        }
    }

    pub fn generate_client_uid(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
