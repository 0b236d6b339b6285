use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::stateless_llm_interface::StatelessLLMInterface;
use crate::error::UpstreamError;
use crate::openai_service::{ChatRequest, Message, OpenAIServiceClient};

/// OpenAI compatible LLM implementation
pub struct OpenAICompatibleLLM {
    model: String,
    service: Arc<OpenAIServiceClient>,
}

impl OpenAICompatibleLLM {
    pub fn new(model: String, service: Arc<OpenAIServiceClient>) -> Self {
        info!("Initialized OpenAICompatibleLLM: model={}", model);
        Self { model, service }
    }
}

#[async_trait]
impl StatelessLLMInterface for OpenAICompatibleLLM {
    async fn chat_completion(&self, messages: Vec<Message>) -> Result<String, UpstreamError> {
        let request = ChatRequest {
            model: &self.model,
            messages: &messages,
        };

        let response = self.service.chat(request).await?;
        debug!("Chat completion returned {} choices", response.choices.len());

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(UpstreamError::NoChoices)?;
        choice.message.content.ok_or(UpstreamError::EmptyContent)
    }
}
