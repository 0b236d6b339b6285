use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::openai_service::Message;

/// Interface for a stateless language model
/// Stateless means the LLM keeps no history; every call carries its full
/// conversation in `messages`
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    /// Return the content of the first reply candidate
    async fn chat_completion(&self, messages: Vec<Message>) -> Result<String, UpstreamError>;
}
