use async_trait::async_trait;
use std::path::Path;

use crate::error::UpstreamError;

/// Speech-to-text collaborator.
#[async_trait]
pub trait ASRInterface: Send + Sync {
    /// Transcribe the audio file at `audio_path` (WebM container).
    async fn transcribe(&self, audio_path: &Path) -> Result<String, UpstreamError>;
}
