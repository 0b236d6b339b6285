//! Per-connection relay loop.
//!
//! Each inbound `audio` frame becomes one turn: transcribe the clip, send the
//! transcript, ask the chat model for a single-turn reply, send it, then send
//! `end`. Turns on a connection run strictly one after another.

use std::io::Write;
use std::sync::Arc;

use axum::extract::ws::Message;
use base64::prelude::*;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::asr::ASRInterface;
use crate::error::{RelayError, RelayResult};
use crate::llm::StatelessLLMInterface;
use crate::messages::{InboundMessage, OutboundMessage};
use crate::openai_service;
use crate::state::AppState;

pub struct Relay<R, W> {
    client_uid: String,
    asr: Arc<dyn ASRInterface>,
    llm: Arc<dyn StatelessLLMInterface>,
    send_error_frames: bool,
    receiver: R,
    sender: W,
}

impl<R, W, E> Relay<R, W>
where
    R: Stream<Item = Result<Message, E>> + Unpin + Send,
    E: std::fmt::Display,
    W: Sink<Message> + Unpin + Send,
    W::Error: std::fmt::Display,
{
    pub fn new(state: &AppState, client_uid: String, receiver: R, sender: W) -> Self {
        Self {
            client_uid,
            asr: state.asr.clone(),
            llm: state.llm.clone(),
            send_error_frames: state.config.system_config.send_error_frames,
            receiver,
            sender,
        }
    }

    /// Drive the connection until the peer leaves or a step fails.
    pub async fn run(mut self) {
        loop {
            match self.step().await {
                Ok(()) => continue,
                Err(RelayError::PeerDisconnected) => {
                    info!("Client {} disconnected", self.client_uid);
                    break;
                }
                Err(e) => {
                    error!("Closing connection {}: {}", self.client_uid, e);
                    self.close(&e).await;
                    break;
                }
            }
        }
    }

    /// Wait for one frame and process it.
    pub async fn step(&mut self) -> RelayResult<()> {
        let text = match self.receiver.next().await {
            None => return Err(RelayError::PeerDisconnected),
            Some(Err(e)) => {
                debug!("Receive failed for {}: {}", self.client_uid, e);
                return Err(RelayError::PeerDisconnected);
            }
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) => return Err(RelayError::PeerDisconnected),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => return Ok(()),
            Some(Ok(Message::Binary(_))) => {
                return Err(RelayError::MalformedMessage(
                    "binary frames are not supported".to_string(),
                ))
            }
        };

        match InboundMessage::parse(&text)? {
            InboundMessage::Audio { audio } => self.handle_audio(&audio).await,
            InboundMessage::Ignored(msg_type) => {
                debug!("Ignoring message type {:?} from {}", msg_type, self.client_uid);
                Ok(())
            }
        }
    }

    async fn handle_audio(&mut self, audio: &str) -> RelayResult<()> {
        // The decoded clip only lives until the transcription call returns.
        let transcript = {
            let bytes = BASE64_STANDARD.decode(audio)?;
            debug!("Received {} bytes of audio from {}", bytes.len(), self.client_uid);
            transcribe_clip(self.asr.as_ref(), &bytes).await?
        };
        self.send(OutboundMessage::Transcription {
            content: transcript.clone(),
        })
        .await?;

        let reply = self
            .llm
            .chat_completion(vec![openai_service::Message::user(transcript)])
            .await?;
        self.send(OutboundMessage::Text { content: reply }).await?;

        self.send(OutboundMessage::End).await
    }

    async fn send(&mut self, msg: OutboundMessage) -> RelayResult<()> {
        self.sender
            .send(Message::Text(msg.to_json()))
            .await
            .map_err(|e| {
                debug!("Send failed for {}: {}", self.client_uid, e);
                RelayError::PeerDisconnected
            })
    }

    async fn close(&mut self, reason: &RelayError) {
        if self.send_error_frames {
            let frame = OutboundMessage::Error {
                content: reason.to_string(),
            };
            if let Err(e) = self.sender.send(Message::Text(frame.to_json())).await {
                warn!("Failed to send error frame to {}: {}", self.client_uid, e);
            }
        }

        if let Err(e) = self.sender.send(Message::Close(None)).await {
            debug!("Close frame not delivered to {}: {}", self.client_uid, e);
        }
        let _ = self.sender.close().await;
    }
}

/// Write `audio` to a `.webm` temp file, transcribe it, and remove the file.
pub async fn transcribe_clip(asr: &dyn ASRInterface, audio: &[u8]) -> RelayResult<String> {
    let mut file = tempfile::Builder::new()
        .prefix("relay-")
        .suffix(".webm")
        .tempfile()
        .map_err(RelayError::TempFile)?;
    file.write_all(audio).map_err(RelayError::TempFile)?;
    file.flush().map_err(RelayError::TempFile)?;

    let transcript = asr.transcribe(file.path()).await?;
    Ok(transcript)
}
