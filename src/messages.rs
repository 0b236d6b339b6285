//! Wire format of the `/ws` endpoint.
//!
//! Inbound frames are JSON objects tagged by `type`; only `"audio"` carries a
//! schema. Outbound frames are produced per turn in the order
//! `transcription`, `text`, `end`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelayError, RelayResult};

/// A parsed client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Base64 encoded WebM clip.
    Audio { audio: String },
    /// Any other (or missing) `type` tag. Carries the tag for logging.
    Ignored(Option<String>),
}

impl InboundMessage {
    pub fn parse(text: &str) -> RelayResult<Self> {
        let msg: Value = serde_json::from_str(text)?;
        let obj = msg
            .as_object()
            .ok_or_else(|| {
                RelayError::MalformedMessage("frame is not a JSON object".to_string())
            })?;

        match obj.get("type").and_then(|v| v.as_str()) {
            Some("audio") => {
                let audio = obj
                    .get("audio")
                    .ok_or_else(|| {
                        RelayError::MalformedMessage(
                            "audio frame without `audio` field".to_string(),
                        )
                    })?
                    .as_str()
                    .ok_or_else(|| {
                        RelayError::MalformedMessage("`audio` field is not a string".to_string())
                    })?;
                Ok(InboundMessage::Audio {
                    audio: audio.to_string(),
                })
            }
            other => Ok(InboundMessage::Ignored(other.map(|s| s.to_string()))),
        }
    }
}

/// Frames sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Transcription { content: String },
    Text { content: String },
    End,
    /// Only sent when `send_error_frames` is enabled, right before closing.
    Error { content: String },
}

impl OutboundMessage {
    pub fn to_json(&self) -> String {
        // Serializing a tagged enum of strings cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_audio_frame() {
        let msg = InboundMessage::parse(r#"{"type":"audio","audio":"AAEC"}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Audio {
                audio: "AAEC".to_string()
            }
        );
    }

    #[test]
    fn other_types_are_ignored() {
        assert_eq!(
            InboundMessage::parse(r#"{"type":"ping"}"#).unwrap(),
            InboundMessage::Ignored(Some("ping".to_string()))
        );
        assert_eq!(
            InboundMessage::parse(r#"{"audio":"AAEC"}"#).unwrap(),
            InboundMessage::Ignored(None)
        );
        // A non-string tag is treated as missing.
        assert_eq!(
            InboundMessage::parse(r#"{"type":3}"#).unwrap(),
            InboundMessage::Ignored(None)
        );
    }

    #[test]
    fn malformed_frames_are_rejected() {
        for frame in [
            "not json",
            "[1,2,3]",
            "\"audio\"",
            r#"{"type":"audio"}"#,
            r#"{"type":"audio","audio":42}"#,
        ] {
            assert!(
                matches!(InboundMessage::parse(frame), Err(RelayError::MalformedMessage(_))),
                "expected {frame:?} to be malformed"
            );
        }
    }

    #[test]
    fn outbound_wire_shapes() {
        let transcription: Value = serde_json::from_str(
            &OutboundMessage::Transcription {
                content: "hello".to_string(),
            }
            .to_json(),
        )
        .unwrap();
        assert_eq!(transcription, json!({"type": "transcription", "content": "hello"}));

        let text: Value = serde_json::from_str(
            &OutboundMessage::Text {
                content: "hi there".to_string(),
            }
            .to_json(),
        )
        .unwrap();
        assert_eq!(text, json!({"type": "text", "content": "hi there"}));

        let end: Value = serde_json::from_str(&OutboundMessage::End.to_json()).unwrap();
        assert_eq!(end, json!({"type": "end"}));
    }
}
