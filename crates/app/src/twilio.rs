//! Wire types for the media-stream websocket protocol.
//!
//! Inbound messages arrive as JSON text frames tagged by an `event` field;
//! each event carries its own payload shape, so routing parses the envelope
//! first and the event-specific body second. Outbound messages use the same
//! tagged-JSON convention.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use axum::extract::ws::Message;
use hotline_foundation::StreamError;

/// Minimal first-pass parse: just enough to route on `event`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(rename = "sequenceNumber")]
    pub sequence_number: Option<String>,
    #[serde(rename = "streamSid")]
    pub stream_sid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartMessage {
    #[serde(rename = "streamSid")]
    pub stream_sid: String,
    pub start: StartInfo,
}

#[derive(Debug, Deserialize)]
pub struct StartInfo {
    #[serde(rename = "callSid")]
    pub call_sid: String,
    #[serde(default)]
    pub tracks: Vec<String>,
    /// Parameters attached by the caller-side TwiML, e.g. `fromNumber`.
    #[serde(rename = "customParameters", default)]
    pub custom_parameters: HashMap<String, String>,
    #[serde(rename = "mediaFormat")]
    pub media_format: Option<MediaFormat>,
}

#[derive(Debug, Deserialize)]
pub struct MediaFormat {
    pub encoding: String,
    #[serde(rename = "sampleRate")]
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Deserialize)]
pub struct MediaMessage {
    pub media: MediaPayload,
}

#[derive(Debug, Deserialize)]
pub struct MediaPayload {
    pub track: Option<String>,
    pub chunk: Option<String>,
    pub timestamp: Option<String>,
    /// Base64-encoded audio bytes.
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct DtmfMessage {
    pub dtmf: DtmfPayload,
}

#[derive(Debug, Deserialize)]
pub struct DtmfPayload {
    pub track: Option<String>,
    pub digit: String,
}

/// Messages we send back over the stream.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum OutboundMessage {
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        media: OutboundMedia,
    },
    /// Flushes any audio buffered on the far side. Sent when the caller
    /// starts talking over playback.
    Clear {
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },
}

#[derive(Debug, Serialize)]
pub struct OutboundMedia {
    pub payload: String,
}

impl OutboundMessage {
    pub fn media(stream_sid: &str, payload: String) -> Self {
        OutboundMessage::Media {
            stream_sid: stream_sid.to_string(),
            media: OutboundMedia { payload },
        }
    }

    pub fn clear(stream_sid: &str) -> Self {
        OutboundMessage::Clear {
            stream_sid: stream_sid.to_string(),
        }
    }
}

/// Handle for writing to one stream's websocket. Serializes outbound
/// messages and hands them to the single writer task, so playback can be
/// driven from anywhere that holds a clone.
#[derive(Clone)]
pub struct Playback {
    stream_sid: String,
    tx: mpsc::Sender<Message>,
}

impl Playback {
    pub fn new(stream_sid: String, tx: mpsc::Sender<Message>) -> Self {
        Self { stream_sid, tx }
    }

    pub async fn play_payload(&self, payload: String) -> Result<(), StreamError> {
        self.send(OutboundMessage::media(&self.stream_sid, payload))
            .await
    }

    /// Interrupt in-flight playback on the far side.
    pub async fn clear(&self) -> Result<(), StreamError> {
        self.send(OutboundMessage::clear(&self.stream_sid)).await
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), StreamError> {
        let text = serde_json::to_string(&message)
            .map_err(|e| StreamError::Transport(format!("failed to encode message: {e}")))?;
        self.tx
            .send(Message::Text(text))
            .await
            .map_err(|_| StreamError::Transport("writer task has gone away".into()))
    }
}
