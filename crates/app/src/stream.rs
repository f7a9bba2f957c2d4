//! Per-connection media-stream loop.
//!
//! One websocket connection carries one phone call. The loop routes
//! inbound events, feeds decoded audio frames to the segmentation engine,
//! and reacts to session events: barge-in on speech onset, detached
//! dispatch on a finished utterance. A single writer task owns the
//! outbound half so playback and the loop never contend for the sink.

use std::sync::Arc;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use hotline_audio::decode_media_payload;
use hotline_foundation::StreamError;
use hotline_vad::{SegmentationEngine, SessionEvent};
use hotline_vad_earshot::EarshotDetector;

use crate::dispatch::{self, DispatchContext};
use crate::twilio::{DtmfMessage, Envelope, MediaMessage, Playback, StartMessage};
use crate::AppState;

/// Whether the loop keeps reading after handling an event.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Live state for one call, created on the `start` event.
struct StreamContext {
    stream_sid: String,
    from_number: String,
    engine: SegmentationEngine,
}

pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: Arc<AppState>, socket: WebSocket) {
    let (sink, receiver) = socket.split();

    let (tx, rx) = mpsc::channel::<Message>(64);
    let writer = tokio::spawn(write_loop(sink, rx));

    run_stream(state, receiver, tx).await;

    // Dropping the sender ends the writer once queued messages drain.
    if let Err(err) = writer.await {
        error!(error = %err, "writer task panicked");
    }
}

async fn run_stream(
    state: Arc<AppState>,
    mut receiver: SplitStream<WebSocket>,
    tx: mpsc::Sender<Message>,
) {
    let mut ctx: Option<StreamContext> = None;

    while let Some(message) = receiver.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                debug!("peer closed the stream");
                break;
            }
            // Pings are answered by the library; ignore other frame kinds.
            Ok(_) => continue,
            Err(err) => {
                warn!(error = %err, "websocket read failed");
                break;
            }
        };

        match route_event(&state, &mut ctx, &tx, &text).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop) => break,
            Err(err) => {
                warn!(error = %err, "stream terminated on error");
                let _ = tx
                    .send(Message::Close(Some(CloseFrame {
                        code: close_code::UNSUPPORTED,
                        reason: err.to_string().into(),
                    })))
                    .await;
                break;
            }
        }
    }

    // Abandon any utterance in flight so its buffer returns to the pool.
    if let Some(mut ctx) = ctx.take() {
        ctx.engine.abort();
        info!(stream_sid = %ctx.stream_sid, "stream closed");
    }
}

async fn write_loop(mut sink: SplitSink<WebSocket, Message>, mut rx: mpsc::Receiver<Message>) {
    while let Some(message) = rx.recv().await {
        if sink.send(message).await.is_err() {
            break;
        }
    }
    let _ = sink.close().await;
}

async fn route_event(
    state: &Arc<AppState>,
    ctx: &mut Option<StreamContext>,
    tx: &mpsc::Sender<Message>,
    text: &str,
) -> Result<Flow, StreamError> {
    let envelope: Envelope = serde_json::from_str(text)
        .map_err(|_| StreamError::Transport("invalid message format".into()))?;

    match envelope.event.as_str() {
        "start" => {
            let start: StartMessage = serde_json::from_str(text)
                .map_err(|e| StreamError::Transport(format!("malformed start event: {e}")))?;

            let from_number = start
                .start
                .custom_parameters
                .get("fromNumber")
                .cloned()
                .unwrap_or_default();
            info!(
                stream_sid = %start.stream_sid,
                call_sid = %start.start.call_sid,
                from_number = %from_number,
                "stream started"
            );

            let engine = SegmentationEngine::new(
                state.engine_config.clone(),
                Box::new(EarshotDetector::default()),
            );
            *ctx = Some(StreamContext {
                stream_sid: start.stream_sid.clone(),
                from_number,
                engine,
            });

            if let Some(greeting) = &state.greeting_payload {
                let playback = Playback::new(start.stream_sid, tx.clone());
                playback.play_payload(greeting.clone()).await?;
            }
            Ok(Flow::Continue)
        }

        "media" => {
            let ctx = ctx
                .as_mut()
                .ok_or_else(|| StreamError::Transport("media event before start".into()))?;

            let media: MediaMessage = serde_json::from_str(text)
                .map_err(|e| StreamError::Transport(format!("malformed media event: {e}")))?;

            let frame = decode_media_payload(&media.media.payload)
                .map_err(|e| StreamError::Decode(e.to_string()))?;

            let event = ctx
                .engine
                .process_frame(&frame)
                .map_err(|e| StreamError::Classification(e.to_string()))?;

            match event {
                Some(SessionEvent::SpeechStarted { timestamp_ms, .. }) => {
                    debug!(
                        stream_sid = %ctx.stream_sid,
                        timestamp_ms,
                        "speech onset, clearing playback"
                    );
                    let playback = Playback::new(ctx.stream_sid.clone(), tx.clone());
                    playback.clear().await?;
                }
                Some(SessionEvent::UtteranceReady {
                    buffer,
                    frames,
                    speech_frames,
                    duration_ms,
                }) => {
                    info!(
                        stream_sid = %ctx.stream_sid,
                        frames,
                        speech_frames,
                        duration_ms,
                        "utterance ready, dispatching"
                    );
                    let _ = dispatch::spawn(
                        DispatchContext {
                            pool: ctx.engine.pool().clone(),
                            workflow: state.workflow.clone(),
                            stream_sid: ctx.stream_sid.clone(),
                            from_number: ctx.from_number.clone(),
                        },
                        buffer,
                    );
                }
                Some(SessionEvent::UtteranceDiscarded { speech_frames }) => {
                    debug!(
                        stream_sid = %ctx.stream_sid,
                        speech_frames,
                        "utterance too short, discarded"
                    );
                }
                None => {}
            }
            Ok(Flow::Continue)
        }

        "dtmf" => {
            let dtmf: DtmfMessage = serde_json::from_str(text)
                .map_err(|e| StreamError::Transport(format!("malformed dtmf event: {e}")))?;
            let sid = ctx.as_ref().map(|c| c.stream_sid.as_str()).unwrap_or("");
            info!(stream_sid = %sid, digit = %dtmf.dtmf.digit, "dtmf received");
            Ok(Flow::Continue)
        }

        "stop" => {
            if let Some(ctx) = ctx.as_ref() {
                info!(stream_sid = %ctx.stream_sid, "stop event received");
            }
            Ok(Flow::Stop)
        }

        other => Err(StreamError::Transport(format!("unknown event: {other}"))),
    }
}
