//! Utterance dispatch.
//!
//! When the session hands over a finished utterance, its buffer stays
//! claimed and is carried into a detached task here. The task converts the
//! PCM to WAV, posts it to the workflow engine, and releases the buffer on
//! every exit path so the pool never leaks a slot.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use hotline_audio::encode_wav;
use hotline_foundation::StreamError;
use hotline_vad::{BufferId, BufferPool, SAMPLE_RATE_HZ};

use crate::workflow::{WorkflowClient, WorkflowRequest};

/// Everything a dispatch task needs, detached from the stream loop.
#[derive(Clone)]
pub struct DispatchContext {
    pub pool: Arc<BufferPool>,
    pub workflow: Arc<dyn WorkflowClient>,
    pub stream_sid: String,
    pub from_number: String,
}

/// Fire-and-forget dispatch of one utterance buffer.
pub fn spawn(ctx: DispatchContext, buffer: BufferId) -> JoinHandle<()> {
    tokio::spawn(dispatch_utterance(ctx, buffer))
}

async fn dispatch_utterance(ctx: DispatchContext, buffer: BufferId) {
    if let Err(err) = process_utterance(&ctx, buffer).await {
        warn!(
            stream_sid = %ctx.stream_sid,
            error = %err,
            "utterance dispatch failed"
        );
    }
    // The buffer must come back regardless of outcome.
    ctx.pool.release(buffer);
}

async fn process_utterance(ctx: &DispatchContext, buffer: BufferId) -> Result<(), StreamError> {
    let frames = ctx.pool.take_frames(buffer);
    if frames.is_empty() {
        debug!(stream_sid = %ctx.stream_sid, "empty utterance buffer, nothing to dispatch");
        return Ok(());
    }

    let pcm: Vec<i16> = frames.concat();
    let wav = encode_wav(&pcm, SAMPLE_RATE_HZ)
        .map_err(|e| StreamError::Dispatch(format!("wav encoding failed: {e}")))?;

    debug!(
        stream_sid = %ctx.stream_sid,
        frames = frames.len(),
        wav_bytes = wav.len(),
        "posting utterance to workflow"
    );

    let replies = ctx
        .workflow
        .trigger(WorkflowRequest {
            from_number: ctx.from_number.clone(),
            dial_number: None,
            audio_wav: wav,
        })
        .await
        .map_err(|e| StreamError::Dispatch(e.to_string()))?;

    let reply = replies
        .first()
        .ok_or_else(|| StreamError::Dispatch("workflow returned no response items".into()))?;

    info!(
        stream_sid = %ctx.stream_sid,
        answer = %reply.answer,
        should_end = ?reply.should_end,
        "workflow reply received"
    );
    Ok(())
}
