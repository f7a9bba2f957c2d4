use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::pool::{BufferId, BufferPool};
use crate::types::{SessionEvent, SessionState};

/// Per-stream speech session state machine.
///
/// Consumes classifier verdicts one frame at a time, in strict arrival
/// order, and turns them into utterance boundaries. Captured frames are
/// appended to a buffer claimed from the shared pool; on finalization the
/// buffer itself carries ownership forward to the dispatch task while the
/// session resets to `Idle` immediately.
///
/// Timing runs on a media clock derived from the frame count (one tick of
/// `frame_duration_ms` per frame), so transitions are deterministic for a
/// given frame sequence.
pub struct SpeechSession {
    config: SessionConfig,
    pool: Arc<BufferPool>,
    frame_duration_ms: u64,

    state: SessionState,
    start_timestamp_ms: u64,
    last_speech_timestamp_ms: u64,
    consecutive_silent_frames: u32,
    total_speech_frames: u32,
    utterance_frames: usize,
    buffer: Option<BufferId>,

    frames_seen: u64,
    frames_dropped_no_buffer: u64,
}

impl SpeechSession {
    pub fn new(config: SessionConfig, frame_duration_ms: u64, pool: Arc<BufferPool>) -> Self {
        Self {
            config,
            pool,
            frame_duration_ms,
            state: SessionState::Idle,
            start_timestamp_ms: 0,
            last_speech_timestamp_ms: 0,
            consecutive_silent_frames: 0,
            total_speech_frames: 0,
            utterance_frames: 0,
            buffer: None,
            frames_seen: 0,
            frames_dropped_no_buffer: 0,
        }
    }

    /// Feed one classified frame. Returns at most one event.
    pub fn process(&mut self, frame: &[i16], is_speech: bool) -> Option<SessionEvent> {
        let now = self.frames_seen * self.frame_duration_ms;
        self.frames_seen += 1;

        match self.state {
            SessionState::Idle => {
                if !is_speech {
                    return None;
                }

                let buffer = match self.pool.claim() {
                    Ok(id) => id,
                    Err(_) => {
                        // Recoverable: drop the frame, stay Idle, let the
                        // next onset attempt proceed normally.
                        self.frames_dropped_no_buffer += 1;
                        warn!("no speech buffer available, dropping onset frame");
                        return None;
                    }
                };

                self.state = SessionState::Detecting;
                self.start_timestamp_ms = now;
                self.last_speech_timestamp_ms = now;
                self.consecutive_silent_frames = 0;
                self.total_speech_frames = 1;
                self.utterance_frames = 1;
                self.buffer = Some(buffer);
                self.pool.append(buffer, frame);

                debug!(buffer = buffer.index(), timestamp_ms = now, "speech started");
                Some(SessionEvent::SpeechStarted {
                    timestamp_ms: now,
                    buffer,
                })
            }

            SessionState::Detecting => {
                self.capture(frame, is_speech, now);

                // Duration gate, not a silence gate: fires even mid-speech.
                if now - self.start_timestamp_ms > self.config.min_speech_duration_ms {
                    self.state = SessionState::EndingSpeech;
                    debug!("waiting for end of speech");
                }
                None
            }

            SessionState::EndingSpeech => {
                self.capture(frame, is_speech, now);

                let silence_ms =
                    self.consecutive_silent_frames as u64 * self.frame_duration_ms;
                if silence_ms >= self.config.end_of_speech_silence_ms {
                    return Some(self.finalize(now));
                }
                None
            }
        }
    }

    fn capture(&mut self, frame: &[i16], is_speech: bool, now: u64) {
        if let Some(buffer) = self.buffer {
            self.pool.append(buffer, frame);
        }
        self.utterance_frames += 1;

        if is_speech {
            self.last_speech_timestamp_ms = now;
            self.consecutive_silent_frames = 0;
            self.total_speech_frames += 1;
        } else {
            self.consecutive_silent_frames += 1;
        }
    }

    fn finalize(&mut self, now: u64) -> SessionEvent {
        let buffer = self.buffer.take();
        let speech_frames = self.total_speech_frames;
        let frames = self.utterance_frames;
        let duration_ms = now - self.start_timestamp_ms;

        let event = match buffer {
            Some(id) if speech_frames >= self.config.min_speech_frames => {
                self.pool.mark_significant(id);
                debug!(
                    buffer = id.index(),
                    frames, speech_frames, duration_ms, "utterance ready"
                );
                SessionEvent::UtteranceReady {
                    buffer: id,
                    frames,
                    speech_frames,
                    duration_ms,
                }
            }
            other => {
                // Too short to be meaningful: no dispatch.
                if let Some(id) = other {
                    self.pool.release(id);
                }
                debug!(speech_frames, "utterance too short, discarding");
                SessionEvent::UtteranceDiscarded { speech_frames }
            }
        };

        self.reset();
        event
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.start_timestamp_ms = 0;
        self.last_speech_timestamp_ms = 0;
        self.consecutive_silent_frames = 0;
        self.total_speech_frames = 0;
        self.utterance_frames = 0;
        self.buffer = None;
    }

    /// Abandon the in-progress utterance (stream teardown or transport
    /// failure): release any held claim, dispatch nothing.
    pub fn abort(&mut self) {
        if let Some(id) = self.buffer.take() {
            self.pool.release(id);
        }
        self.reset();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frames_dropped_no_buffer(&self) -> u64 {
        self.frames_dropped_no_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FRAME_DURATION_MS;

    fn session_with_pool(pool_size: usize) -> (SpeechSession, Arc<BufferPool>) {
        let pool = Arc::new(BufferPool::new(pool_size));
        let session = SpeechSession::new(SessionConfig::default(), FRAME_DURATION_MS, pool.clone());
        (session, pool)
    }

    #[test]
    fn test_silence_keeps_session_idle() {
        let (mut session, pool) = session_with_pool(10);
        let frame = [0i16; 160];

        for _ in 0..40 {
            assert_eq!(session.process(&frame, false), None);
        }
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(pool.available(), 10);
    }

    #[test]
    fn test_onset_claims_buffer_and_captures_first_frame() {
        let (mut session, pool) = session_with_pool(10);
        let frame = [1000i16; 160];

        let event = session.process(&frame, true);
        let buffer = match event {
            Some(SessionEvent::SpeechStarted { buffer, timestamp_ms }) => {
                assert_eq!(timestamp_ms, 0);
                buffer
            }
            other => panic!("expected SpeechStarted, got {:?}", other),
        };

        assert_eq!(session.state(), SessionState::Detecting);
        assert_eq!(pool.available(), 9);
        let frames = pool.with_buffer(buffer, |f, _| f.len()).unwrap();
        assert_eq!(frames, 1);
    }

    #[test]
    fn test_exhausted_pool_drops_frame_and_stays_idle() {
        let (mut session, pool) = session_with_pool(1);
        let claimed = pool.claim().unwrap();
        let frame = [1000i16; 160];

        assert_eq!(session.process(&frame, true), None);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.frames_dropped_no_buffer(), 1);

        // After a release the next onset proceeds normally
        pool.release(claimed);
        assert!(matches!(
            session.process(&frame, true),
            Some(SessionEvent::SpeechStarted { .. })
        ));
    }

    #[test]
    fn test_abort_releases_claim_without_dispatch() {
        let (mut session, pool) = session_with_pool(10);
        let frame = [1000i16; 160];

        session.process(&frame, true);
        assert_eq!(pool.available(), 9);

        session.abort();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(pool.available(), 10);
    }
}
