use crate::pool::BufferId;

/// Events emitted by the speech session as it consumes classified frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// Speech onset confirmed; the caller should halt any playback toward
    /// the line (barge-in).
    SpeechStarted {
        timestamp_ms: u64,
        buffer: BufferId,
    },

    /// A completed utterance is ready for dispatch. Ownership of the
    /// claimed buffer transfers to whoever handles this event.
    UtteranceReady {
        buffer: BufferId,
        /// Total frames captured, onset through end-of-speech inclusive.
        frames: usize,
        /// Frames classified as speech within the utterance.
        speech_frames: u32,
        duration_ms: u64,
    },

    /// The utterance was too short to be meaningful; its buffer has
    /// already been released.
    UtteranceDiscarded { speech_frames: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Confirmed onset; accumulating frames.
    Detecting,
    /// Accumulating while watching for sustained trailing silence.
    EndingSpeech,
}

/// Per-frame classification outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameVerdict {
    pub is_speech: bool,
    pub confidence: f64,
    pub energy: f64,
    pub zero_crossing_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    pub frames_processed: u64,

    pub speech_frames: u64,

    pub utterances_ready: u64,

    pub utterances_discarded: u64,

    /// Onset frames dropped because every buffer was claimed.
    pub frames_dropped_no_buffer: u64,

    pub current_noise_floor: f64,

    pub current_threshold: f64,

    pub last_energy: f64,
}
