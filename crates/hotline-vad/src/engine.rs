use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use crate::classify::Classifier;
use crate::config::EngineConfig;
use crate::detector::{DetectorError, FrameDetector};
use crate::energy::{rms_energy, zero_crossing_rate};
use crate::pool::BufferPool;
use crate::session::SpeechSession;
use crate::threshold::AdaptiveThreshold;
use crate::types::{EngineMetrics, SessionEvent};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("expected {expected} samples per frame, got {got}")]
    InvalidFrame { expected: usize, got: usize },

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

/// The composed per-stream segmentation pipeline: external detector,
/// feature extraction, adaptive threshold, classifier, and speech session,
/// run synchronously and in-line per frame. Frames must be fed in strict
/// arrival order.
pub struct SegmentationEngine {
    config: EngineConfig,
    detector: Box<dyn FrameDetector>,
    threshold: AdaptiveThreshold,
    classifier: Classifier,
    session: SpeechSession,
    pool: Arc<BufferPool>,
    metrics: EngineMetrics,
}

impl SegmentationEngine {
    pub fn new(config: EngineConfig, detector: Box<dyn FrameDetector>) -> Self {
        let pool = Arc::new(BufferPool::new(config.pool_size));
        Self::with_pool(config, detector, pool)
    }

    pub fn with_pool(
        config: EngineConfig,
        detector: Box<dyn FrameDetector>,
        pool: Arc<BufferPool>,
    ) -> Self {
        Self {
            threshold: AdaptiveThreshold::new(&config.vad),
            classifier: Classifier::new(config.vad.clone()),
            session: SpeechSession::new(
                config.session.clone(),
                config.frame_duration_ms(),
                pool.clone(),
            ),
            detector,
            pool,
            metrics: EngineMetrics::default(),
            config,
        }
    }

    /// Classify one frame and advance the session state machine.
    pub fn process_frame(&mut self, frame: &[i16]) -> Result<Option<SessionEvent>, EngineError> {
        if frame.len() != self.config.frame_size_samples {
            return Err(EngineError::InvalidFrame {
                expected: self.config.frame_size_samples,
                got: frame.len(),
            });
        }

        let voiced = self.detector.is_voice(frame)?;
        let energy = rms_energy(frame);
        let zcr = zero_crossing_rate(frame);

        // Updated every frame regardless of the verdict so the floor
        // adapts to both speech and silence.
        self.threshold.update(energy);

        let verdict = self.classifier.classify(voiced, energy, zcr, &self.threshold);
        let event = self.session.process(frame, verdict.is_speech);

        self.update_metrics(verdict.is_speech, energy, event.as_ref());

        if self.metrics.frames_processed % 500 == 0 {
            trace!(
                frames = self.metrics.frames_processed,
                noise_floor = self.threshold.noise_floor(),
                threshold = self.threshold.threshold(),
                avg_energy = self.threshold.average_energy(),
                state = ?self.session.state(),
                "segmentation progress"
            );
        }

        Ok(event)
    }

    fn update_metrics(&mut self, is_speech: bool, energy: f64, event: Option<&SessionEvent>) {
        self.metrics.frames_processed += 1;
        if is_speech {
            self.metrics.speech_frames += 1;
        }
        match event {
            Some(SessionEvent::UtteranceReady { .. }) => self.metrics.utterances_ready += 1,
            Some(SessionEvent::UtteranceDiscarded { .. }) => {
                self.metrics.utterances_discarded += 1
            }
            _ => {}
        }
        self.metrics.frames_dropped_no_buffer = self.session.frames_dropped_no_buffer();
        self.metrics.current_noise_floor = self.threshold.noise_floor();
        self.metrics.current_threshold = self.threshold.threshold();
        self.metrics.last_energy = energy;
    }

    /// Abandon the in-progress utterance and release any claimed buffer.
    pub fn abort(&mut self) {
        self.session.abort();
        self.detector.reset();
        self.threshold.reset(&self.config.vad);
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
