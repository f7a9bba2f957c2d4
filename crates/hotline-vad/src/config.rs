use serde::{Deserialize, Serialize};

use super::constants::{FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};

/// Tunables for the multi-criteria frame classifier and the adaptive
/// noise-floor tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VadConfig {
    /// Absolute minimum energy threshold. The adaptive threshold never
    /// drops below this, regardless of history content.
    pub min_energy: f64,

    /// Noise floor seed used before any history has accumulated.
    pub initial_noise_floor: f64,

    /// Minimum energy/noise-floor ratio for a frame to count as speech.
    pub min_signal_to_noise: f64,

    /// Number of recent frame energies kept in the circular history.
    pub energy_history_len: usize,

    /// Fraction of the previous noise floor retained on each update.
    /// 0.9 trades responsiveness for stability: the floor tracks quiet
    /// frames and reacts slowly to transient loud noise. Tunable.
    pub noise_floor_smoothing: f64,

    /// Zero-crossing-rate band for plausible speech. Below the lower bound
    /// is a pure tone or DC; above the upper bound is broadband noise.
    pub zcr_min: f64,
    pub zcr_max: f64,

    /// Minimum summed confidence for a speech verdict.
    pub min_confidence: f64,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            min_energy: 100.0,
            initial_noise_floor: 50.0,
            min_signal_to_noise: 2.0,
            energy_history_len: 100,
            noise_floor_smoothing: 0.9,
            zcr_min: 0.01,
            zcr_max: 0.5,
            min_confidence: 0.7,
        }
    }
}

/// Timing thresholds for the speech session state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Time after onset before the session starts watching for sustained
    /// trailing silence. A duration gate, not a silence gate.
    pub min_speech_duration_ms: u64,

    /// Consecutive silence required to conclude the utterance is over.
    pub end_of_speech_silence_ms: u64,

    /// Utterances with fewer classified speech frames than this are
    /// discarded without dispatch.
    pub min_speech_frames: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_speech_duration_ms: 500,
            end_of_speech_silence_ms: 1500,
            min_speech_frames: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub vad: VadConfig,
    pub session: SessionConfig,
    pub frame_size_samples: usize,
    pub sample_rate_hz: u32,
    /// Number of reusable utterance buffers shared with dispatch tasks.
    pub pool_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vad: VadConfig::default(),
            session: SessionConfig::default(),
            frame_size_samples: FRAME_SIZE_SAMPLES,
            sample_rate_hz: SAMPLE_RATE_HZ,
            pool_size: 10,
        }
    }
}

impl EngineConfig {
    pub fn frame_duration_ms(&self) -> u64 {
        (self.frame_size_samples as u64 * 1000) / self.sample_rate_hz as u64
    }
}
