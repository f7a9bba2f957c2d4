use earshot::{VoiceActivityDetector, VoiceActivityProfile};
use hotline_vad::constants::{FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};
use hotline_vad::detector::{DetectorError, FrameDetector};

/// Aggressiveness modes of the underlying WebRTC detector. Higher modes
/// report voice less often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggressiveness {
    Quality,
    LowBitrate,
    Aggressive,
    VeryAggressive,
}

impl Aggressiveness {
    /// Map from the 0-3 mode numbering the reference detector exposes.
    pub fn from_mode(mode: u8) -> Self {
        match mode {
            0 => Self::Quality,
            1 => Self::LowBitrate,
            2 => Self::Aggressive,
            _ => Self::VeryAggressive,
        }
    }

    fn profile(self) -> VoiceActivityProfile {
        match self {
            Self::Quality => VoiceActivityProfile::QUALITY,
            Self::LowBitrate => VoiceActivityProfile::LBR,
            Self::Aggressive => VoiceActivityProfile::AGGRESSIVE,
            Self::VeryAggressive => VoiceActivityProfile::VERY_AGGRESSIVE,
        }
    }
}

impl Default for Aggressiveness {
    fn default() -> Self {
        // Mode 3 in the reference configuration.
        Self::VeryAggressive
    }
}

/// Adapts the `earshot` WebRTC-VAD port to the `FrameDetector` seam at
/// the 8kHz telephony rate.
pub struct EarshotDetector {
    detector: VoiceActivityDetector,
}

impl EarshotDetector {
    pub fn new(aggressiveness: Aggressiveness) -> Self {
        Self {
            detector: VoiceActivityDetector::new(aggressiveness.profile()),
        }
    }
}

impl Default for EarshotDetector {
    fn default() -> Self {
        Self::new(Aggressiveness::default())
    }
}

impl FrameDetector for EarshotDetector {
    fn is_voice(&mut self, frame: &[i16]) -> Result<bool, DetectorError> {
        self.detector
            .predict_8khz(frame)
            .map_err(|e| DetectorError(format!("{:?}", e)))
    }

    fn reset(&mut self) {
        self.detector.reset();
    }

    fn required_sample_rate(&self) -> u32 {
        SAMPLE_RATE_HZ
    }

    fn required_frame_size_samples(&self) -> usize {
        FRAME_SIZE_SAMPLES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_mapping() {
        assert_eq!(Aggressiveness::from_mode(0), Aggressiveness::Quality);
        assert_eq!(Aggressiveness::from_mode(3), Aggressiveness::VeryAggressive);
        assert_eq!(Aggressiveness::from_mode(250), Aggressiveness::VeryAggressive);
    }

    #[test]
    fn test_detector_accepts_20ms_telephony_frames() {
        let mut detector = EarshotDetector::default();
        let silence = vec![0i16; FRAME_SIZE_SAMPLES];

        let verdict = detector.is_voice(&silence);
        assert!(verdict.is_ok());

        detector.reset();
        assert!(detector.is_voice(&silence).is_ok());
    }

    #[test]
    fn test_required_format() {
        let detector = EarshotDetector::default();
        assert_eq!(detector.required_sample_rate(), 8000);
        assert_eq!(detector.required_frame_size_samples(), 160);
    }
}
