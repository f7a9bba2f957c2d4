use crate::config::VadConfig;
use crate::threshold::AdaptiveThreshold;
use crate::types::FrameVerdict;

/// Confidence weight contributed by the external detector check.
pub const DETECTOR_WEIGHT: f64 = 0.4;
/// Confidence weight contributed by the energy-over-threshold check.
pub const ENERGY_WEIGHT: f64 = 0.3;
/// Confidence weight contributed by the signal-to-noise check.
pub const SNR_WEIGHT: f64 = 0.2;
/// Confidence weight contributed by the zero-crossing-rate check.
pub const ZCR_WEIGHT: f64 = 0.1;

/// Multi-criteria speech classifier.
///
/// Combines the external detector's binary decision with energy,
/// signal-to-noise, and zero-crossing checks into a confidence-scored
/// verdict. A frame is speech only if all four checks pass AND the summed
/// confidence reaches `min_confidence`. Under the reference weights the
/// confidence gate cannot fail once all four checks pass (the sum is
/// exactly 1.0), but both gates are the documented contract and are kept
/// as-is; see DESIGN.md.
pub struct Classifier {
    config: VadConfig,
}

impl Classifier {
    pub fn new(config: VadConfig) -> Self {
        Self { config }
    }

    pub fn classify(
        &self,
        detector_voiced: bool,
        energy: f64,
        zero_crossing_rate: f64,
        threshold: &AdaptiveThreshold,
    ) -> FrameVerdict {
        let energy_check = energy > threshold.threshold();
        let snr_check = energy / threshold.noise_floor() > self.config.min_signal_to_noise;
        let zcr_check = zero_crossing_rate > self.config.zcr_min
            && zero_crossing_rate < self.config.zcr_max;

        let mut confidence = 0.0;
        if detector_voiced {
            confidence += DETECTOR_WEIGHT;
        }
        if energy_check {
            confidence += ENERGY_WEIGHT;
        }
        if snr_check {
            confidence += SNR_WEIGHT;
        }
        if zcr_check {
            confidence += ZCR_WEIGHT;
        }

        let all_checks = detector_voiced && energy_check && snr_check && zcr_check;
        let is_speech = all_checks && confidence >= self.config.min_confidence;

        FrameVerdict {
            is_speech,
            confidence,
            energy,
            zero_crossing_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_tracker() -> AdaptiveThreshold {
        // Default tracker: noise floor 50, threshold 100
        AdaptiveThreshold::new(&VadConfig::default())
    }

    #[test]
    fn test_all_checks_passing_yields_full_confidence() {
        let classifier = Classifier::new(VadConfig::default());
        let tracker = quiet_tracker();

        let verdict = classifier.classify(true, 2000.0, 0.25, &tracker);
        assert!(verdict.is_speech);
        assert_eq!(verdict.confidence, 1.0);
    }

    #[test]
    fn test_detector_veto() {
        let classifier = Classifier::new(VadConfig::default());
        let tracker = quiet_tracker();

        let verdict = classifier.classify(false, 2000.0, 0.25, &tracker);
        assert!(!verdict.is_speech);
        assert!((verdict.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_low_energy_veto() {
        let classifier = Classifier::new(VadConfig::default());
        let tracker = quiet_tracker();

        // Below the 100.0 threshold but just under 2x the 50.0 noise floor
        let verdict = classifier.classify(true, 90.0, 0.25, &tracker);
        assert!(!verdict.is_speech);
    }

    #[test]
    fn test_zcr_band_excludes_tones_and_noise() {
        let classifier = Classifier::new(VadConfig::default());
        let tracker = quiet_tracker();

        // Pure tone / DC
        assert!(!classifier.classify(true, 2000.0, 0.0, &tracker).is_speech);
        // Broadband noise
        assert!(!classifier.classify(true, 2000.0, 0.8, &tracker).is_speech);
        // Band edges are exclusive
        assert!(!classifier.classify(true, 2000.0, 0.01, &tracker).is_speech);
        assert!(!classifier.classify(true, 2000.0, 0.5, &tracker).is_speech);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = Classifier::new(VadConfig::default());
        let tracker = quiet_tracker();

        let first = classifier.classify(true, 850.0, 0.12, &tracker);
        let second = classifier.classify(true, 850.0, 0.12, &tracker);
        assert_eq!(first, second);
    }
}
