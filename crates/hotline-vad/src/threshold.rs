use crate::config::VadConfig;

/// Rolling noise-floor estimate over a circular history of recent frame
/// energies, with a derived speech-energy threshold.
///
/// The tracker is updated after every frame regardless of the
/// classification outcome, so it adapts to both speech and silence. Zero
/// entries (empty history slots and all-zero frames) are treated as
/// unpopulated when aggregating.
pub struct AdaptiveThreshold {
    history: Vec<f64>,

    index: usize,

    noise_floor: f64,

    threshold: f64,

    average_energy: f64,

    min_energy: f64,

    min_signal_to_noise: f64,

    smoothing: f64,
}

impl AdaptiveThreshold {
    pub fn new(config: &VadConfig) -> Self {
        Self {
            history: vec![0.0; config.energy_history_len],
            index: 0,
            noise_floor: config.initial_noise_floor,
            threshold: (config.initial_noise_floor * config.min_signal_to_noise)
                .max(config.min_energy),
            average_energy: 0.0,
            min_energy: config.min_energy,
            min_signal_to_noise: config.min_signal_to_noise,
            smoothing: config.noise_floor_smoothing,
        }
    }

    /// Record one frame energy and refresh the floor and threshold.
    pub fn update(&mut self, energy: f64) {
        self.history[self.index] = energy;
        self.index = (self.index + 1) % self.history.len();

        let mut min = f64::INFINITY;
        let mut sum = 0.0;
        let mut populated = 0usize;

        for &e in &self.history {
            if e > 0.0 {
                if e < min {
                    min = e;
                }
                sum += e;
                populated += 1;
            }
        }

        if populated > 0 {
            self.average_energy = sum / populated as f64;

            if min.is_finite() {
                self.noise_floor =
                    self.smoothing * self.noise_floor + (1.0 - self.smoothing) * min;
            }

            self.threshold =
                (self.noise_floor * self.min_signal_to_noise).max(self.min_energy);
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    pub fn average_energy(&self) -> f64 {
        self.average_energy
    }

    pub fn reset(&mut self, config: &VadConfig) {
        self.history.fill(0.0);
        self.index = 0;
        self.noise_floor = config.initial_noise_floor;
        self.threshold =
            (config.initial_noise_floor * config.min_signal_to_noise).max(config.min_energy);
        self.average_energy = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_threshold_respects_minimum() {
        let config = VadConfig::default();
        let tracker = AdaptiveThreshold::new(&config);

        // floor 50 * snr 2 = 100, clamped to min_energy 100
        assert_eq!(tracker.threshold(), 100.0);
        assert_eq!(tracker.noise_floor(), 50.0);
    }

    #[test]
    fn test_all_zero_history_leaves_threshold_alone() {
        let config = VadConfig::default();
        let mut tracker = AdaptiveThreshold::new(&config);

        for _ in 0..200 {
            tracker.update(0.0);
        }

        assert_eq!(tracker.threshold(), 100.0);
        assert_eq!(tracker.noise_floor(), 50.0);
    }

    #[test]
    fn test_quiet_history_never_drops_below_minimum() {
        let config = VadConfig::default();
        let mut tracker = AdaptiveThreshold::new(&config);

        for _ in 0..500 {
            tracker.update(3.0);
        }

        assert!(tracker.noise_floor() < 50.0);
        assert_eq!(tracker.threshold(), config.min_energy);
    }

    #[test]
    fn test_loud_history_raises_threshold() {
        let config = VadConfig::default();
        let mut tracker = AdaptiveThreshold::new(&config);

        for _ in 0..500 {
            tracker.update(4000.0);
        }

        // floor converges toward 4000; threshold = floor * 2
        assert!(tracker.noise_floor() > 3900.0);
        assert!(tracker.threshold() > config.min_energy);
        assert!((tracker.threshold() - tracker.noise_floor() * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_floor_favors_quiet_frames() {
        let config = VadConfig::default();
        let mut tracker = AdaptiveThreshold::new(&config);

        // One quiet frame in a loud history pins the minimum
        tracker.update(30.0);
        for _ in 0..50 {
            tracker.update(5000.0);
        }

        assert!(tracker.noise_floor() < 100.0);
    }

    #[test]
    fn test_smoothing_single_step() {
        let config = VadConfig::default();
        let mut tracker = AdaptiveThreshold::new(&config);

        tracker.update(80.0);
        // 0.9 * 50 + 0.1 * 80 = 53
        assert!((tracker.noise_floor() - 53.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_seed_state() {
        let config = VadConfig::default();
        let mut tracker = AdaptiveThreshold::new(&config);

        for _ in 0..100 {
            tracker.update(4000.0);
        }
        tracker.reset(&config);

        assert_eq!(tracker.noise_floor(), 50.0);
        assert_eq!(tracker.threshold(), 100.0);
    }
}
