//! Per-frame signal features: RMS energy and zero-crossing rate.
//!
//! Both are pure functions of a single frame. Energies are in raw sample
//! units (telephony scale), matching the thresholds in `VadConfig`.

/// Root-mean-square of sample magnitudes over the frame. Zero for an
/// empty frame.
pub fn rms_energy(frame: &[i16]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = frame
        .iter()
        .map(|&sample| {
            let s = sample as f64;
            s * s
        })
        .sum();

    (sum_squares / frame.len() as f64).sqrt()
}

/// Fraction of adjacent sample pairs whose signs differ, over `(len - 1)`
/// pairs. Zero for frames of length <= 1. A sample of exactly zero counts
/// as non-negative.
pub fn zero_crossing_rate(frame: &[i16]) -> f64 {
    if frame.len() <= 1 {
        return 0.0;
    }

    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[0] >= 0) != (pair[1] >= 0))
        .count();

    crossings as f64 / (frame.len() - 1) as f64
}
