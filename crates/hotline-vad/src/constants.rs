//! Telephony audio constants for the segmentation pipeline

/// Standard sample rate for all frame processing (Hz)
pub const SAMPLE_RATE_HZ: u32 = 8_000;

/// Standard frame size for all frame processing (samples)
/// At 8kHz, 160 samples = 20ms frames
pub const FRAME_SIZE_SAMPLES: usize = 160;

/// Standard number of channels for mono telephony audio
pub const CHANNELS_MONO: u16 = 1;

/// Frame duration in milliseconds (derived constant)
pub const FRAME_DURATION_MS: u64 = (FRAME_SIZE_SAMPLES as u64 * 1000) / SAMPLE_RATE_HZ as u64;
