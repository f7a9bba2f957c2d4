use thiserror::Error;

#[derive(Debug, Error)]
#[error("frame detector failure: {0}")]
pub struct DetectorError(pub String);

/// A trait for the external frame-level voice detector.
///
/// This defines the common interface for the underlying binary
/// voice/silence decision (e.g. a WebRTC-VAD port running in one of a
/// small set of aggressiveness modes), allowing implementations to be
/// swapped in the classification pipeline.
pub trait FrameDetector: Send {
    fn is_voice(&mut self, frame: &[i16]) -> Result<bool, DetectorError>;
    fn reset(&mut self);
    fn required_sample_rate(&self) -> u32;
    fn required_frame_size_samples(&self) -> usize;
}
