pub mod classify;
pub mod config;
pub mod constants;
pub mod detector;
pub mod energy;
pub mod engine;
pub mod pool;
pub mod session;
pub mod threshold;
pub mod types;

// Core exports - grouped and sorted alphabetically
pub use classify::Classifier;
pub use config::{EngineConfig, SessionConfig, VadConfig};
pub use constants::{FRAME_DURATION_MS, FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};
pub use detector::{DetectorError, FrameDetector};
pub use engine::{EngineError, SegmentationEngine};
pub use pool::{BufferId, BufferPool, PoolExhausted};
pub use session::SpeechSession;
pub use types::{EngineMetrics, FrameVerdict, SessionEvent, SessionState};
