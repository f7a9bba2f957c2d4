use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("wav encoding failed: {0}")]
    Encode(#[from] hound::Error),
}

/// Encode a PCM sequence into an in-memory mono 16-bit WAV container.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
