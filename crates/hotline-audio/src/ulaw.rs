//! G.711 u-law expansion.
//!
//! The companding expansion is a fixed per-byte computation with no state
//! carried between calls, and every byte value is valid input.

const BIAS: i32 = 0x84;

/// Expand one u-law byte to a linear 16-bit sample.
pub fn expand_ulaw(byte: u8) -> i16 {
    let u = !byte;
    let exponent = ((u >> 4) & 0x07) as i32;
    let mantissa = (u & 0x0F) as i32;
    let magnitude = (((mantissa << 3) + BIAS) << exponent) - BIAS;

    if u & 0x80 != 0 {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

/// Expand a companded payload into a PCM frame of equal sample count.
pub fn decode_ulaw(bytes: &[u8]) -> Vec<i16> {
    bytes.iter().map(|&b| expand_ulaw(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        // Extremes of the u-law code space
        assert_eq!(expand_ulaw(0x00), -32124);
        assert_eq!(expand_ulaw(0x80), 32124);
        // Both zero codes decode to silence
        assert_eq!(expand_ulaw(0xFF), 0);
        assert_eq!(expand_ulaw(0x7F), 0);
    }

    #[test]
    fn test_every_byte_is_valid() {
        for byte in 0..=255u8 {
            let sample = expand_ulaw(byte);
            assert!(sample >= -32124 && sample <= 32124, "byte {byte} -> {sample}");
        }
    }

    #[test]
    fn test_sign_symmetry() {
        // Codes differing only in the sign bit decode to opposite samples
        for byte in 0..=0x7Fu8 {
            assert_eq!(expand_ulaw(byte) as i32, -(expand_ulaw(byte | 0x80) as i32));
        }
    }

    #[test]
    fn test_payload_length_preserved() {
        let payload = [0x00u8, 0xFF, 0x80, 0x3A];
        let pcm = decode_ulaw(&payload);
        assert_eq!(pcm.len(), payload.len());
    }
}
