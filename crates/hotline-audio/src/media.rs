use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::ulaw::decode_ulaw;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 media payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decode one media-event payload (base64-wrapped companded audio) into a
/// PCM frame. Fails only if the base64 wrapper is malformed; the u-law
/// expansion itself accepts every byte.
pub fn decode_media_payload(payload: &str) -> Result<Vec<i16>, DecodeError> {
    let raw = BASE64_STANDARD.decode(payload)?;
    Ok(decode_ulaw(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ulaw::expand_ulaw;

    #[test]
    fn test_roundtrip_through_base64() {
        let raw: Vec<u8> = (0..160).map(|i| (i % 256) as u8).collect();
        let payload = BASE64_STANDARD.encode(&raw);

        let pcm = decode_media_payload(&payload).unwrap();
        assert_eq!(pcm.len(), 160);
        assert_eq!(pcm[0], expand_ulaw(0));
        assert_eq!(pcm[159], expand_ulaw(159));
    }

    #[test]
    fn test_bad_base64_is_an_error() {
        assert!(decode_media_payload("not!!valid@@base64").is_err());
    }

    #[test]
    fn test_empty_payload_decodes_to_empty_frame() {
        assert_eq!(decode_media_payload("").unwrap(), Vec::<i16>::new());
    }
}
