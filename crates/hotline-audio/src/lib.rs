pub mod media;
pub mod ulaw;
pub mod wav;

pub use media::{decode_media_payload, DecodeError};
pub use ulaw::{decode_ulaw, expand_ulaw};
pub use wav::{encode_wav, WavError};
