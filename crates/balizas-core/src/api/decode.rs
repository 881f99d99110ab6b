//! Transport decoder for the feed payload.
//!
//! The upstream returns its JSON XOR-ed byte by byte with a single-character
//! key and then base64 encoded. This is obfuscation, not encryption: the
//! functions here are a plain reversible byte transform.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use super::FeedError;

/// Standard alphabet; padding is written on encode and optional on decode.
const FEED_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Key the upstream uses for its payloads.
pub const DEFAULT_KEY: char = 'K';

/// Decode a payload obfuscated with [`DEFAULT_KEY`].
pub fn decode(obfuscated_base64: &str) -> Result<String, FeedError> {
    decode_with_key(obfuscated_base64, DEFAULT_KEY)
}

/// base64-decode, XOR every byte with `key`, then read the result as UTF-8.
pub fn decode_with_key(obfuscated_base64: &str, key: char) -> Result<String, FeedError> {
    let key = key_byte(key)?;
    let mut bytes = FEED_ENGINE.decode(obfuscated_base64.trim())?;
    xor_in_place(&mut bytes, key);
    Ok(String::from_utf8(bytes)?)
}

/// Inverse of [`decode_with_key`]; accepts arbitrary bytes.
pub fn encode_with_key(plain: &[u8], key: char) -> Result<String, FeedError> {
    let key = key_byte(key)?;
    let mut bytes = plain.to_vec();
    xor_in_place(&mut bytes, key);
    Ok(FEED_ENGINE.encode(bytes))
}

fn key_byte(key: char) -> Result<u8, FeedError> {
    u8::try_from(u32::from(key))
        .map_err(|_| FeedError::Decode(format!("key {:?} does not fit in a single byte", key)))
}

fn xor_in_place(bytes: &mut [u8], key: u8) {
    for b in bytes.iter_mut() {
        *b ^= key;
    }
}
