#![forbid(unsafe_code)]

//! Write-only display encoders. Nothing in this crate decodes its own output.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

/// URL-safe base64 without `=` padding or line breaks.
/// Used for every asymmetric key, seed and verification key.
pub fn encode_url_safe(bytes: &[u8]) -> String {
    let mut out = URL_SAFE_NO_PAD.encode(bytes);
    out.retain(|c| c != '=' && c != '\n' && c != '\r');
    out
}

/// Standard-alphabet base64 with padding. Shadowsocks 2022 passwords only.
pub fn encode_standard(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Lowercase hex, two characters per byte.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
