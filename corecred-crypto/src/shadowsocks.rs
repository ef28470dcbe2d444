#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoding::encode_standard;
use crate::random::RandomSource;
use crate::{Error, Result};

/// Shadowsocks 2022 (blake3) AEAD methods. The password is the raw PSK,
/// so its decoded length must equal the cipher key length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowsocksMethod {
    #[serde(rename = "2022-blake3-aes-128-gcm")]
    Aes128Gcm,
    #[default]
    #[serde(rename = "2022-blake3-aes-256-gcm")]
    Aes256Gcm,
}

impl ShadowsocksMethod {
    pub const ALL: [ShadowsocksMethod; 2] = [Self::Aes128Gcm, Self::Aes256Gcm];

    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm => 32,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aes128Gcm => "2022-blake3-aes-128-gcm",
            Self::Aes256Gcm => "2022-blake3-aes-256-gcm",
        }
    }
}

impl fmt::Display for ShadowsocksMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadowsocksMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidOption(format!("unsupported shadowsocks method: {s}")))
    }
}

/// `method.key_len()` random bytes, standard base64 (padding kept).
pub fn generate_password<R: RandomSource>(rng: &mut R, method: ShadowsocksMethod) -> Result<String> {
    let key = rng.vec(method.key_len())?;
    debug!(method = method.as_str(), key_len = method.key_len(), "generated shadowsocks password");
    Ok(encode_standard(&key))
}
