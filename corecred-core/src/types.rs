use std::fmt;
use std::str::FromStr;

use corecred_crypto::ShadowsocksMethod;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::vless::VlessEncryption;

/// The credential kinds the editor can generate. One algorithm and one
/// result shape per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialKind {
    KeyPair,
    ShortId,
    ShadowsocksPassword,
    SignatureKeyPair,
    VlessEncryption,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 5] = [
        Self::KeyPair,
        Self::ShortId,
        Self::ShadowsocksPassword,
        Self::SignatureKeyPair,
        Self::VlessEncryption,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyPair => "key-pair",
            Self::ShortId => "short-id",
            Self::ShadowsocksPassword => "shadowsocks-password",
            Self::SignatureKeyPair => "signature-key-pair",
            Self::VlessEncryption => "vless-encryption",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// X25519 key pair as displayed (URL-safe base64, unpadded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// 16 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortId {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowsocksCredential {
    pub password: String,
    pub method: ShadowsocksMethod,
}

/// ML-DSA-65 seed and verification key (URL-safe base64, unpadded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureKeyMaterial {
    pub seed: String,
    pub verification_key: String,
}

/// One generated credential. Each variant carries its own payload so the
/// display layer never has to guess the shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Credential {
    KeyPair(KeyPair),
    ShortId(ShortId),
    ShadowsocksPassword(ShadowsocksCredential),
    SignatureKeyPair(SignatureKeyMaterial),
    VlessEncryption(VlessEncryption),
}

impl Credential {
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::KeyPair(_) => CredentialKind::KeyPair,
            Self::ShortId(_) => CredentialKind::ShortId,
            Self::ShadowsocksPassword(_) => CredentialKind::ShadowsocksPassword,
            Self::SignatureKeyPair(_) => CredentialKind::SignatureKeyPair,
            Self::VlessEncryption(_) => CredentialKind::VlessEncryption,
        }
    }
}
