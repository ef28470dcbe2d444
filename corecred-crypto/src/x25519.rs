#![forbid(unsafe_code)]

use std::fmt;

use tracing::debug;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::encode_url_safe;
use crate::random::RandomSource;
use crate::Result;

/// Size of X25519 secret scalar in bytes
pub const X25519_SECRET_KEY_SIZE: usize = 32;

/// Size of X25519 public key in bytes
pub const X25519_PUBLIC_KEY_SIZE: usize = 32;

/// X25519 key pair. The secret is kept as the raw 32 bytes drawn from the
/// random source; base-point multiplication clamps internally.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct X25519KeyPair {
    secret: [u8; X25519_SECRET_KEY_SIZE],
    #[zeroize(skip)]
    public: [u8; X25519_PUBLIC_KEY_SIZE],
}

impl X25519KeyPair {
    /// Derive the public point from an existing secret scalar.
    pub fn from_secret(secret: [u8; X25519_SECRET_KEY_SIZE]) -> Self {
        let static_secret = StaticSecret::from(secret);
        let public = PublicKey::from(&static_secret).to_bytes();
        Self { secret, public }
    }

    pub fn secret_bytes(&self) -> &[u8; X25519_SECRET_KEY_SIZE] {
        &self.secret
    }

    pub fn public_bytes(&self) -> &[u8; X25519_PUBLIC_KEY_SIZE] {
        &self.public
    }

    /// Private key for display (URL-safe base64, unpadded).
    pub fn private_key_encoded(&self) -> String {
        encode_url_safe(&self.secret)
    }

    /// Public key for display (URL-safe base64, unpadded).
    pub fn public_key_encoded(&self) -> String {
        encode_url_safe(&self.public)
    }
}

impl fmt::Debug for X25519KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X25519KeyPair")
            .field(
                "public_prefix",
                &format!("{:02x}{:02x}...", self.public[0], self.public[1]),
            )
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Draw a fresh 32-byte scalar and derive its public point.
pub fn generate<R: RandomSource>(rng: &mut R) -> Result<X25519KeyPair> {
    let secret = rng.array::<X25519_SECRET_KEY_SIZE>()?;
    let pair = X25519KeyPair::from_secret(*secret);
    debug!(
        secret_size = X25519_SECRET_KEY_SIZE,
        public_size = X25519_PUBLIC_KEY_SIZE,
        "generated x25519 key pair"
    );
    Ok(pair)
}
