//! ML-KEM-768 (FIPS 203) key material for the post-quantum VLESS variant.
//! The 64-byte seed `d || z` is the decapsulation credential; the expanded
//! decapsulation key is never kept.
#![forbid(unsafe_code)]

use std::fmt;

use ml_kem::{EncodedSizeUser, KemCore, MlKem768, B32};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::encode_url_safe;
use crate::random::RandomSource;
use crate::{Error, Result};

/// Sizes for ML-KEM-768.
pub mod sizes {
    /// Seed length (d || z)
    pub const SEED: usize = 64;
    /// Encapsulation (public) key length
    pub const ENCAPSULATION_KEY: usize = 1184;
}

/// Seed and the encapsulation key derived from it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MlKemKeyMaterial {
    seed: [u8; sizes::SEED],
    #[zeroize(skip)]
    encapsulation_key: Vec<u8>,
}

impl MlKemKeyMaterial {
    pub fn seed(&self) -> &[u8; sizes::SEED] {
        &self.seed
    }

    pub fn encapsulation_key(&self) -> &[u8] {
        &self.encapsulation_key
    }

    /// Seed for display (URL-safe base64, unpadded).
    pub fn seed_encoded(&self) -> String {
        encode_url_safe(&self.seed)
    }

    /// Encapsulation key for display (URL-safe base64, unpadded).
    pub fn encapsulation_key_encoded(&self) -> String {
        encode_url_safe(&self.encapsulation_key)
    }
}

impl fmt::Debug for MlKemKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MlKemKeyMaterial")
            .field("encapsulation_key_size", &self.encapsulation_key.len())
            .field("seed", &"[REDACTED]")
            .finish()
    }
}

/// Deterministically derive the encapsulation key from a 64-byte seed.
pub fn from_seed(seed: &[u8]) -> Result<MlKemKeyMaterial> {
    if seed.len() != sizes::SEED {
        return Err(Error::Derivation(format!(
            "ML-KEM-768 seed must be {} bytes, got {}",
            sizes::SEED,
            seed.len()
        )));
    }
    let d = B32::try_from(&seed[..32])
        .map_err(|_| Error::Derivation("ML-KEM-768 seed half d".into()))?;
    let z = B32::try_from(&seed[32..])
        .map_err(|_| Error::Derivation("ML-KEM-768 seed half z".into()))?;

    let (_decapsulation_key, encapsulation_key) = MlKem768::generate_deterministic(&d, &z);
    let encapsulation_key = encapsulation_key.as_bytes().as_slice().to_vec();
    if encapsulation_key.len() != sizes::ENCAPSULATION_KEY {
        return Err(Error::Derivation(format!(
            "unexpected ML-KEM-768 encapsulation key size: {}",
            encapsulation_key.len()
        )));
    }

    let mut fixed = [0u8; sizes::SEED];
    fixed.copy_from_slice(seed);
    Ok(MlKemKeyMaterial {
        seed: fixed,
        encapsulation_key,
    })
}

/// Draw a fresh 64-byte seed and derive its encapsulation key.
pub fn generate<R: RandomSource>(rng: &mut R) -> Result<MlKemKeyMaterial> {
    let seed = rng.array::<{ sizes::SEED }>()?;
    let material = from_seed(seed.as_slice())?;
    debug!(
        seed_size = sizes::SEED,
        encapsulation_key_size = sizes::ENCAPSULATION_KEY,
        "generated ML-KEM-768 key material"
    );
    Ok(material)
}
