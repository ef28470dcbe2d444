#![forbid(unsafe_code)]

use std::fmt;

use fips204::ml_dsa_65;
use fips204::traits::{KeyGen, SerDes};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::encode_url_safe;
use crate::random::RandomSource;
use crate::{Error, Result};

/// ML-DSA-65 seed length (xi)
pub const MLDSA65_SEED_SIZE: usize = 32;

/// ML-DSA-65 verification (public) key length
pub const MLDSA65_VERIFY_KEY_SIZE: usize = ml_dsa_65::PK_LEN;

/// Seed and verification key. The expanded signing key is discarded at
/// derivation time so it can never be displayed or copied.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MlDsaKeyMaterial {
    seed: [u8; MLDSA65_SEED_SIZE],
    #[zeroize(skip)]
    verification_key: Vec<u8>,
}

impl MlDsaKeyMaterial {
    pub fn seed(&self) -> &[u8; MLDSA65_SEED_SIZE] {
        &self.seed
    }

    pub fn verification_key(&self) -> &[u8] {
        &self.verification_key
    }

    pub fn seed_encoded(&self) -> String {
        encode_url_safe(&self.seed)
    }

    pub fn verification_key_encoded(&self) -> String {
        encode_url_safe(&self.verification_key)
    }
}

impl fmt::Debug for MlDsaKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MlDsaKeyMaterial")
            .field("verification_key_size", &self.verification_key.len())
            .field("seed", &"[REDACTED]")
            .finish()
    }
}

/// FIPS 204 key generation from a 32-byte seed. Same seed, same verification key.
pub fn from_seed(seed: &[u8]) -> Result<MlDsaKeyMaterial> {
    let fixed: [u8; MLDSA65_SEED_SIZE] = seed.try_into().map_err(|_| {
        Error::Derivation(format!(
            "ML-DSA-65 seed must be {MLDSA65_SEED_SIZE} bytes, got {}",
            seed.len()
        ))
    })?;
    let (public_key, signing_key) = ml_dsa_65::KG::keygen_from_seed(&fixed);
    drop(signing_key);
    let verification_key = public_key.into_bytes().to_vec();
    Ok(MlDsaKeyMaterial {
        seed: fixed,
        verification_key,
    })
}

/// Draw a fresh seed and derive the verification key.
pub fn generate<R: RandomSource>(rng: &mut R) -> Result<MlDsaKeyMaterial> {
    let seed = rng.array::<MLDSA65_SEED_SIZE>()?;
    let material = from_seed(seed.as_slice())?;
    debug!(
        seed_size = MLDSA65_SEED_SIZE,
        verification_key_size = MLDSA65_VERIFY_KEY_SIZE,
        "generated ML-DSA-65 key material"
    );
    Ok(material)
}
