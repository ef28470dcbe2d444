use std::sync::Mutex;

use corecred_crypto::random::{OsRandom, RandomSource};
use corecred_crypto::{mldsa, shadowsocks, short_id, x25519, ShadowsocksMethod};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GenerationError;
use crate::types::{
    Credential, CredentialKind, KeyPair, ShadowsocksCredential, ShortId, SignatureKeyMaterial,
};
use crate::vless::{VlessBuilderOptions, VlessEncryption, VlessKeyMaterial};

/// Inputs the editor supplies alongside a generate trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub vless: VlessBuilderOptions,
    pub shadowsocks_method: ShadowsocksMethod,
}

/// Produces one credential per call. Implementations must not retry.
pub trait CredentialGenerator {
    fn generate(
        &self,
        kind: CredentialKind,
        request: &GenerationRequest,
    ) -> Result<Credential, GenerationError>;
}

impl<F> CredentialGenerator for F
where
    F: Fn(CredentialKind, &GenerationRequest) -> Result<Credential, GenerationError>,
{
    fn generate(
        &self,
        kind: CredentialKind,
        request: &GenerationRequest,
    ) -> Result<Credential, GenerationError> {
        self(kind, request)
    }
}

/// Run the generation algorithm for `kind` against `rng`.
pub fn generate_credential<R: RandomSource>(
    rng: &mut R,
    kind: CredentialKind,
    request: &GenerationRequest,
) -> Result<Credential, GenerationError> {
    let tag = |source| GenerationError::new(kind, source);
    let credential = match kind {
        CredentialKind::KeyPair => {
            let pair = x25519::generate(rng).map_err(tag)?;
            Credential::KeyPair(KeyPair {
                public_key: pair.public_key_encoded(),
                private_key: pair.private_key_encoded(),
            })
        }
        CredentialKind::ShortId => Credential::ShortId(ShortId {
            value: short_id::generate(rng).map_err(tag)?,
        }),
        CredentialKind::ShadowsocksPassword => {
            let method = request.shadowsocks_method;
            Credential::ShadowsocksPassword(ShadowsocksCredential {
                password: shadowsocks::generate_password(rng, method).map_err(tag)?,
                method,
            })
        }
        CredentialKind::SignatureKeyPair => {
            let material = mldsa::generate(rng).map_err(tag)?;
            Credential::SignatureKeyPair(SignatureKeyMaterial {
                seed: material.seed_encoded(),
                verification_key: material.verification_key_encoded(),
            })
        }
        CredentialKind::VlessEncryption => {
            let material = VlessKeyMaterial::generate(rng).map_err(tag)?;
            Credential::VlessEncryption(VlessEncryption::from_material(material, &request.vless))
        }
    };
    debug!(kind = %kind, "credential generated");
    Ok(credential)
}

/// Default generator over a shared random source.
pub struct Generator<R = OsRandom> {
    rng: Mutex<R>,
}

impl Generator<OsRandom> {
    pub fn os() -> Self {
        Self::new(OsRandom)
    }
}

impl Default for Generator<OsRandom> {
    fn default() -> Self {
        Self::os()
    }
}

impl<R: RandomSource> Generator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }
}

impl<R: RandomSource> CredentialGenerator for Generator<R> {
    fn generate(
        &self,
        kind: CredentialKind,
        request: &GenerationRequest,
    ) -> Result<Credential, GenerationError> {
        let mut rng = self.rng.lock().map_err(|_| {
            GenerationError::new(
                kind,
                corecred_crypto::Error::RandomSource("random source lock poisoned".into()),
            )
        })?;
        generate_credential(&mut *rng, kind, request)
    }
}
