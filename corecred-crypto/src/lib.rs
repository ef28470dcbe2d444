//!
//! Credential primitives for proxy core configurations (unsafe-forbid).
//! - Random: OS-backed CSPRNG source and a seeded source for replayable derivations
//! - X25519: random scalar + base-point multiplication (REALITY / VLESS key pairs)
//! - ML-KEM-768: 64-byte seed (d || z) with FIPS 203 deterministic key generation
//! - ML-DSA-65: 32-byte seed with FIPS 204 key generation, verification key only
//! - Shadowsocks 2022: method-sized symmetric passwords (standard base64)
//! - Short IDs: 8 random bytes, lowercase hex
//! - Encoding: URL-safe unpadded base64, standard base64, hex
#![forbid(unsafe_code)]
#![warn(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unreachable,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(missing_docs)]

/// Display encoders (base64 variants and hex).
pub mod encoding;
/// ML-KEM-768 seed and encapsulation key generation.
pub mod kyber;
/// ML-DSA-65 seed and verification key generation.
pub mod mldsa;
/// Random byte sources.
pub mod random;
/// Shadowsocks 2022 methods and password generation.
pub mod shadowsocks;
/// REALITY short identifiers.
pub mod short_id;
/// X25519 key pair generation.
pub mod x25519;

/// Error type for key material generation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("random source unavailable: {0}")]
    /// The platform CSPRNG could not supply bytes
    RandomSource(String),
    #[error("key derivation failed: {0}")]
    /// A key-agreement or signature derivation step failed
    Derivation(String),
    #[error("invalid option: {0}")]
    /// A supplied option could not be interpreted
    InvalidOption(String),
}

/// Convenient Result alias for this crate.
pub type Result<T> = core::result::Result<T, Error>;

pub use kyber::MlKemKeyMaterial;
pub use mldsa::MlDsaKeyMaterial;
pub use random::{OsRandom, RandomSource, SeededRandom};
pub use shadowsocks::ShadowsocksMethod;
pub use x25519::X25519KeyPair;
