#![forbid(unsafe_code)]

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Source of secret random bytes for every generator in this crate.
///
/// A failed `fill` is fatal for the generation call that requested it;
/// generators never retry.
pub trait RandomSource {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Draw exactly `N` bytes into a buffer that is wiped on drop.
    fn array<const N: usize>(&mut self) -> Result<Zeroizing<[u8; N]>>
    where
        Self: Sized,
    {
        let mut out = Zeroizing::new([0u8; N]);
        self.fill(&mut out[..])?;
        Ok(out)
    }

    /// Draw `len` bytes into a heap buffer that is wiped on drop.
    fn vec(&mut self, len: usize) -> Result<Zeroizing<Vec<u8>>>
    where
        Self: Sized,
    {
        let mut out = Zeroizing::new(vec![0u8; len]);
        self.fill(out.as_mut_slice())?;
        Ok(out)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).fill(buf)
    }
}

/// Operating system CSPRNG (getrandom).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        getrandom::getrandom(buf).map_err(|e| Error::RandomSource(e.to_string()))
    }
}

/// ChaCha20 stream seeded from 32 bytes. Replays the same byte sequence for
/// the same seed, which makes derivations reproducible in tests and benches.
pub struct SeededRandom {
    rng: ChaCha20Rng,
}

impl SeededRandom {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.rng
            .try_fill_bytes(buf)
            .map_err(|e| Error::RandomSource(e.to_string()))
    }
}
