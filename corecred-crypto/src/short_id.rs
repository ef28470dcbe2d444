#![forbid(unsafe_code)]

use tracing::debug;

use crate::encoding::encode_hex;
use crate::random::RandomSource;
use crate::Result;

/// Random bytes behind a short id
pub const SHORT_ID_BYTES: usize = 8;

/// 8 random bytes as 16 lowercase hex characters.
pub fn generate<R: RandomSource>(rng: &mut R) -> Result<String> {
    let bytes = rng.array::<SHORT_ID_BYTES>()?;
    debug!(len = SHORT_ID_BYTES * 2, "generated short id");
    Ok(encode_hex(bytes.as_slice()))
}
