use corecred_crypto::mldsa::{self, MLDSA65_VERIFY_KEY_SIZE};
use corecred_crypto::random::OsRandom;
use fips204::ml_dsa_65;
use fips204::traits::{KeyGen, SerDes, Signer, Verifier};

#[test]
fn verification_key_checks_signatures_from_seed() -> Result<(), Box<dyn std::error::Error>> {
    let material = mldsa::generate(&mut OsRandom)?;
    assert_eq!(material.verification_key().len(), MLDSA65_VERIFY_KEY_SIZE);

    let (_pk, sk) = ml_dsa_65::KG::keygen_from_seed(material.seed());
    let sig = sk.try_sign(b"reality", b"")?;
    let pk_bytes: [u8; ml_dsa_65::PK_LEN] = material
        .verification_key()
        .try_into()
        .map_err(|_| "verification key length")?;
    let pk = ml_dsa_65::PublicKey::try_from_bytes(pk_bytes)?;
    assert!(pk.verify(b"reality", &sig, b""));
    Ok(())
}

#[test]
fn each_generation_draws_a_fresh_seed() -> corecred_crypto::Result<()> {
    let a = mldsa::generate(&mut OsRandom)?;
    let b = mldsa::generate(&mut OsRandom)?;
    assert_ne!(a.seed(), b.seed());
    assert_ne!(a.verification_key(), b.verification_key());
    Ok(())
}
