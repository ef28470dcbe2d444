use corecred_crypto::kyber::{self, sizes};
use corecred_crypto::random::OsRandom;
use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{EncodedSizeUser, KemCore, MlKem768, B32};

#[test]
fn seed_reproduces_encapsulation_key() -> corecred_crypto::Result<()> {
    let material = kyber::generate(&mut OsRandom)?;
    let again = kyber::from_seed(material.seed())?;
    assert_eq!(material.encapsulation_key(), again.encapsulation_key());
    assert_eq!(material.encapsulation_key_encoded(), again.encapsulation_key_encoded());
    Ok(())
}

#[test]
fn independent_generations_draw_different_seeds() -> corecred_crypto::Result<()> {
    let a = kyber::generate(&mut OsRandom)?;
    let b = kyber::generate(&mut OsRandom)?;
    assert_ne!(a.seed(), b.seed());
    assert_ne!(a.encapsulation_key(), b.encapsulation_key());
    Ok(())
}

#[test]
fn seed_decapsulates_what_encapsulation_key_encapsulates() -> Result<(), Box<dyn std::error::Error>> {
    let material = kyber::generate(&mut OsRandom)?;
    let seed = material.seed();
    let d = B32::try_from(&seed[..32])?;
    let z = B32::try_from(&seed[32..])?;
    let (dk, ek) = MlKem768::generate_deterministic(&d, &z);
    assert_eq!(ek.as_bytes().as_slice(), material.encapsulation_key());
    assert_eq!(material.encapsulation_key().len(), sizes::ENCAPSULATION_KEY);

    let mut rng = rand::thread_rng();
    let (ct, sent) = ek.encapsulate(&mut rng).map_err(|_| "encapsulate")?;
    let received = dk.decapsulate(&ct).map_err(|_| "decapsulate")?;
    assert_eq!(sent, received);
    Ok(())
}
