//! # Fully secure IPFE
//!
//! Damgård based scheme: same interface as the selective scheme, with a
//! second generator `h` published along with the parameters.

use eyre::Result;
use ipfe_suite::{fsipfe, Error, Parameters, Vector};
use num_bigint_dig::BigInt;
use rand::Rng;

#[test]
fn test_fsipfe() -> Result<()> {
    let mut rng = rand::thread_rng();
    let params = Parameters::generate(3, 2048, 1000u32)?;
    let authority = fsipfe::Damgard::new(params.clone(), &mut rng);
    let (msk, mpk) = authority.generate_master_keys(&mut rng);

    let x = Vector::from(vec![1, 2, 3]);
    let y = Vector::from(vec![4, 5, 6]);
    let key = authority.derive_key(&msk, &y)?;

    // the encryptor and the decryptor are rebuilt from the public values
    let encryptor = fsipfe::Damgard::from_parts(params.clone(), authority.h().clone())?;
    let ct = encryptor.encrypt(&x, &mpk, &mut rng)?;
    let decryptor = fsipfe::Damgard::from_parts(params, authority.h().clone())?;

    eyre::ensure!(
        decryptor.decrypt(&ct, &key, &y)? == BigInt::from(32),
        "Error while computing the Damgård IPFE: incorrect result!"
    );
    Ok(())
}

#[test]
fn test_fsipfe_fresh_randomness() -> Result<()> {
    let mut rng = rand::thread_rng();
    let l: usize = rng.gen_range(2..8);
    const B: i64 = 50;
    let scheme = fsipfe::Damgard::new(Parameters::generate(l, 1024, B as u32)?, &mut rng);
    let (msk, mpk) = scheme.generate_master_keys(&mut rng);
    let x: Vector = (0..l).map(|_| BigInt::from(rng.gen_range(-B + 1..B))).collect();
    let y: Vector = (0..l).map(|_| BigInt::from(rng.gen_range(-B + 1..B))).collect();
    let key = scheme.derive_key(&msk, &y)?;

    let ct1 = scheme.encrypt(&x, &mpk, &mut rng)?;
    let ct2 = scheme.encrypt(&x, &mpk, &mut rng)?;
    eyre::ensure!(ct1 != ct2, "two encryptions of the same vector are equal");
    for ct in [ct1, ct2] {
        eyre::ensure!(
            scheme.decrypt(&ct, &key, &y)? == x.dot(&y)?,
            "Error while computing the Damgård IPFE: incorrect result!"
        );
    }
    Ok(())
}

#[test]
fn test_fsipfe_shape() -> Result<()> {
    let mut rng = rand::thread_rng();
    let scheme = fsipfe::Damgard::new(Parameters::generate(4, 1024, 10u32)?, &mut rng);
    let (msk, mpk) = scheme.generate_master_keys(&mut rng);
    for v in [vec![1, 2, 3], vec![1, 2, 3, 4, 5]] {
        let v = Vector::from(v);
        let err = scheme.encrypt(&v, &mpk, &mut rng).unwrap_err();
        eyre::ensure!(
            matches!(err.downcast_ref::<Error>(), Some(Error::ShapeMismatch { .. })),
            "wrong plaintext length accepted"
        );
        let err = scheme.derive_key(&msk, &v).unwrap_err();
        eyre::ensure!(
            matches!(err.downcast_ref::<Error>(), Some(Error::ShapeMismatch { .. })),
            "wrong function vector length accepted"
        );
    }
    Ok(())
}
