//! # Multi-client IPFE
//!
//! Each encryptor runs in its own thread and only receives its `ClientKey`.
//! The cyphertexts are sent back to the decryptor through a channel.

use eyre::Result;
use ipfe_suite::{
    ipmcfe::{self, ClientKey, DdhMulti, DdhMultiClient},
    Error, Matrix, Misuse, Parameters, Vector,
};
use num_bigint_dig::BigInt;
use rand::Rng;
use std::{sync::mpsc, thread};

/// Run one isolated encryptor per client and collect the cyphertexts.
/// - `params`:      public parameters
/// - `client_keys`: key material of each client
/// - `x`:           data of each client
fn simulation(
    params: &Parameters,
    client_keys: Vec<ClientKey>,
    x: &Matrix,
) -> Result<Vec<ipmcfe::CypherText>> {
    let (tx, rx) = mpsc::channel::<ipmcfe::CypherText>();
    let children: Vec<thread::JoinHandle<Result<()>>> = client_keys
        .into_iter()
        .zip(x.iter())
        .map(|(key, xi)| {
            let (tx, params, xi) = (tx.clone(), params.clone(), xi.clone());
            thread::spawn(move || -> Result<()> {
                let client = DdhMultiClient::new(params, key)?;
                tx.send(client.encrypt(&xi, &mut rand::thread_rng())?)
                    .map_err(|err| eyre::eyre!("Send Error: {:?}", err))
            })
        })
        .collect();
    drop(tx);

    for child in children {
        child
            .join()
            .map_err(|err| eyre::eyre!("Error in client thread: {:?}", err))??;
    }
    Ok(rx.iter().collect())
}

#[test]
fn test_ipmcfe() -> Result<()> {
    let mut rng = rand::thread_rng();
    let params = Parameters::generate_multi(2, 2, 2048, 1000u32)?;
    let authority = DdhMulti::new(params.clone());
    let (client_keys, msk) = authority.generate_master_keys(&mut rng);

    let x = Matrix::from(vec![vec![1, 1], vec![2, 2]]);
    let y = Matrix::from(vec![vec![1, 0], vec![0, 1]]);
    let key = authority.derive_key(&msk, &y)?;
    let cts = simulation(&params, client_keys, &x)?;

    eyre::ensure!(
        authority.decrypt(&cts, &key, &y)? == BigInt::from(3),
        "Error while computing the MCFE: incorrect result!"
    );
    Ok(())
}

#[test]
fn test_ipmcfe_single_row() -> Result<()> {
    // one client holding the whole vector
    let mut rng = rand::thread_rng();
    let params = Parameters::generate_multi(1, 3, 2048, 1000u32)?;
    let authority = DdhMulti::new(params.clone());
    let (client_keys, msk) = authority.generate_master_keys(&mut rng);
    let x = Matrix::from(vec![vec![1, 2, 3]]);
    let y = Matrix::from(vec![vec![4, 5, 6]]);
    let key = authority.derive_key(&msk, &y)?;
    let cts = simulation(&params, client_keys, &x)?;
    eyre::ensure!(
        authority.decrypt(&cts, &key, &y)? == BigInt::from(32),
        "Error while computing the MCFE: incorrect result!"
    );
    Ok(())
}

#[test]
fn test_ipmcfe_random() -> Result<()> {
    let mut rng = rand::thread_rng();
    let n: usize = rng.gen_range(2..6);
    let l: usize = rng.gen_range(1..4);
    const B: i64 = 64;
    let params = Parameters::generate_multi(n, l, 1024, B as u32)?;
    let authority = DdhMulti::new(params.clone());
    let (client_keys, msk) = authority.generate_master_keys(&mut rng);

    let mut random_matrix = || -> Matrix {
        (0..n)
            .map(|_| {
                (0..l)
                    .map(|_| BigInt::from(rng.gen_range(-B + 1..B)))
                    .collect::<Vector>()
            })
            .collect::<Vec<_>>()
            .into()
    };
    let x = random_matrix();
    let y = random_matrix();
    let key = authority.derive_key(&msk, &y)?;
    let mut cts = simulation(&params, client_keys, &x)?;
    // the decryptor does not depend on the arrival order
    cts.reverse();

    let expected = ((x.dot(&y)? % BigInt::from(B)) + BigInt::from(B)) % BigInt::from(B);
    eyre::ensure!(
        authority.decrypt(&cts, &key, &y)? == expected,
        "Error while computing the MCFE: incorrect result!"
    );
    Ok(())
}

#[test]
fn test_ipmcfe_misuse() -> Result<()> {
    let mut rng = rand::thread_rng();
    let params = Parameters::generate_multi(3, 2, 1024, 10u32)?;
    let authority = DdhMulti::new(params.clone());
    let (client_keys, msk) = authority.generate_master_keys(&mut rng);

    // `y` must be a `n × l` matrix
    let err = authority
        .derive_key(&msk, &Matrix::from(vec![vec![1, 2], vec![3, 4]]))
        .unwrap_err();
    eyre::ensure!(
        matches!(err.downcast_ref::<Error>(), Some(Error::ShapeMismatch { .. })),
        "wrong number of rows accepted"
    );
    let err = authority
        .derive_key(&msk, &Matrix::from(vec![vec![1, 2], vec![3], vec![5, 6]]))
        .unwrap_err();
    eyre::ensure!(
        matches!(err.downcast_ref::<Error>(), Some(Error::ShapeMismatch { .. })),
        "ragged matrix accepted"
    );

    let client = DdhMultiClient::new(params, client_keys[0].clone())?;
    let err = client
        .encrypt(&Vector::from(vec![1, 2, 3]), &mut rng)
        .unwrap_err();
    eyre::ensure!(
        matches!(err.downcast_ref::<Error>(), Some(Error::ShapeMismatch { .. })),
        "wrong plaintext length accepted"
    );

    // every client has to contribute
    let y = Matrix::from(vec![vec![1, 1], vec![1, 1], vec![1, 1]]);
    let key = authority.derive_key(&msk, &y)?;
    let ct = client.encrypt(&Vector::from(vec![1, 2]), &mut rng)?;
    let err = authority.decrypt(&[ct], &key, &y).unwrap_err();
    eyre::ensure!(
        err.downcast_ref::<Error>() == Some(&Error::ProtocolMisuse(Misuse::MissingContribution)),
        "partial set of cyphertexts accepted"
    );
    Ok(())
}
