//! Multi-client inner-product functional encryption.
//!
//! Each of the `n` clients encrypts its own slice `xᵢ` of the data with a
//! DDH based IPFE instance after blinding it with a one-time pad:
//! `x'ᵢ = xᵢ + otpᵢ mod B`. The functional key associated to the matrix `Y`
//! carries the per-client IPFE keys and `z = Σ<otpᵢ, yᵢ> mod B`, so that the
//! pads only cancel when the ciphertexts of *all* the clients are combined.
//!
//! The decryptor recovers `<X, Y> mod B`.

use crate::{
    dlp::bsgs,
    error::{Error, Misuse},
    group,
    ipfe,
    params::Parameters,
    types::{Matrix, Vector},
};
use eyre::Result;
use num_bigint_dig::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};

/// Key material privately delivered to one encryptor: its IPFE public key
/// and its one-time pad.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientKey {
    /// index of the client in `[0, n)`
    pub index: usize,
    pub(crate) mpk: ipfe::MasterPublicKey,
    pub(crate) otp: Vector,
}

impl ClientKey {
    pub fn public_key(&self) -> &ipfe::MasterPublicKey {
        &self.mpk
    }
}

/// MCFE master secret key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasterSecretKey {
    /// - `msk`: IPFE master secret key of each client
    pub(crate) msk: Vec<ipfe::MasterSecretKey>,
    /// - `otp`: one-time pads, one row per client
    pub(crate) otp: Matrix,
}

/// MCFE functional key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionalKey {
    /// - `keys`: IPFE functional key of each client
    pub(crate) keys: Vec<ipfe::FunctionalKey>,
    /// - `z`   : `Σ<otpᵢ, yᵢ> mod B`
    pub(crate) z: BigInt,
}

/// MCFE cyphertext of one client
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CypherText {
    pub index: usize,
    pub(crate) ct: ipfe::CypherText,
}

/// Key authority and decryptor of the multi-client scheme.
#[derive(Clone, Debug)]
pub struct DdhMulti {
    params: Parameters,
}

impl DdhMulti {
    pub fn new(params: Parameters) -> Self {
        DdhMulti { params }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Generate an IPFE key pair and a one-time pad per client. The
    /// `ClientKey`s are meant to be sent to the clients over a private
    /// channel.
    #[instrument(level = "debug", skip_all, fields(n = self.params.clients, l = self.params.l))]
    pub fn generate_master_keys<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> (Vec<ClientKey>, MasterSecretKey) {
        let (n, l) = (self.params.clients, self.params.l);
        let mut msk = Vec::with_capacity(n);
        let mut otp = Vec::with_capacity(n);
        let mut client_keys = Vec::with_capacity(n);
        for index in 0..n {
            let (mski, mpki) = ipfe::setup(&self.params.group, l, rng);
            let otpi = (0..l)
                .map(|_| {
                    BigInt::from_biguint(Sign::Plus, group::random_below(&self.params.bound, rng))
                })
                .collect::<Vector>();
            client_keys.push(ClientKey {
                index,
                mpk: mpki,
                otp: otpi.clone(),
            });
            msk.push(mski);
            otp.push(otpi);
        }
        (
            client_keys,
            MasterSecretKey {
                msk,
                otp: Matrix::new(otp),
            },
        )
    }

    /// Compute the functional key for the `n × l` matrix `y`.
    #[instrument(level = "debug", skip_all, fields(n = self.params.clients, l = self.params.l))]
    pub fn derive_key(&self, msk: &MasterSecretKey, y: &Matrix) -> Result<FunctionalKey> {
        y.check_shape(self.params.clients, self.params.l)?;
        y.check_bound(&self.params.signed_bound())?;
        if msk.msk.len() != y.len() {
            return Err(Error::shape(y.len(), msk.msk.len()));
        }
        let keys = msk
            .msk
            .iter()
            .zip(y.iter())
            .map(|(mski, yi)| ipfe::key_der(&self.params.group, mski, yi))
            .collect::<Result<Vec<_>>>()?;
        let z = mod_bound(&msk.otp.dot(y)?, &self.params.signed_bound());
        Ok(FunctionalKey { keys, z })
    }

    /// Combine the cyphertexts of all the clients and return `<X, Y> mod B`.
    ///
    /// - `cts`: one cyphertext per client, in any order
    /// - `key`: functional key associated to `y`
    /// - `y`  : the matrix associated to the decrypted function
    #[instrument(level = "debug", skip_all, fields(n = self.params.clients, l = self.params.l))]
    pub fn decrypt(&self, cts: &[CypherText], key: &FunctionalKey, y: &Matrix) -> Result<BigInt> {
        y.check_shape(self.params.clients, self.params.l)?;
        y.check_bound(&self.params.signed_bound())?;
        if key.keys.len() != self.params.clients {
            return Err(Error::shape(self.params.clients, key.keys.len()));
        }
        let cts = order_by_client(cts, self.params.clients)?;

        let group = &self.params.group;
        // `g^Σ<x'ᵢ, yᵢ>`
        let h = cts
            .iter()
            .zip(y.iter())
            .zip(key.keys.iter())
            .try_fold(BigUint::one(), |acc, ((ct, yi), ki)| {
                Ok::<_, eyre::Report>(group.mul(&acc, &ipfe::decrypt(group, &ct.ct, yi, ki)?))
            })?;
        let padded = bsgs::solve_signed(group, &h, self.params.dlog_bound)?;
        debug!("padded inner product recovered");
        Ok(mod_bound(
            &(BigInt::from(padded) - &key.z),
            &self.params.signed_bound(),
        ))
    }
}

/// Encryptor of one client. It only knows the public parameters and its
/// own `ClientKey`.
#[derive(Clone, Debug)]
pub struct DdhMultiClient {
    params: Parameters,
    key: ClientKey,
}

impl DdhMultiClient {
    pub fn new(params: Parameters, key: ClientKey) -> Result<Self> {
        if key.index >= params.clients {
            return Err(Error::shape(
                format!("client index < {}", params.clients),
                key.index,
            ));
        }
        key.otp.check_len(params.l)?;
        if key.mpk.0.len() != params.l {
            return Err(Error::shape(params.l, key.mpk.0.len()));
        }
        Ok(DdhMultiClient { params, key })
    }

    pub fn index(&self) -> usize {
        self.key.index
    }

    /// Blind `xᵢ` with the one-time pad and encrypt it under the client
    /// IPFE key.
    #[instrument(level = "debug", skip_all, fields(client = self.key.index))]
    pub fn encrypt<R: RngCore + CryptoRng>(&self, x: &Vector, rng: &mut R) -> Result<CypherText> {
        x.check_len(self.params.l)?;
        let bound = self.params.signed_bound();
        x.check_bound(&bound)?;
        let padded = x
            .iter()
            .zip(self.key.otp.iter())
            .map(|(xi, otpi)| mod_bound(&(xi + otpi), &bound))
            .collect::<Vector>();
        Ok(CypherText {
            index: self.key.index,
            ct: ipfe::encrypt(&self.params.group, &self.key.mpk, &padded, rng)?,
        })
    }
}

/// Representative of `v mod bound` in `[0, bound)`.
fn mod_bound(v: &BigInt, bound: &BigInt) -> BigInt {
    let r = v % bound;
    if r < BigInt::zero() {
        r + bound
    } else {
        r
    }
}

/// Sort the cyphertexts by client index, rejecting missing and duplicated
/// contributions.
fn order_by_client(cts: &[CypherText], n: usize) -> Result<Vec<&CypherText>> {
    let mut ordered: Vec<Option<&CypherText>> = vec![None; n];
    for ct in cts {
        match ordered.get_mut(ct.index) {
            None => return Err(Error::shape(format!("client index < {}", n), ct.index)),
            Some(Some(_)) => return Err(Error::misuse(Misuse::DuplicateContribution)),
            Some(slot) => *slot = Some(ct),
        }
    }
    ordered
        .into_iter()
        .map(|ct| ct.ok_or_else(|| Error::misuse(Misuse::MissingContribution)))
        .collect()
}
