//! Selectively secure inner-product functional encryption from DDH.
//!
//! Michel Abdalla, Florent Bourse, Angelo De Caro, and David Pointcheval,
//! "Simple Functional Encryption Schemes for Inner Products", PKC 2015.

use crate::{
    dlp::bsgs,
    error::Error,
    group::ZpGroup,
    params::Parameters,
    types::Vector,
};
use eyre::Result;
use num_bigint_dig::{BigInt, BigUint};
use rand_core::{CryptoRng, RngCore};
use tracing::instrument;

/// IPFE master secret key `(sᵢ)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasterSecretKey(pub(crate) Vec<BigUint>);

/// IPFE master public key `(g^sᵢ)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasterPublicKey(pub Vec<BigUint>);

/// IPFE functional key `<s, y> mod q`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionalKey(pub(crate) BigUint);

/// IPFE cyphertext type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CypherText {
    /// `g^r`
    pub c0: BigUint,
    /// `(hᵢ^r.g^xᵢ)`
    pub cx: Vec<BigUint>,
}

/// DDH based IPFE instance. The same instance type serves the key
/// authority, the encryptors and the decryptor: all of them only share the
/// public parameters.
#[derive(Clone, Debug)]
pub struct Ddh {
    params: Parameters,
}

impl Ddh {
    pub fn new(params: Parameters) -> Self {
        Ddh { params }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// This algorithm implements the `Setup` function of the IPFE scheme.
    /// It returns `(msk, mpk)`, the master secret an public keys.
    #[instrument(level = "debug", skip_all, fields(l = self.params.l))]
    pub fn generate_master_keys<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> (MasterSecretKey, MasterPublicKey) {
        setup(&self.params.group, self.params.l, rng)
    }

    /// This algorithm implements the `KeyDer` function of the IPFE scheme.
    /// It returns `sky = <s,y> mod q`.
    ///
    /// - `msk` : the master secret key
    /// - `y`   : the vector associated to the decrypted function
    #[instrument(level = "debug", skip_all, fields(l = self.params.l))]
    pub fn derive_key(&self, msk: &MasterSecretKey, y: &Vector) -> Result<FunctionalKey> {
        y.check_len(self.params.l)?;
        y.check_bound(&self.params.signed_bound())?;
        key_der(&self.params.group, msk, y)
    }

    /// This algorithm implements the `Encrypt` function of the IPFE scheme.
    /// It returns the pair `(ct_0, (ct_i))`.
    ///
    /// - `x`   : the text to be encrypted
    /// - `mpk` : the master public key
    #[instrument(level = "debug", skip_all, fields(l = self.params.l))]
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        x: &Vector,
        mpk: &MasterPublicKey,
        rng: &mut R,
    ) -> Result<CypherText> {
        x.check_len(self.params.l)?;
        x.check_bound(&self.params.signed_bound())?;
        encrypt(&self.params.group, mpk, x, rng)
    }

    /// This algorithm implements the `Decrypt` function of the IPFE scheme.
    /// It returns `<x, y>`, found as the discrete logarithm of
    /// `Prod(ct_i^y_i)/(ct_0^sky)`.
    ///
    /// - `ct`  : the cypher text
    /// - `sky` : the functional key associated to the function
    /// - `y`   : the vector associated to the decrypted function
    #[instrument(level = "debug", skip_all, fields(l = self.params.l))]
    pub fn decrypt(&self, ct: &CypherText, sky: &FunctionalKey, y: &Vector) -> Result<BigInt> {
        y.check_len(self.params.l)?;
        y.check_bound(&self.params.signed_bound())?;
        let h = decrypt(&self.params.group, ct, y, sky)?;
        Ok(bsgs::solve_signed(&self.params.group, &h, self.params.dlog_bound)?.into())
    }
}

/// Sample `l` secret exponents in `[2, q)` and hide them in the group.
pub(crate) fn setup<R: RngCore + CryptoRng>(
    group: &ZpGroup,
    l: usize,
    rng: &mut R,
) -> (MasterSecretKey, MasterPublicKey) {
    let two = BigUint::from(2u32);
    let msk = (0..l)
        .map(|_| group.random_exponent_from(&two, rng))
        .collect::<Vec<_>>();
    let mpk = msk.iter().map(|si| group.exp_g(si)).collect();
    (MasterSecretKey(msk), MasterPublicKey(mpk))
}

pub(crate) fn key_der(group: &ZpGroup, msk: &MasterSecretKey, y: &Vector) -> Result<FunctionalKey> {
    if y.len() != msk.0.len() {
        return Err(Error::shape(msk.0.len(), y.len()));
    }
    let sky = msk
        .0
        .iter()
        .zip(y.iter())
        .fold(BigInt::from(0), |acc, (si, yi)| {
            acc + BigInt::from_biguint(num_bigint_dig::Sign::Plus, si.clone()) * yi
        });
    Ok(FunctionalKey(group.reduce(&sky)))
}

pub(crate) fn encrypt<R: RngCore + CryptoRng>(
    group: &ZpGroup,
    mpk: &MasterPublicKey,
    x: &Vector,
    rng: &mut R,
) -> Result<CypherText> {
    if x.len() != mpk.0.len() {
        return Err(Error::shape(mpk.0.len(), x.len()));
    }
    let r = group.random_exponent_from(&BigUint::from(1u32), rng);
    let c0 = group.exp_g(&r);
    let cx = x
        .iter()
        .zip(mpk.0.iter())
        .map(|(xi, hi)| group.mul(&group.exp(hi, &r), &group.exp_signed(group.generator(), xi)))
        .collect();
    Ok(CypherText { c0, cx })
}

/// Return `g^<x,y>` without solving the discrete logarithm.
pub(crate) fn decrypt(
    group: &ZpGroup,
    ct: &CypherText,
    y: &Vector,
    sky: &FunctionalKey,
) -> Result<BigUint> {
    if ct.cx.len() != y.len() {
        return Err(Error::shape(y.len(), ct.cx.len()));
    }
    let num = ct
        .cx
        .iter()
        .zip(y.iter())
        .fold(BigUint::from(1u32), |acc, (ci, yi)| {
            group.mul(&acc, &group.exp_signed(ci, yi))
        });
    let denom = group.exp(&ct.c0, &sky.0);
    Ok(group.mul(&num, &group.inv(&denom)))
}
