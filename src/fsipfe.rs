//! Fully secure inner-product functional encryption, Damgård flavor.
//!
//! Shweta Agrawal, Benoît Libert, and Damien Stehlé, "Fully Secure
//! Functional Encryption for Inner Products, from Standard Assumptions",
//! CRYPTO 2016.
//!
//! The scheme works with two generators `g` and `h = g^a` of the same
//! subgroup. The master secret key is a pair of vectors `(s, t)` and the
//! functional key associated to `y` is the pair `(<s, y>, <t, y>)`.

use crate::{dlp::bsgs, error::Error, params::Parameters, types::Vector};
use eyre::Result;
use num_bigint_dig::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};
use tracing::instrument;

/// Master secret key `(sᵢ, tᵢ)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasterSecretKey {
    pub(crate) s: Vec<BigUint>,
    pub(crate) t: Vec<BigUint>,
}

/// Master public key `(g^sᵢ.h^tᵢ)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasterPublicKey(pub Vec<BigUint>);

/// Functional key `(<s, y>, <t, y>) mod q`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionalKey {
    pub(crate) k1: BigUint,
    pub(crate) k2: BigUint,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CypherText {
    /// `g^r`
    pub c0: BigUint,
    /// `h^r`
    pub d0: BigUint,
    /// `(g^xᵢ.mpkᵢ^r)`
    pub cx: Vec<BigUint>,
}

/// Damgård based IPFE instance, shared by the key authority, the
/// encryptors and the decryptor.
#[derive(Clone, Debug)]
pub struct Damgard {
    params: Parameters,
    h: BigUint,
}

impl Damgard {
    /// Draw the second generator `h = g^a` for the given parameters.
    #[instrument(level = "debug", skip_all, fields(l = params.l))]
    pub fn new<R: RngCore + CryptoRng>(params: Parameters, rng: &mut R) -> Self {
        let group = &params.group;
        let a = group.random_exponent_from(&BigUint::from(2u32), rng);
        let h = group.exp_g(&a);
        Damgard { params, h }
    }

    /// Rebuild an instance from published parameters.
    pub fn from_parts(params: Parameters, h: BigUint) -> Result<Self> {
        if h.is_one() || !params.group.contains(&h) {
            return Err(eyre::Report::new(Error::InvalidParameters(
                "h is not a generator of the subgroup".to_string(),
            )));
        }
        Ok(Damgard { params, h })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Second generator `h`
    pub fn h(&self) -> &BigUint {
        &self.h
    }

    /// Sample `(s, t)` and return `(msk, mpk)` with `mpkᵢ = g^sᵢ.h^tᵢ`.
    #[instrument(level = "debug", skip_all, fields(l = self.params.l))]
    pub fn generate_master_keys<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> (MasterSecretKey, MasterPublicKey) {
        let group = &self.params.group;
        let two = BigUint::from(2u32);
        let mut s = Vec::with_capacity(self.params.l);
        let mut t = Vec::with_capacity(self.params.l);
        let mut mpk = Vec::with_capacity(self.params.l);
        for _ in 0..self.params.l {
            let si = group.random_exponent_from(&two, rng);
            let ti = group.random_exponent_from(&two, rng);
            mpk.push(group.mul(&group.exp_g(&si), &group.exp(&self.h, &ti)));
            s.push(si);
            t.push(ti);
        }
        (MasterSecretKey { s, t }, MasterPublicKey(mpk))
    }

    /// Return `(<s, y>, <t, y>) mod q`.
    #[instrument(level = "debug", skip_all, fields(l = self.params.l))]
    pub fn derive_key(&self, msk: &MasterSecretKey, y: &Vector) -> Result<FunctionalKey> {
        y.check_len(self.params.l)?;
        y.check_bound(&self.params.signed_bound())?;
        if msk.s.len() != y.len() || msk.t.len() != y.len() {
            return Err(Error::shape(msk.s.len(), y.len()));
        }
        let group = &self.params.group;
        Ok(FunctionalKey {
            k1: group.reduce(&weighted_sum(&msk.s, y)),
            k2: group.reduce(&weighted_sum(&msk.t, y)),
        })
    }

    /// Return `(g^r, h^r, (g^xᵢ.mpkᵢ^r))` for a fresh `r`.
    #[instrument(level = "debug", skip_all, fields(l = self.params.l))]
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        x: &Vector,
        mpk: &MasterPublicKey,
        rng: &mut R,
    ) -> Result<CypherText> {
        x.check_len(self.params.l)?;
        x.check_bound(&self.params.signed_bound())?;
        if mpk.0.len() != x.len() {
            return Err(Error::shape(x.len(), mpk.0.len()));
        }
        let group = &self.params.group;
        let r = group.random_exponent_from(&BigUint::one(), rng);
        let cx = x
            .iter()
            .zip(mpk.0.iter())
            .map(|(xi, mpki)| {
                group.mul(
                    &group.exp_signed(group.generator(), xi),
                    &group.exp(mpki, &r),
                )
            })
            .collect();
        Ok(CypherText {
            c0: group.exp_g(&r),
            d0: group.exp(&self.h, &r),
            cx,
        })
    }

    /// Recover `<x, y>` from `Prod(cᵢ^yᵢ) / (c0^k1.d0^k2) = g^<x,y>`.
    #[instrument(level = "debug", skip_all, fields(l = self.params.l))]
    pub fn decrypt(&self, ct: &CypherText, key: &FunctionalKey, y: &Vector) -> Result<BigInt> {
        y.check_len(self.params.l)?;
        y.check_bound(&self.params.signed_bound())?;
        if ct.cx.len() != y.len() {
            return Err(Error::shape(y.len(), ct.cx.len()));
        }
        let group = &self.params.group;
        let num = ct
            .cx
            .iter()
            .zip(y.iter())
            .fold(BigUint::one(), |acc, (ci, yi)| {
                group.mul(&acc, &group.exp_signed(ci, yi))
            });
        let denom = group.mul(&group.exp(&ct.c0, &key.k1), &group.exp(&ct.d0, &key.k2));
        let h = group.mul(&num, &group.inv(&denom));
        Ok(bsgs::solve_signed(group, &h, self.params.dlog_bound)?.into())
    }
}

/// `Σ uᵢ.yᵢ` over the integers
fn weighted_sum(u: &[BigUint], y: &Vector) -> BigInt {
    u.iter().zip(y.iter()).fold(BigInt::zero(), |acc, (ui, yi)| {
        acc + BigInt::from_biguint(Sign::Plus, ui.clone()) * yi
    })
}
