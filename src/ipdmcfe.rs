//! Decentralized multi-client inner-product functional encryption.
//!
//! Jérémy Chotard, Edouard Dufour Sans, Romain Gay, Duong Hieu Phan, and
//! David Pointcheval, "Decentralized Multi-Client Functional Encryption for
//! Inner Product", ASIACRYPT 2018.
//!
//! Each client `i` holds one coordinate `xᵢ` and a secret `sᵢ ∈ Z_r²`. The
//! clients agree on matrices `Tᵢ` such that `Σ Tᵢ = 0` through a single
//! round of Diffie-Hellman exchanges in `G1`; no trusted authority is needed.
//!
//! - encryption:        `cᵢ = [u_l.sᵢ + xᵢ]₁` where `u_l = H1(label)`
//! - key share:         `dᵢ = [Tᵢ.H2(y) + yᵢ.sᵢ]₂`
//! - decryption:        `e(Σ yᵢ.cᵢ, g₂) - e(u_l, Σ dᵢ) = [<x, y>]_T`

use crate::{
    dlp::{self, bsgs, GtGroup},
    error::{Error, Misuse},
    label::Label,
    params::{self, Scheme},
    tools,
    types::{DVec, TMat, Vector},
};
use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar};
use eyre::Result;
use num_bigint_dig::{BigInt, BigUint, Sign};
use num_traits::Signed;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Public parameters of the decentralized scheme. The curve is BLS12-381.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DmcfeParameters {
    /// n: number of clients, one coordinate each
    pub clients: usize,
    /// B: coordinates bound
    pub bound: BigUint,
    dlog_bound: u64,
}

impl DmcfeParameters {
    pub fn new(clients: usize, bound: impl Into<BigUint>) -> Result<Self> {
        let bound = bound.into();
        params::check_sizes(clients, 1, &bound)?;
        let ip_bound = Scheme::DecentralizedMultiClient.inner_product_bound(1, clients, &bound);
        if ip_bound >= tools::scalar_modulus()? {
            return Err(eyre::Report::new(Error::InvalidParameters(format!(
                "the inner product bound {} exceeds the curve order",
                ip_bound
            ))));
        }
        let dlog_bound = dlp::bound_to_u64(&ip_bound)
            .map_err(|err| eyre::Report::new(Error::InvalidParameters(err.to_string())))?;
        Ok(DmcfeParameters {
            clients,
            bound,
            dlog_bound,
        })
    }

    /// Bound used by the discrete logarithm search.
    pub fn dlog_bound(&self) -> u64 {
        self.dlog_bound
    }

    fn signed_bound(&self) -> BigInt {
        BigInt::from_biguint(Sign::Plus, self.bound.clone())
    }
}

/// Public key published by a client during the exchange round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PublicKey {
    pub index: usize,
    pub key: G1Projective,
}

/// DMCFE cyphertext of one client for one label
#[derive(Clone, Debug, PartialEq)]
pub struct CypherText {
    pub index: usize,
    pub label: Label,
    pub(crate) c: G1Projective,
}

/// Partial functional key of one client
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyShare {
    pub index: usize,
    /// digest of the vector the share was derived for
    pub(crate) y_digest: [u8; 32],
    pub(crate) d: DVec<G2Projective>,
}

/// Decentralized client. The private share is set once, after all the
/// public keys have been collected.
///
/// A client is not `Clone`: two copies would keep separate label ledgers.
pub struct DmcfeClient {
    idx: usize,
    params: DmcfeParameters,
    sec: Scalar,
    pub_key: G1Projective,
    s: DVec<Scalar>,
    share: Option<TMat<Scalar>>,
    /// digest of the value already encrypted, by label
    used_labels: HashMap<Label, [u8; 32]>,
}

impl DmcfeClient {
    /// Draw the client keys.
    /// - `idx`: client index in `[0, n)`
    #[instrument(level = "debug", skip(params, rng))]
    pub fn new<R: RngCore + CryptoRng>(
        idx: usize,
        params: &DmcfeParameters,
        rng: &mut R,
    ) -> Result<Self> {
        if idx >= params.clients {
            return Err(Error::shape(format!("client index < {}", params.clients), idx));
        }
        let sec = tools::random_scalar(rng);
        Ok(DmcfeClient {
            idx,
            params: params.clone(),
            sec,
            pub_key: tools::smul_in_g1(&sec),
            s: DVec::new((tools::random_scalar(rng), tools::random_scalar(rng))),
            share: None,
            used_labels: HashMap::new(),
        })
    }

    pub fn index(&self) -> usize {
        self.idx
    }

    /// Key to broadcast to the other clients.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            index: self.idx,
            key: self.pub_key,
        }
    }

    /// Compute `Tᵢ = Σ_{k≠i} ±H(pkᵢ, pkₖ, sk_i.pkₖ)`, the sign being `+` when
    /// `k > i`, so that the matrices of all the clients sum to zero.
    ///
    /// - `pub_keys`: the public keys of all the clients, in any order
    #[instrument(level = "debug", skip_all, fields(client = self.idx))]
    pub fn set_share(&mut self, pub_keys: &[PublicKey]) -> Result<()> {
        if self.share.is_some() {
            return Err(Error::misuse(Misuse::ShareAlreadySet));
        }
        let keys = order_by_client(pub_keys, self.params.clients, |pk| pk.index)
            .map_err(|_| Error::misuse(Misuse::PublicKeys))?;
        if keys[self.idx].key != self.pub_key {
            return Err(Error::misuse(Misuse::PublicKeys));
        }

        let mut t = TMat::<Scalar>::default();
        for (k, pk) in keys.iter().enumerate() {
            if k == self.idx {
                continue;
            }
            let shared = pk.key * self.sec;
            let (lo, hi) = if k < self.idx {
                (&pk.key, &self.pub_key)
            } else {
                (&self.pub_key, &pk.key)
            };
            let h = |entry| tools::hash_to_scalar(lo, hi, &shared, entry);
            let tk = TMat::new(h(0), h(1), h(2), h(3));
            if k > self.idx {
                t += &tk;
            } else {
                t -= &tk;
            }
        }
        self.share = Some(t);
        debug!("private share set");
        Ok(())
    }

    /// Encrypt `x` for the given label: `c = [u_l.s + x]₁`.
    ///
    /// Encrypting another value under a label already used is refused;
    /// encrypting the same value again yields the same cyphertext.
    #[instrument(level = "debug", skip_all, fields(client = self.idx, label = %label))]
    pub fn encrypt(&mut self, x: &BigInt, label: &Label) -> Result<CypherText> {
        if x.abs() >= self.params.signed_bound() {
            return Err(eyre::Report::new(Error::CoordinateOutOfBound {
                index: self.idx,
                bound: self.params.bound.to_string(),
            }));
        }
        let x_digest = integers_digest(std::iter::once(x));
        if let Some(previous) = self.used_labels.get(label) {
            if previous != &x_digest {
                return Err(Error::misuse(Misuse::LabelReuse));
            }
        }
        let u = label_hash(label);
        let c = u[0] * self.s[0] + u[1] * self.s[1] + tools::smul_in_g1(&tools::bigint_to_scalar(x)?);
        self.used_labels.insert(label.clone(), x_digest);
        Ok(CypherText {
            index: self.idx,
            label: label.clone(),
            c,
        })
    }

    /// Derive the key share `dᵢ = [Tᵢ.H2(y) + yᵢ.sᵢ]₂`.
    /// - `y`: the complete function vector, one coordinate per client
    #[instrument(level = "debug", skip_all, fields(client = self.idx))]
    pub fn derive_key_share(&self, y: &Vector) -> Result<KeyShare> {
        y.check_len(self.params.clients)?;
        y.check_bound(&self.params.signed_bound())?;
        let t = self.share.as_ref().ok_or_else(|| Error::misuse(Misuse::ShareNotSet))?;
        let y_digest = vector_digest(y);
        let v = DVec::new((
            tools::hash_to_g2(&Label::from_bytes(&y_digest).coordinate(0)),
            tools::hash_to_g2(&Label::from_bytes(&y_digest).coordinate(1)),
        ));
        let yi = tools::bigint_to_scalar(&y[self.idx])?;
        let d = (t * &v) + (&self.s * &yi).map(tools::smul_in_g2);
        Ok(KeyShare {
            index: self.idx,
            y_digest,
            d,
        })
    }
}

/// Combine the cyphertexts and key shares of all the clients into `<x, y>`.
///
/// - `cts`:        one cyphertext per client, all for `label`, in any order
/// - `key_shares`: one key share per client, all derived for `y`
/// - `y`:          the function vector
/// - `label`:      the label of the cyphertexts
#[instrument(level = "debug", skip_all, fields(n = params.clients, label = %label))]
pub fn decrypt(
    cts: &[CypherText],
    key_shares: &[KeyShare],
    y: &Vector,
    label: &Label,
    params: &DmcfeParameters,
) -> Result<BigInt> {
    let n = params.clients;
    y.check_len(n)?;
    y.check_bound(&params.signed_bound())?;
    if cts.iter().any(|ct| &ct.label != label) {
        return Err(Error::misuse(Misuse::LabelMismatch));
    }
    let cts = order_by_client(cts, n, |ct| ct.index)?;
    let y_digest = vector_digest(y);
    if key_shares.iter().any(|share| share.y_digest != y_digest) {
        return Err(Error::misuse(Misuse::ForeignKeyShare));
    }
    let key_shares = order_by_client(key_shares, n, |share| share.index)?;

    // `[Σ yᵢ.sᵢ]₂`
    let key = key_shares
        .iter()
        .skip(1)
        .fold(key_shares[0].d, |acc, share| acc + share.d);

    let mut c = G1Projective::identity();
    for (ct, yi) in cts.iter().zip(y.iter()) {
        c += ct.c * tools::bigint_to_scalar(yi)?;
    }
    let u = label_hash(label);
    let h: Gt = pairing(&G1Affine::from(c), &G2Affine::generator())
        - pairing(&G1Affine::from(u[0]), &G2Affine::from(key[0]))
        - pairing(&G1Affine::from(u[1]), &G2Affine::from(key[1]));
    Ok(bsgs::solve_signed(&GtGroup::new(), &h, params.dlog_bound)?.into())
}

/// `u_l = (H1("0 label"), H1("1 label"))`
fn label_hash(label: &Label) -> DVec<G1Projective> {
    DVec::new((
        tools::hash_to_g1(&label.coordinate(0)),
        tools::hash_to_g1(&label.coordinate(1)),
    ))
}

/// Length-prefixed Sha256 digest of a vector.
fn vector_digest(y: &Vector) -> [u8; 32] {
    integers_digest(y.iter())
}

fn integers_digest<'a, I: ExactSizeIterator<Item = &'a BigInt>>(values: I) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update((values.len() as u64).to_be_bytes());
    for v in values {
        let bytes = v.to_signed_bytes_be();
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(&bytes);
    }
    hasher.finalize().into()
}

/// Sort client contributions by index, rejecting missing and duplicated ones.
fn order_by_client<T, F: Fn(&T) -> usize>(items: &[T], n: usize, index: F) -> Result<Vec<&T>> {
    let mut ordered: Vec<Option<&T>> = vec![None; n];
    for item in items {
        let i = index(item);
        match ordered.get_mut(i) {
            None => return Err(Error::shape(format!("client index < {}", n), i)),
            Some(Some(_)) => return Err(Error::misuse(Misuse::DuplicateContribution)),
            Some(slot) => *slot = Some(item),
        }
    }
    ordered
        .into_iter()
        .map(|item| item.ok_or_else(|| Error::misuse(Misuse::MissingContribution)))
        .collect()
}
