//! Bounded discrete logarithm.
//!
//! The solver is generic over the [`DlogGroup`] trait, which is implemented
//! for the `Z_p*` subgroup of the DDH schemes and for the pairing target
//! group `Gt` of the decentralized scheme.
//!
//! See [the notes on DLP](crate::notes::dlp) for the algorithm.

use crate::{group::ZpGroup, tools};
use bls12_381::{pairing, G1Affine, G2Affine, Gt, Scalar};
use num_bigint_dig::BigUint;
use std::hash::Hash;

/// Cyclic group with a fixed generator in which to solve a bounded DLP.
pub trait DlogGroup {
    type Element: Clone;
    /// Hashable fingerprint of an element
    type Key: Eq + Hash;

    fn identity(&self) -> Self::Element;
    fn generator(&self) -> Self::Element;
    /// group law
    fn op(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    /// `a^e`
    fn pow(&self, a: &Self::Element, e: u64) -> Self::Element;
    fn invert(&self, a: &Self::Element) -> Self::Element;
    fn key(&self, a: &Self::Element) -> Self::Key;
}

impl DlogGroup for ZpGroup {
    type Element = BigUint;
    type Key = BigUint;

    fn identity(&self) -> BigUint {
        BigUint::from(1u32)
    }

    fn generator(&self) -> BigUint {
        ZpGroup::generator(self).clone()
    }

    fn op(&self, a: &BigUint, b: &BigUint) -> BigUint {
        self.mul(a, b)
    }

    fn pow(&self, a: &BigUint, e: u64) -> BigUint {
        self.exp(a, &BigUint::from(e))
    }

    fn invert(&self, a: &BigUint) -> BigUint {
        self.inv(a)
    }

    fn key(&self, a: &BigUint) -> BigUint {
        a.clone()
    }
}

/// Pairing target group of BLS12-381, generated by `e(g₁, g₂)`.
#[derive(Clone, Copy, Debug)]
pub struct GtGroup {
    g: Gt,
}

impl GtGroup {
    pub fn new() -> Self {
        GtGroup {
            g: pairing(&G1Affine::generator(), &G2Affine::generator()),
        }
    }
}

impl Default for GtGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl DlogGroup for GtGroup {
    type Element = Gt;
    type Key = [u8; 32];

    fn identity(&self) -> Gt {
        Gt::identity()
    }

    fn generator(&self) -> Gt {
        self.g
    }

    fn op(&self, a: &Gt, b: &Gt) -> Gt {
        a + b
    }

    fn pow(&self, a: &Gt, e: u64) -> Gt {
        a * Scalar::from(e)
    }

    fn invert(&self, a: &Gt) -> Gt {
        -a
    }

    fn key(&self, a: &Gt) -> [u8; 32] {
        tools::gt_digest(a)
    }
}

/// Implement the Baby Step Giant Step algorithm to solve the DLP.
pub mod bsgs {
    use super::DlogGroup;
    use crate::error::Error;
    use eyre::Result;
    use std::collections::HashMap;
    use tracing::{debug, instrument, trace, warn};

    /// Largest precomputation table the solver builds. Searches needing more
    /// baby steps are refused before anything is allocated.
    pub const MAX_BABY_STEPS: u64 = 1 << 22;

    /// Smallest `m` such that `m² ≥ bound`.
    pub(crate) fn ceil_sqrt(bound: u64) -> u64 {
        let mut m = (bound as f64).sqrt() as u64;
        while (m as u128) * (m as u128) < bound as u128 {
            m += 1;
        }
        while m > 0 && ((m - 1) as u128) * ((m - 1) as u128) >= bound as u128 {
            m -= 1;
        }
        m
    }

    /// This algorithm implements the precomputation step of the BSGS algorithm.
    /// It returns a hashed map containing the pairs `(H(g^j), j)` for `j < m`.
    ///
    /// - `m`:  number of pairs to precompute
    fn precomputation<G: DlogGroup>(group: &G, m: u64) -> Result<HashMap<G::Key, u64>> {
        let g = group.generator();
        let mut pairs = HashMap::with_capacity(m as usize);
        let mut p_j = group.identity();
        for j in 0..m {
            if let Some(i) = pairs.insert(group.key(&p_j), j) {
                // the generator has an order smaller than `m`
                eyre::bail!(
                    "Collision during the precomputation step of the BSGS: `g^{} = g^{}`",
                    i,
                    j
                );
            }
            p_j = group.op(&p_j, &g);
        }
        Ok(pairs)
    }

    /// Find `x ∈ [0, bound)` such that `g^x = h`.
    ///
    /// Runs in `O(√bound)` time and space. Fails with
    /// [`Error::DlogOutOfBound`] when no such `x` exists, and with
    /// [`Error::InvalidParameters`] when `√bound` exceeds [`MAX_BABY_STEPS`].
    ///
    /// - `group`: group and generator `g`
    /// - `h`:     right member of the DLP equation
    /// - `bound`: exclusive upper bound on the solution
    #[instrument(level = "debug", skip(group, h))]
    pub fn solve<G: DlogGroup>(group: &G, h: &G::Element, bound: u64) -> Result<u64> {
        let out_of_bound = || {
            eyre::Report::new(Error::DlogOutOfBound {
                bound: bound.to_string(),
            })
        };
        if bound == 0 {
            return Err(out_of_bound());
        }
        let m = ceil_sqrt(bound);
        if m > MAX_BABY_STEPS {
            return Err(eyre::Report::new(Error::InvalidParameters(format!(
                "a search below {} needs {} baby steps, more than {}",
                bound, m, MAX_BABY_STEPS
            ))));
        }
        let pairs = precomputation(group, m)?;
        debug!(baby_steps = m, "precomputation done");

        // giant step: `g^-m`
        let q = group.invert(&group.pow(&group.generator(), m));
        let giant_steps = bound
            .checked_add(m - 1)
            .map_or(bound / m + 1, |b| b / m);
        let mut p_k = h.clone();
        for k in 0..giant_steps {
            if let Some(&j) = pairs.get(&group.key(&p_k)) {
                let x = k * m + j;
                trace!(giant_step = k, baby_step = j, "match");
                return if x < bound {
                    Ok(x)
                } else {
                    Err(out_of_bound())
                };
            }
            p_k = group.op(&p_k, &q);
        }
        warn!(bound, "discrete logarithm search exhausted its range");
        Err(out_of_bound())
    }

    /// Find `x ∈ (-bound, bound)` such that `g^x = h`.
    ///
    /// The search is shifted to `[0, 2.bound - 1)` by multiplying `h` by
    /// `g^(bound-1)`.
    pub fn solve_signed<G: DlogGroup>(group: &G, h: &G::Element, bound: u64) -> Result<i128> {
        if bound == 0 {
            return Err(eyre::Report::new(Error::DlogOutOfBound {
                bound: bound.to_string(),
            }));
        }
        let shift = bound - 1;
        let shifted = group.op(h, &group.pow(&group.generator(), shift));
        let width = bound
            .checked_mul(2)
            .map(|b| b - 1)
            .ok_or_else(|| eyre::eyre!("Bound {} is too big for a signed search!", bound))?;
        let x = solve(group, &shifted, width).map_err(|err| match err.downcast_ref::<Error>() {
            Some(Error::DlogOutOfBound { .. }) => eyre::Report::new(Error::DlogOutOfBound {
                bound: bound.to_string(),
            }),
            _ => err,
        })?;
        Ok(x as i128 - shift as i128)
    }

    /// Check that a signed search below `bound` fits in the precomputation
    /// table, so that decryption does not fail on valid cyphertexts.
    pub fn check_signed_bound(bound: u64) -> Result<()> {
        let width = bound
            .checked_mul(2)
            .ok_or_else(|| eyre::eyre!("Bound {} is too big for a signed search!", bound))?;
        if ceil_sqrt(width) > MAX_BABY_STEPS {
            eyre::bail!(
                "The bound {} needs more than {} baby steps!",
                bound,
                MAX_BABY_STEPS
            );
        }
        Ok(())
    }

}

/// Convert a discrete logarithm bound into a `u64` and check that a signed
/// search below it is computable.
pub(crate) fn bound_to_u64(bound: &BigUint) -> eyre::Result<u64> {
    use num_traits::ToPrimitive;
    let bound = bound
        .to_u64()
        .ok_or_else(|| eyre::eyre!("The bound {} is too big to be computable!", bound))?;
    bsgs::check_signed_bound(bound)?;
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use eyre::Result;
    use rand::Rng;

    fn small_group() -> Result<ZpGroup> {
        ZpGroup::generate(64, &mut rand::thread_rng())
    }

    #[test]
    fn test_bsgs_zp() -> Result<()> {
        let group = small_group()?;
        const M: u64 = 10_000;
        let x: u64 = rand::thread_rng().gen_range(0..M);
        let h = group.exp_g(&BigUint::from(x));
        eyre::ensure!(bsgs::solve(&group, &h, M)? == x, "Wrong DLP solution!");
        Ok(())
    }

    #[test]
    fn test_bsgs_boundary() -> Result<()> {
        let group = small_group()?;
        const M: u64 = 1_000;
        // bound exactly met
        let h = group.exp_g(&BigUint::from(M - 1));
        eyre::ensure!(bsgs::solve(&group, &h, M)? == M - 1, "Wrong DLP solution!");
        // bound exceeded by one
        let h = group.exp_g(&BigUint::from(M));
        let err = bsgs::solve(&group, &h, M).unwrap_err();
        eyre::ensure!(
            matches!(err.downcast_ref::<Error>(), Some(Error::DlogOutOfBound { .. })),
            "Expected an out-of-bound error, got {}",
            err
        );
        // identity
        eyre::ensure!(bsgs::solve(&group, &BigUint::from(1u32), 1)? == 0, "Wrong DLP solution!");
        Ok(())
    }

    #[test]
    fn test_bsgs_signed() -> Result<()> {
        let group = small_group()?;
        const M: u64 = 500;
        for x in [-(M as i64) + 1, -17, 0, 42, M as i64 - 1] {
            let h = group.exp_signed(group.generator(), &x.into());
            eyre::ensure!(
                bsgs::solve_signed(&group, &h, M)? == x as i128,
                "Wrong DLP solution for {}!",
                x
            );
        }
        let h = group.exp_signed(group.generator(), &(-(M as i64)).into());
        eyre::ensure!(bsgs::solve_signed(&group, &h, M).is_err(), "-M accepted");
        Ok(())
    }

    #[test]
    fn test_bsgs_gt() -> Result<()> {
        let group = GtGroup::new();
        const M: u64 = 2_000;
        let x: u64 = rand::thread_rng().gen_range(0..M);
        let h = group.generator() * Scalar::from(x);
        eyre::ensure!(bsgs::solve(&group, &h, M)? == x, "Wrong DLP solution!");
        let h = -(group.generator() * Scalar::from(x));
        eyre::ensure!(
            bsgs::solve_signed(&group, &h, M)? == -(x as i128),
            "Wrong signed DLP solution!"
        );
        Ok(())
    }
}
