//! Arithmetic in the order-`q` subgroup of `Z_p*`, where `p = 2q + 1` is a
//! safe prime. This is the group used by the DDH based schemes.

use crate::error::Error;
use eyre::Result;
use num_bigint_dig::{prime::probably_prime, BigInt, BigUint, RandBigInt, RandPrime, Sign};
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};

/// Number of Miller-Rabin rounds used when validating primes.
const MR_ROUNDS: usize = 20;

/// Smallest modulus accepted for fresh generation.
const MIN_BITS: usize = 16;

// RFC 2409 (1024) and RFC 3526 (1536 to 4096) MODP safe primes.
const MODP_1024: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE65381FFFFFFFFFFFFFFFF";
const MODP_1536: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF";
const MODP_2048: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";
const MODP_3072: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E208E24FA074E5AB3143DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF";
const MODP_4096: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E208E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D788719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA993B4EA988D8FDDC186FFB7DC90A6C08F4DF435C934063199FFFFFFFFFFFFFFFF";

/// Order-`q` subgroup of `Z_p*`, with `p = 2q + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZpGroup {
    /// safe prime modulus
    p: BigUint,
    /// prime order of the subgroup, `(p - 1) / 2`
    q: BigUint,
    /// generator of the subgroup
    g: BigUint,
}

impl ZpGroup {
    /// Return the precomputed group of the given bit length, if there is one.
    pub fn precomputed(bits: usize) -> Result<Option<Self>> {
        let hex = match bits {
            1024 => MODP_1024,
            1536 => MODP_1536,
            2048 => MODP_2048,
            3072 => MODP_3072,
            4096 => MODP_4096,
            _ => return Ok(None),
        };
        let p = BigUint::parse_bytes(hex.as_bytes(), 16).ok_or_else(|| {
            eyre::Report::new(Error::ParameterGeneration(format!(
                "cannot parse the {}-bit modulus",
                bits
            )))
        })?;
        Ok(Some(Self::from_safe_prime_unchecked(p)))
    }

    /// Generate a fresh group with a random safe prime of `bits` bits.
    #[instrument(level = "debug", skip(rng))]
    pub fn generate<R: RngCore + CryptoRng>(bits: usize, rng: &mut R) -> Result<Self> {
        if bits < MIN_BITS {
            return Err(eyre::Report::new(Error::ParameterGeneration(format!(
                "a safe prime needs at least {} bits, {} requested",
                MIN_BITS, bits
            ))));
        }
        let mut attempts = 0usize;
        let p = loop {
            attempts += 1;
            let q: BigUint = rng.gen_prime(bits - 1);
            let p: BigUint = (q << 1) + BigUint::one();
            if p.bits() as usize == bits && probably_prime(&p, MR_ROUNDS) {
                break p;
            }
        };
        debug!(attempts, "found a safe prime");
        Ok(Self::from_safe_prime_unchecked(p))
    }

    /// Pick the precomputed group of the given size, or generate a fresh one.
    pub fn for_bit_length<R: RngCore + CryptoRng>(bits: usize, rng: &mut R) -> Result<Self> {
        match Self::precomputed(bits)? {
            Some(group) => Ok(group),
            None => Self::generate(bits, rng),
        }
    }

    /// Build the group for the given modulus, checking it is a safe prime.
    pub fn from_safe_prime(p: BigUint) -> Result<Self> {
        let q: BigUint = (&p - BigUint::one()) >> 1;
        if (p.bits() as usize) < MIN_BITS || !probably_prime(&p, MR_ROUNDS) || !probably_prime(&q, MR_ROUNDS)
        {
            return Err(eyre::Report::new(Error::ParameterGeneration(format!(
                "{} is not a safe prime",
                p
            ))));
        }
        Ok(Self::from_safe_prime_unchecked(p))
    }

    /// `g = 4 = 2²` is a quadratic residue different from 1, hence it
    /// generates the subgroup of order `q`.
    fn from_safe_prime_unchecked(p: BigUint) -> Self {
        let q = (&p - BigUint::one()) >> 1;
        ZpGroup {
            p,
            q,
            g: BigUint::from(4u32),
        }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    pub fn order(&self) -> &BigUint {
        &self.q
    }

    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    /// Bit length of the modulus.
    pub fn bits(&self) -> usize {
        self.p.bits() as usize
    }

    /// `base^e mod p`
    #[inline]
    pub fn exp(&self, base: &BigUint, e: &BigUint) -> BigUint {
        base.modpow(e, &self.p)
    }

    /// `base^e mod p` for a signed exponent; `base` must lie in the subgroup.
    #[inline]
    pub fn exp_signed(&self, base: &BigUint, e: &BigInt) -> BigUint {
        self.exp(base, &self.reduce(e))
    }

    /// `g^e mod p`
    #[inline]
    pub fn exp_g(&self, e: &BigUint) -> BigUint {
        self.exp(&self.g, e)
    }

    /// `a.b mod p`
    #[inline]
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    /// `a^-1 mod p`
    pub fn inv(&self, a: &BigUint) -> BigUint {
        self.exp(a, &(&self.p - BigUint::from(2u32)))
    }

    /// Representative of `e mod q` in `[0, q)`.
    pub fn reduce(&self, e: &BigInt) -> BigUint {
        let q = BigInt::from_biguint(Sign::Plus, self.q.clone());
        let r = ((e % &q) + &q) % &q;
        // `r` is non-negative by construction
        r.to_biguint().unwrap_or_else(BigUint::zero)
    }

    /// Check that `a` is an element of the order-`q` subgroup.
    pub fn contains(&self, a: &BigUint) -> bool {
        !a.is_zero() && a < &self.p && self.exp(a, &self.q).is_one()
    }

    /// Sample an exponent uniformly in `[low, q)`.
    pub fn random_exponent_from<R: RngCore + CryptoRng>(
        &self,
        low: &BigUint,
        rng: &mut R,
    ) -> BigUint {
        rng.gen_biguint_range(low, &self.q)
    }

    /// Sample an element of the subgroup different from 1.
    pub fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> BigUint {
        let e = self.random_exponent_from(&BigUint::one(), rng);
        self.exp_g(&e)
    }
}

/// Sample uniformly in `[0, bound)`.
pub(crate) fn random_below<R: RngCore + CryptoRng>(bound: &BigUint, rng: &mut R) -> BigUint {
    rng.gen_biguint_below(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn test_precomputed() -> Result<()> {
        for bits in [1024, 1536, 2048, 3072, 4096] {
            let group = ZpGroup::precomputed(bits)?
                .ok_or_else(|| eyre::eyre!("no {}-bit group", bits))?;
            eyre::ensure!(group.bits() == bits, "wrong modulus size");
            eyre::ensure!(group.contains(group.generator()), "bad generator");
        }
        eyre::ensure!(ZpGroup::precomputed(1000)?.is_none(), "unexpected group");
        Ok(())
    }

    #[test]
    fn test_generate() -> Result<()> {
        let mut rng = thread_rng();
        let group = ZpGroup::generate(64, &mut rng)?;
        eyre::ensure!(group.bits() == 64, "wrong modulus size");
        // the generated modulus passes the validation
        let checked = ZpGroup::from_safe_prime(group.modulus().clone())?;
        eyre::ensure!(checked == group, "inconsistent group");
        eyre::ensure!(group.contains(group.generator()), "bad generator");
        Ok(())
    }

    #[test]
    fn test_too_small() {
        let err = ZpGroup::generate(8, &mut thread_rng()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ParameterGeneration(_))
        ));
        assert!(ZpGroup::from_safe_prime(BigUint::from(1_000_003u32 * 2 + 1)).is_err());
    }

    #[test]
    fn test_exp() -> Result<()> {
        let mut rng = thread_rng();
        let group = ZpGroup::generate(64, &mut rng)?;
        let a = group.random_element(&mut rng);
        // a^-1 . a = 1
        eyre::ensure!(group.mul(&a, &group.inv(&a)).is_one(), "wrong inverse");
        // a^(-3) = (a^3)^-1
        let a3 = group.exp(&a, &BigUint::from(3u32));
        eyre::ensure!(
            group.exp_signed(&a, &BigInt::from(-3)) == group.inv(&a3),
            "wrong signed exponentiation"
        );
        // a^q = 1
        eyre::ensure!(group.contains(&a), "element not in the subgroup");
        Ok(())
    }
}
