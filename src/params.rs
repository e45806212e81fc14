use crate::{dlp, error::Error, group::ZpGroup};
use eyre::Result;
use num_bigint_dig::{BigInt, BigUint, Sign};
use num_traits::Zero;
use rand_core::{CryptoRng, OsRng, RngCore};
use std::{fmt, str::FromStr};
use tracing::instrument;

/// Inner-product functional encryption flavors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// DDH based scheme, selectively secure (s-IND-CPA)
    SingleInputSelective,
    /// Damgård based scheme, adaptively secure (IND-CPA)
    SingleInputFullySecure,
    /// several encryptors blinded by one-time pads, one trusted authority
    MultiClient,
    /// several clients, no trusted authority
    DecentralizedMultiClient,
}

impl Scheme {
    pub const ALL: [Scheme; 4] = [
        Scheme::SingleInputSelective,
        Scheme::SingleInputFullySecure,
        Scheme::MultiClient,
        Scheme::DecentralizedMultiClient,
    ];

    /// Number of products summed in the inner product.
    /// - `l`:       vector length per client
    /// - `clients`: number of clients
    pub fn terms(&self, l: usize, clients: usize) -> usize {
        match self {
            Scheme::SingleInputSelective | Scheme::SingleInputFullySecure => l,
            Scheme::MultiClient => clients * l,
            // one coordinate per client
            Scheme::DecentralizedMultiClient => clients,
        }
    }

    /// Bound on the inner product magnitude used by the discrete logarithm
    /// search: `terms.B²`.
    pub fn inner_product_bound(&self, l: usize, clients: usize, bound: &BigUint) -> BigUint {
        bound * bound * BigUint::from(self.terms(l, clients) as u64)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scheme::SingleInputSelective => "selective",
            Scheme::SingleInputFullySecure => "fully-secure",
            Scheme::MultiClient => "multi-client",
            Scheme::DecentralizedMultiClient => "decentralized",
        };
        f.write_str(s)
    }
}

impl FromStr for Scheme {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "selective" | "s-ind-cpa" => Ok(Scheme::SingleInputSelective),
            "2" | "fully-secure" | "ind-cpa" => Ok(Scheme::SingleInputFullySecure),
            "3" | "multi-client" => Ok(Scheme::MultiClient),
            "4" | "decentralized" => Ok(Scheme::DecentralizedMultiClient),
            other => eyre::bail!("Unknown scheme: {}", other),
        }
    }
}

/// Public Parameters of the DDH based schemes (single-input and multi-client).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    /// l: length of the vectors (per client)
    pub l: usize,
    /// n: number of clients, 1 for the single-input schemes
    pub clients: usize,
    /// B: coordinates bound i.e. |xᵢ| < B and |yᵢ| < B
    pub bound: BigUint,
    /// order-q subgroup of Z_p*
    pub group: ZpGroup,
    /// n.l.B²: inner product bound for the discrete logarithm
    pub(crate) dlog_bound: u64,
}

impl Parameters {
    /// Parameters of a single-input scheme, using a precomputed group when
    /// one of `bits` bits exists.
    pub fn generate(l: usize, bits: usize, bound: impl Into<BigUint>) -> Result<Self> {
        Self::generate_with_rng(1, l, bits, bound, &mut OsRng)
    }

    /// Parameters of the multi-client scheme for `clients` encryptors.
    pub fn generate_multi(
        clients: usize,
        l: usize,
        bits: usize,
        bound: impl Into<BigUint>,
    ) -> Result<Self> {
        Self::generate_with_rng(clients, l, bits, bound, &mut OsRng)
    }

    #[instrument(level = "debug", skip(bound, rng))]
    pub fn generate_with_rng<R: RngCore + CryptoRng>(
        clients: usize,
        l: usize,
        bits: usize,
        bound: impl Into<BigUint>,
        rng: &mut R,
    ) -> Result<Self> {
        let bound = bound.into();
        check_sizes(clients, l, &bound)?;
        let group = ZpGroup::for_bit_length(bits, rng)?;
        Self::instantiate(clients, l, bound, group)
    }

    /// Build the parameters over an existing group.
    pub fn instantiate(clients: usize, l: usize, bound: BigUint, group: ZpGroup) -> Result<Self> {
        check_sizes(clients, l, &bound)?;
        let scheme = if clients == 1 {
            Scheme::SingleInputSelective
        } else {
            Scheme::MultiClient
        };
        let ip_bound = scheme.inner_product_bound(l, clients, &bound);
        if &ip_bound >= group.order() {
            return Err(eyre::Report::new(Error::InvalidParameters(format!(
                "the inner product bound {} does not fit in a {}-bit group",
                ip_bound,
                group.bits()
            ))));
        }
        let dlog_bound = dlp::bound_to_u64(&ip_bound)
            .map_err(|err| eyre::Report::new(Error::InvalidParameters(err.to_string())))?;
        Ok(Parameters {
            l,
            clients,
            bound,
            group,
            dlog_bound,
        })
    }

    /// Coordinates bound as a signed integer.
    pub(crate) fn signed_bound(&self) -> BigInt {
        BigInt::from_biguint(Sign::Plus, self.bound.clone())
    }

    /// Bound used by the discrete logarithm search.
    pub fn dlog_bound(&self) -> u64 {
        self.dlog_bound
    }
}

pub(crate) fn check_sizes(clients: usize, l: usize, bound: &BigUint) -> Result<()> {
    let invalid = |msg: &str| -> Result<()> {
        Err(eyre::Report::new(Error::InvalidParameters(msg.to_string())))
    };
    if clients == 0 {
        return invalid("there should be at least one client");
    }
    if l == 0 {
        return invalid("the vectors should have at least one element");
    }
    if bound.is_zero() {
        return invalid("the coordinates bound should be positive");
    }
    Ok(())
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ n: {}, l: {}, B: {}, p: {} bits, dlog bound: {} }}",
            self.clients,
            self.l,
            self.bound,
            self.group.bits(),
            self.dlog_bound
        )
    }
}
