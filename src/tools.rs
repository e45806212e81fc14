use bls12_381::{
    hash_to_curve::{ExpandMsgXmd, HashToCurve},
    G1Affine, G1Projective, G2Projective, Gt, Scalar,
};
use eyre::Result;
use num_bigint_dig::{BigInt, BigUint, Sign};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256, Sha512};

const DST_G1: &[u8] = b"IPFE_DMCFE_G1_XMD:SHA-256_SSWU_RO_";
const DST_G2: &[u8] = b"IPFE_DMCFE_G2_XMD:SHA-256_SSWU_RO_";

/// Order of the BLS12-381 scalar field, big-endian hexadecimal.
const SCALAR_MODULUS: &[u8] = b"73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001";

/// Draw a uniformly random scalar.
#[inline]
pub(crate) fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    let mut bytes = [0; 64];
    rng.fill_bytes(&mut bytes);
    Scalar::from_bytes_wide(&bytes)
}

/// Hide a given scalar in G1 based on the CDH assumption.
/// - `a`: scalar
#[inline]
pub(crate) fn smul_in_g1(a: &Scalar) -> G1Projective {
    G1Projective::generator() * a
}

/// Hide a given scalar in G2 based on the CDH assumption.
/// - `a`: scalar
#[inline]
pub(crate) fn smul_in_g2(a: &Scalar) -> G2Projective {
    G2Projective::generator() * a
}

/// Returns the hash of the given bytestring in `G1`
/// - `m`: bytestring
pub(crate) fn hash_to_g1(m: &[u8]) -> G1Projective {
    <G1Projective as HashToCurve<ExpandMsgXmd<Sha256>>>::hash_to_curve(m, DST_G1)
}

/// Returns the hash of the given bytestring in `G2`
/// - `m`: bytestring
pub(crate) fn hash_to_g2(m: &[u8]) -> G2Projective {
    <G2Projective as HashToCurve<ExpandMsgXmd<Sha256>>>::hash_to_curve(m, DST_G2)
}

/// Compressed encoding of a `G1` point.
#[inline]
pub(crate) fn g1_bytes(p: &G1Projective) -> [u8; 48] {
    G1Affine::from(p).to_compressed()
}

/// Return the hash of a Diffie-Hellman exchange as a Scalar.
/// - `pk_lo`  : public key of the client with the lowest index
/// - `pk_hi`  : public key of the client with the highest index
/// - `shared` : shared `G1` point
/// - `entry`  : index of the derived value
pub(crate) fn hash_to_scalar(
    pk_lo: &G1Projective,
    pk_hi: &G1Projective,
    shared: &G1Projective,
    entry: usize,
) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(g1_bytes(pk_lo));
    hasher.update(g1_bytes(pk_hi));
    hasher.update(g1_bytes(shared));
    hasher.update((entry as u64).to_be_bytes());
    // get the hash as a 64-bytes string
    let mut m = [0; 64];
    m.copy_from_slice(&hasher.finalize());
    Scalar::from_bytes_wide(&m)
}

/// Hash of a `Gt` element, used as lookup key by the discrete log solver.
///
/// `Gt` exposes no byte encoding; its `Debug` form prints the canonical
/// coordinates of the underlying `Fp12` element.
pub(crate) fn gt_digest(p: &Gt) -> [u8; 32] {
    Sha256::digest(format!("{:?}", p).as_bytes()).into()
}

/// Order of the BLS12-381 scalar field.
pub(crate) fn scalar_modulus() -> Result<BigUint> {
    BigUint::parse_bytes(SCALAR_MODULUS, 16)
        .ok_or_else(|| eyre::eyre!("Cannot parse the scalar field modulus!"))
}

/// Map a signed integer to its class modulo the scalar field order.
pub(crate) fn bigint_to_scalar(x: &BigInt) -> Result<Scalar> {
    let r = scalar_modulus()?;
    let magnitude = match x.to_biguint() {
        Some(v) => v,
        None => (-x)
            .to_biguint()
            .ok_or_else(|| eyre::eyre!("Cannot take the magnitude of {}!", x))?,
    } % &r;
    let mut le = magnitude.to_bytes_le();
    le.resize(32, 0);
    let mut bytes = [0; 32];
    bytes.copy_from_slice(&le);
    let s: Option<Scalar> = Scalar::from_bytes(&bytes).into();
    let s = s.ok_or_else(|| eyre::eyre!("Non canonical scalar encoding for {}!", x))?;
    Ok(if x.sign() == Sign::Minus { -s } else { s })
}
