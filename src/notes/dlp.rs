//! # Discrete Logarithm Problem
//!
//! In a cyclic group `G` with generator `g`, given an element `h` in this group, the Discrete Logarithm Problem (DLP) consists in finding the integer `x` such that:
//!
//! ``` text
//! h = g~g~g~...~g
//!     |_________|
//!       x times
//! ```
//!
//! where `~` is the group law. Using the multiplicative notation of `Z_p*`, this is written `h = g^x`; the target group `Gt` of a pairing is handled the same way.
//!
//! The DLP is hard in general. The inner-product schemes only need to solve it when `x` is known to lie in a small interval `[0, M)`, since `x` is an inner product of bounded vectors.
//!
//! ## Baby Step Giant Step
//!
//! Let `m = ⌈√M⌉`. Then `x` can be rewritten `x = k.m + j`, with `0 <= k < ⌈M/m⌉` and `0 <= j < m`.
//! ``` text
//! g^x = h
//! g^(k.m) . g^j = h
//! g^j = h . (g^-m)^k
//! ```
//!
//! The algorithm consists in:
//!
//! ``` text
//! for j in range(0,m):
//!     store (H(g^j), j)
//!
//! a <- g^-m
//!
//! for k in range(0,⌈M/m⌉):
//!     w <- h . a^k
//!     if H(w) matches a stored (H(v), j) pair:
//!         return k.m + j
//! fail
//! ```
//!
//! When using a hashed map to store the `(H(v), j)` pairs, the lookup is made in `O(1)`. Therefore:
//! - time complexity: `O(√M)`
//! - space complexity: `O(√M)`
//!
//! ## Signed values
//!
//! When `x ∈ (-M, M)`, the search is run on `h . g^(M-1)`, whose logarithm lies in `[0, 2M - 1)`, and the shift is subtracted from the result.
//!
//! ## Bounds used by the schemes
//!
//! With coordinates bounded by `B` in absolute value, an inner product of `t` terms is bounded by `t.B²`:
//! - single-input schemes: `t = l`;
//! - multi-client scheme: `t = n.l` (`n` clients with `l` coordinates each);
//! - decentralized scheme: `t = n` (`n` clients with one coordinate each).
