//! # Discrete Logarithm
//!
//! The baby-step giant-step solver is shared by all the schemes: it runs in
//! the `Z_p*` subgroup for the DDH schemes and in `Gt` for the decentralized
//! one.

use eyre::Result;
use ipfe_suite::{
    dlp::{bsgs, DlogGroup, GtGroup},
    group::ZpGroup,
    Error,
};
use num_bigint_dig::BigUint;
use rand::Rng;

#[test]
fn test_bsgs_precomputed_group() -> Result<()> {
    let group = ZpGroup::precomputed(2048)?
        .ok_or_else(|| eyre::eyre!("No precomputed 2048-bit group!"))?;
    // Do not use a big number, it will take useless time
    const M: u64 = 10u64.pow(6);
    let x: u64 = rand::thread_rng().gen_range(0..M);
    let h = group.exp_g(&BigUint::from(x));
    eyre::ensure!(bsgs::solve(&group, &h, M)? == x, "Wrong DLP solution!");
    Ok(())
}

#[test]
fn test_bsgs_bound() -> Result<()> {
    let group = GtGroup::new();
    const M: u64 = 400;
    for (x, found) in [(0, true), (M - 1, true), (M, false), (M + 1, false)] {
        let h = group.pow(&group.generator(), x);
        match bsgs::solve(&group, &h, M) {
            Ok(res) => eyre::ensure!(found && res == x, "Wrong DLP solution for {}!", x),
            Err(err) => eyre::ensure!(
                !found && matches!(err.downcast_ref::<Error>(), Some(Error::DlogOutOfBound { .. })),
                "Unexpected error for {}: {}",
                x,
                err
            ),
        }
    }
    Ok(())
}

#[test]
fn test_bsgs_signed_bound() -> Result<()> {
    let group = ZpGroup::precomputed(1024)?
        .ok_or_else(|| eyre::eyre!("No precomputed 1024-bit group!"))?;
    const M: u64 = 1000;
    let g = DlogGroup::generator(&group);
    for x in [-(M as i64 - 1), M as i64 - 1] {
        let h = group.exp_signed(&g, &x.into());
        eyre::ensure!(
            bsgs::solve_signed(&group, &h, M)? == x as i128,
            "Wrong DLP solution for {}!",
            x
        );
    }
    for x in [-(M as i64), M as i64] {
        let h = group.exp_signed(&g, &x.into());
        eyre::ensure!(
            bsgs::solve_signed(&group, &h, M).is_err(),
            "{} is out of the bound but was found",
            x
        );
    }
    Ok(())
}
