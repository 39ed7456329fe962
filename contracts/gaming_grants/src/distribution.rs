use soroban_sdk::{Env, Vec};

use crate::{Error, Game};

/// Computes every game's payout from a grant's distributable pool.
///
/// Shares are pledge-weighted: `pool * funding / total_funding`, floor
/// division. A vote's weight is the value attached to it, so a game with a
/// strictly larger share of the pledged value gets a strictly larger share
/// of the pool (before rounding), games tied on pledged value split equally,
/// and a game with no pledges gets zero.
///
/// Floor division can lose up to `games.len() - 1` units; that dust is added
/// to the top-funded game (first in submission order among ties) so the
/// payouts always sum to exactly `pool` and rounding can never hand a
/// lower-weighted game more than a higher-weighted one. If nothing was
/// pledged at all every payout is zero and the caller decides what happens
/// to the pool.
pub(crate) fn compute_payouts(
    env: &Env,
    games: &Vec<Game>,
    pool: i128,
) -> Result<Vec<i128>, Error> {
    let mut total_funding: i128 = 0;
    for game in games.iter() {
        total_funding = total_funding
            .checked_add(game.funding)
            .ok_or(Error::MathOverflow)?;
    }

    let mut payouts = Vec::new(env);
    if total_funding == 0 {
        for _ in 0..games.len() {
            payouts.push_back(0_i128);
        }
        return Ok(payouts);
    }

    let mut distributed: i128 = 0;
    let mut top_funded: u32 = 0;
    let mut top_funding: i128 = 0;
    for i in 0..games.len() {
        let game = games.get(i).unwrap();
        let share = pool
            .checked_mul(game.funding)
            .ok_or(Error::MathOverflow)?
            .checked_div(total_funding)
            .ok_or(Error::MathOverflow)?;
        distributed = distributed.checked_add(share).ok_or(Error::MathOverflow)?;
        if game.funding > top_funding {
            top_funding = game.funding;
            top_funded = i;
        }
        payouts.push_back(share);
    }

    let dust = pool.checked_sub(distributed).ok_or(Error::MathOverflow)?;
    if dust > 0 {
        let topped_up = payouts
            .get(top_funded)
            .unwrap()
            .checked_add(dust)
            .ok_or(Error::MathOverflow)?;
        payouts.set(top_funded, topped_up);
    }

    Ok(payouts)
}
