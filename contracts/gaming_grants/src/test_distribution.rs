#![cfg(test)]

use super::distribution::compute_payouts;
use super::{Game, Genre};
use soroban_sdk::{testutils::Address as _, Address, Env, String, Vec};

fn game(env: &Env, vote_count: u64, funding: i128) -> Game {
    Game {
        name: String::from_str(env, "game"),
        details: String::from_str(env, ""),
        developer: Address::generate(env),
        vote_count,
        funding,
        game_uri: String::from_str(env, "ipfs://build"),
        image_uri: String::from_str(env, "ipfs://image"),
        video_uri: String::from_str(env, "ipfs://video"),
        genre: Genre::Action,
        grant_id: 1,
    }
}

fn games(env: &Env, tallies: &[(u64, i128)]) -> Vec<Game> {
    let mut out = Vec::new(env);
    for (vote_count, funding) in tallies {
        out.push_back(game(env, *vote_count, *funding));
    }
    out
}

fn sum(payouts: &Vec<i128>) -> i128 {
    let mut total = 0;
    for p in payouts.iter() {
        total += p;
    }
    total
}

#[test]
fn test_split_is_proportional_to_pledges() {
    let env = Env::default();
    let payouts = compute_payouts(&env, &games(&env, &[(1, 60), (1, 40)]), 100).unwrap();
    assert_eq!(payouts.get(0).unwrap(), 60);
    assert_eq!(payouts.get(1).unwrap(), 40);
}

#[test]
fn test_zero_pledged_game_gets_zero() {
    let env = Env::default();
    let payouts = compute_payouts(&env, &games(&env, &[(0, 0), (2, 10)]), 100).unwrap();
    assert_eq!(payouts.get(0).unwrap(), 0);
    assert_eq!(payouts.get(1).unwrap(), 100);
}

#[test]
fn test_no_pledges_means_no_payouts() {
    let env = Env::default();
    let payouts = compute_payouts(&env, &games(&env, &[(0, 0), (0, 0)]), 100).unwrap();
    assert_eq!(payouts.get(0).unwrap(), 0);
    assert_eq!(payouts.get(1).unwrap(), 0);

    let empty = compute_payouts(&env, &Vec::new(&env), 100).unwrap();
    assert_eq!(empty.len(), 0);
}

#[test]
fn test_rounding_dust_goes_to_top_funded_game() {
    let env = Env::default();

    // Even three-way split of 100: dust lands on the first game, which is
    // the top-funded among ties.
    let payouts = compute_payouts(&env, &games(&env, &[(1, 1), (1, 1), (1, 1)]), 100).unwrap();
    assert_eq!(payouts.get(0).unwrap(), 34);
    assert_eq!(payouts.get(1).unwrap(), 33);
    assert_eq!(payouts.get(2).unwrap(), 33);
    assert_eq!(sum(&payouts), 100);

    // Dust must not let a smaller pledge overtake a larger one, even when
    // the pool is smaller than the pledged total.
    let payouts = compute_payouts(&env, &games(&env, &[(2, 2), (1, 1)]), 1).unwrap();
    assert_eq!(payouts.get(0).unwrap(), 1);
    assert_eq!(payouts.get(1).unwrap(), 0);
}

#[test]
fn test_ties_on_pledges_split_equally() {
    let env = Env::default();
    let payouts = compute_payouts(&env, &games(&env, &[(3, 25), (1, 25)]), 50).unwrap();
    assert_eq!(payouts.get(0).unwrap(), 25);
    assert_eq!(payouts.get(1).unwrap(), 25);
}

#[test]
fn test_payouts_always_sum_to_pool() {
    let env = Env::default();
    let cases: &[(&[(u64, i128)], i128)] = &[
        (&[(1, 7)], 100),
        (&[(1, 7), (1, 13)], 99),
        (&[(5, 3), (2, 3), (9, 3)], 1_000),
        (&[(1, 1), (0, 0), (4, 999)], 12_345),
    ];
    for (tallies, pool) in cases {
        let payouts = compute_payouts(&env, &games(&env, tallies), *pool).unwrap();
        assert_eq!(sum(&payouts), *pool);
    }
}

/// Tiny deterministic generator so the property runs without a rand
/// dependency in a no_std crate.
fn lcg(seed: &mut u64) -> u64 {
    *seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *seed >> 33
}

#[test]
fn test_more_votes_never_means_smaller_share() {
    let env = Env::default();
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;

    for _ in 0..64 {
        let n = 2 + (lcg(&mut seed) % 4) as u32;
        let pool = 1 + (lcg(&mut seed) % 10_000) as i128;

        // Unit-value pledges: each vote carries 1 token, so the vote count
        // and the pledged weight coincide.
        let mut tallies = Vec::new(&env);
        for _ in 0..n {
            let votes = lcg(&mut seed) % 40;
            tallies.push_back(game(&env, votes, votes as i128));
        }

        let payouts = compute_payouts(&env, &tallies, pool).unwrap();

        let mut any_votes = false;
        for i in 0..n {
            if tallies.get(i).unwrap().vote_count > 0 {
                any_votes = true;
            }
        }
        if any_votes {
            assert_eq!(sum(&payouts), pool);
        } else {
            assert_eq!(sum(&payouts), 0);
        }

        for i in 0..n {
            for j in 0..n {
                let (a, b) = (tallies.get(i).unwrap(), tallies.get(j).unwrap());
                if a.vote_count > b.vote_count {
                    assert!(
                        payouts.get(i).unwrap() >= payouts.get(j).unwrap(),
                        "a game with strictly more votes received a smaller share"
                    );
                }
                if a.vote_count == 0 {
                    assert_eq!(payouts.get(i).unwrap(), 0);
                }
            }
        }
    }
}

#[test]
fn test_randomized_mixed_amounts_stay_weight_monotone() {
    let env = Env::default();
    let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;

    for _ in 0..64 {
        let n = 2 + (lcg(&mut seed) % 4) as u32;
        let pool = 1 + (lcg(&mut seed) % 100_000) as i128;

        let mut tallies = Vec::new(&env);
        for _ in 0..n {
            let votes = lcg(&mut seed) % 5;
            let funding = if votes == 0 {
                0
            } else {
                votes as i128 * (1 + (lcg(&mut seed) % 500) as i128)
            };
            tallies.push_back(game(&env, votes, funding));
        }

        let payouts = compute_payouts(&env, &tallies, pool).unwrap();

        for i in 0..n {
            for j in 0..n {
                let (a, b) = (tallies.get(i).unwrap(), tallies.get(j).unwrap());
                if a.funding > b.funding {
                    assert!(payouts.get(i).unwrap() >= payouts.get(j).unwrap());
                }
            }
        }
    }
}
