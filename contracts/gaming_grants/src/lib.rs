#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env,
    String, Vec,
};

mod distribution;

#[contract]
pub struct GamingGrants;

/// The six genres a submission may declare. Any other value is rejected at
/// the call boundary by the type itself rather than stored as an unchecked
/// integer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[contracttype]
pub enum Genre {
    Action,
    Adventure,
    Rpg,
    Strategy,
    Sports,
    Puzzle,
}

/// A funding round. `total_amount` is fixed at creation and is exactly the
/// pool the distribution engine splits when the round is finalized.
#[derive(Clone, PartialEq, Eq, Debug)]
#[contracttype]
pub struct Grant {
    pub name: String,
    pub total_amount: i128,
    pub start_time: u64,
    pub duration: u64,
    pub finalized: bool,
    /// Game ids submitted to this grant, in submission order. Append-only.
    pub games: Vec<u64>,
    pub total_votes: u64,
    pub creator: Address,
    pub grant_uri: String,
}

/// A submission competing for a grant's pool.
#[derive(Clone, PartialEq, Eq, Debug)]
#[contracttype]
pub struct Game {
    pub name: String,
    pub details: String,
    pub developer: Address,
    pub vote_count: u64,
    /// Sum of pledge values directed at this game.
    pub funding: i128,
    pub game_uri: String,
    pub image_uri: String,
    pub video_uri: String,
    pub genre: Genre,
    pub grant_id: u64,
}

#[derive(Clone)]
#[contracttype]
enum DataKey {
    /// Token used for pools and pledges; payouts are measured in this token.
    Token,
    GrantCount,
    GameCount,
    Grant(u64),
    Game(u64),
    /// Marks that a developer already has a submission under a grant.
    Submitted(u64, Address),
}

#[contracterror]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Unknown/zero id, malformed creation args, cross-grant id mismatch in a
    /// vote, or finalization of an already-finalized grant.
    InvalidGrant = 3,
    GameAlreadySubmitted = 4,
    /// Write attempted after the voting window elapsed.
    GrantDurationOver = 5,
    /// Write attempted against a finalized grant, or finalize before expiry.
    VotingNotOpen = 6,
    NotEnoughFunds = 7,
    NotGrantCreator = 8,
    MathOverflow = 9,
}

fn read_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

fn read_grant(env: &Env, grant_id: u64) -> Result<Grant, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Grant(grant_id))
        .ok_or(Error::InvalidGrant)
}

fn write_grant(env: &Env, grant_id: u64, grant: &Grant) {
    env.storage().instance().set(&DataKey::Grant(grant_id), grant);
}

fn read_game(env: &Env, game_id: u64) -> Result<Game, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Game(game_id))
        .ok_or(Error::InvalidGrant)
}

fn write_game(env: &Env, game_id: u64, game: &Game) {
    env.storage().instance().set(&DataKey::Game(game_id), game);
}

fn read_grant_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::GrantCount)
        .unwrap_or(0)
}

fn read_game_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::GameCount)
        .unwrap_or(0)
}

/// A grant accepts submissions and votes only while it is not finalized and
/// `now < start_time + duration`. The two rejection kinds are distinct so a
/// client can tell "round closed by finalization" from "window elapsed".
fn require_voting_open(env: &Env, grant: &Grant) -> Result<(), Error> {
    if grant.finalized {
        return Err(Error::VotingNotOpen);
    }
    let closes_at = grant
        .start_time
        .checked_add(grant.duration)
        .ok_or(Error::MathOverflow)?;
    if env.ledger().timestamp() >= closes_at {
        return Err(Error::GrantDurationOver);
    }
    Ok(())
}

#[contractimpl]
impl GamingGrants {
    /// Records the token that pools and pledges are denominated in.
    pub fn initialize(env: Env, token: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Token) {
            return Err(Error::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Token, &token);
        Ok(())
    }

    /// Opens a funding round. The creator funds the pool up front: exactly
    /// `total_amount` is transferred from `creator` into the contract.
    /// Ids are sequential and 1-based.
    pub fn create_grant(
        env: Env,
        creator: Address,
        name: String,
        total_amount: i128,
        duration: u64,
        grant_uri: String,
    ) -> Result<u64, Error> {
        creator.require_auth();

        if total_amount <= 0 || duration == 0 {
            return Err(Error::InvalidGrant);
        }

        let token_addr = read_token(&env)?;
        token::Client::new(&env, &token_addr).transfer(
            &creator,
            &env.current_contract_address(),
            &total_amount,
        );

        let grant_id = read_grant_count(&env) + 1;
        env.storage().instance().set(&DataKey::GrantCount, &grant_id);

        let now = env.ledger().timestamp();
        let grant = Grant {
            name: name.clone(),
            total_amount,
            start_time: now,
            duration,
            finalized: false,
            games: Vec::new(&env),
            total_votes: 0,
            creator,
            grant_uri: grant_uri.clone(),
        };
        write_grant(&env, grant_id, &grant);

        env.events().publish(
            (symbol_short!("created"), grant_id),
            (name, total_amount, now, duration, grant_uri),
        );

        Ok(grant_id)
    }

    /// Enters a game into an open round. A developer gets one submission per
    /// grant; a second attempt fails outright.
    pub fn submit_game(
        env: Env,
        developer: Address,
        grant_id: u64,
        name: String,
        details: String,
        game_uri: String,
        image_uri: String,
        video_uri: String,
        genre: Genre,
    ) -> Result<u64, Error> {
        developer.require_auth();

        let mut grant = read_grant(&env, grant_id)?;
        require_voting_open(&env, &grant)?;

        let submitted_key = DataKey::Submitted(grant_id, developer.clone());
        if env.storage().instance().has(&submitted_key) {
            return Err(Error::GameAlreadySubmitted);
        }

        let game_id = read_game_count(&env) + 1;
        env.storage().instance().set(&DataKey::GameCount, &game_id);

        let game = Game {
            name,
            details,
            developer: developer.clone(),
            vote_count: 0,
            funding: 0,
            game_uri: game_uri.clone(),
            image_uri: image_uri.clone(),
            video_uri: video_uri.clone(),
            genre,
            grant_id,
        };
        write_game(&env, game_id, &game);
        env.storage().instance().set(&submitted_key, &true);

        grant.games.push_back(game_id);
        write_grant(&env, grant_id, &grant);

        env.events().publish(
            (symbol_short!("submitted"), grant_id, game_id, developer),
            (game_uri, image_uri, video_uri, genre),
        );

        Ok(game_id)
    }

    /// Pledges `amount` of the pool token to a game. One call is one vote,
    /// whatever the amount; the amount is the vote's weight at settlement.
    /// The pledge is transferred into the contract and is irrevocable.
    pub fn vote(
        env: Env,
        voter: Address,
        game_id: u64,
        grant_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        voter.require_auth();

        let mut game = read_game(&env, game_id)?;
        if game.grant_id != grant_id {
            return Err(Error::InvalidGrant);
        }
        let mut grant = read_grant(&env, grant_id)?;
        require_voting_open(&env, &grant)?;

        if amount <= 0 {
            return Err(Error::NotEnoughFunds);
        }

        let token_addr = read_token(&env)?;
        token::Client::new(&env, &token_addr).transfer(
            &voter,
            &env.current_contract_address(),
            &amount,
        );

        game.vote_count = game.vote_count.checked_add(1).ok_or(Error::MathOverflow)?;
        game.funding = game.funding.checked_add(amount).ok_or(Error::MathOverflow)?;
        grant.total_votes = grant
            .total_votes
            .checked_add(1)
            .ok_or(Error::MathOverflow)?;

        write_game(&env, game_id, &game);
        write_grant(&env, grant_id, &grant);

        env.events()
            .publish((symbol_short!("voted"), game_id, voter), amount);

        Ok(())
    }

    /// Closes a round and settles the pool. Creator-only, and only once the
    /// duration has elapsed. Payouts are pledge-weighted shares of the
    /// creation pool (see `distribution`); if nothing was pledged the pool
    /// goes back to the creator. A second call fails with `InvalidGrant`
    /// rather than silently re-running, so double distribution cannot
    /// happen. If any transfer traps, the whole invocation rolls back and
    /// the grant stays open for a retry.
    pub fn finalize_grant(env: Env, caller: Address, grant_id: u64) -> Result<(), Error> {
        caller.require_auth();

        let mut grant = read_grant(&env, grant_id)?;
        if grant.finalized {
            return Err(Error::InvalidGrant);
        }
        if caller != grant.creator {
            return Err(Error::NotGrantCreator);
        }

        let closes_at = grant
            .start_time
            .checked_add(grant.duration)
            .ok_or(Error::MathOverflow)?;
        if env.ledger().timestamp() < closes_at {
            return Err(Error::VotingNotOpen);
        }

        let mut games = Vec::new(&env);
        for i in 0..grant.games.len() {
            games.push_back(read_game(&env, grant.games.get(i).unwrap())?);
        }
        let payouts = distribution::compute_payouts(&env, &games, grant.total_amount)?;

        let token_addr = read_token(&env)?;
        let client = token::Client::new(&env, &token_addr);
        let contract = env.current_contract_address();

        let mut amount_distributed: i128 = 0;
        for i in 0..games.len() {
            let payout = payouts.get(i).unwrap();
            if payout > 0 {
                client.transfer(&contract, &games.get(i).unwrap().developer, &payout);
                amount_distributed = amount_distributed
                    .checked_add(payout)
                    .ok_or(Error::MathOverflow)?;
            }
        }

        if amount_distributed == 0 {
            // No pledges were recorded; return the pool to whoever funded it.
            client.transfer(&contract, &grant.creator, &grant.total_amount);
        }

        grant.finalized = true;
        write_grant(&env, grant_id, &grant);

        env.events().publish(
            (symbol_short!("finalized"), grant_id),
            (grant.total_votes, amount_distributed),
        );

        Ok(())
    }

    pub fn get_grant(env: Env, grant_id: u64) -> Result<Grant, Error> {
        read_grant(&env, grant_id)
    }

    pub fn get_all_grants(env: Env) -> Result<Vec<Grant>, Error> {
        let mut grants = Vec::new(&env);
        for id in 1..=read_grant_count(&env) {
            grants.push_back(read_grant(&env, id)?);
        }
        Ok(grants)
    }

    pub fn get_game(env: Env, game_id: u64) -> Result<Game, Error> {
        read_game(&env, game_id)
    }

    pub fn get_all_games(env: Env) -> Result<Vec<Game>, Error> {
        let mut games = Vec::new(&env);
        for id in 1..=read_game_count(&env) {
            games.push_back(read_game(&env, id)?);
        }
        Ok(games)
    }

    pub fn get_all_games_of_grant(env: Env, grant_id: u64) -> Result<Vec<Game>, Error> {
        let grant = read_grant(&env, grant_id)?;
        let mut games = Vec::new(&env);
        for i in 0..grant.games.len() {
            games.push_back(read_game(&env, grant.games.get(i).unwrap())?);
        }
        Ok(games)
    }

    pub fn get_all_games_by_genre(env: Env, genre: Genre) -> Result<Vec<Game>, Error> {
        let mut games = Vec::new(&env);
        for id in 1..=read_game_count(&env) {
            let game = read_game(&env, id)?;
            if game.genre == genre {
                games.push_back(game);
            }
        }
        Ok(games)
    }

    pub fn get_vote_count(env: Env, game_id: u64) -> Result<u64, Error> {
        Ok(read_game(&env, game_id)?.vote_count)
    }

    pub fn get_total_votes(env: Env, grant_id: u64) -> Result<u64, Error> {
        Ok(read_grant(&env, grant_id)?.total_votes)
    }
}

mod test_distribution;
