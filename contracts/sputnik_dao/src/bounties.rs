//! Bounty manager: bounties, claims and their bonds

use soroban_sdk::{Address, Env, String, Vec};

use crate::error::DaoError;
use crate::events;
use crate::proposals;
use crate::storage;
use crate::types::{Bounty, BountyClaim, ProposalInput, ProposalKind};

/// Stores a new bounty and returns its id
pub fn add_bounty(env: &Env, bounty: &Bounty) -> u64 {
    let id = storage::get_last_bounty_id(env);
    storage::set_bounty(env, id, bounty);
    storage::set_last_bounty_id(env, id + 1);
    events::emit_bounty_added(env, id, bounty.amount, bounty.times);
    id
}

/// Claims bounty `id` for `claimant`, who pays the bounty bond.
///
/// # Errors
/// * `NoBounty` - Bounty does not exist
/// * `BountyWrongBond` - `bond` is not exactly the bounty bond
/// * `BountyAllClaimed` - Every remaining completion is already claimed
/// * `BountyWrongDeadline` - `deadline` exceeds the bounty's max deadline
pub fn claim(env: &Env, claimant: &Address, id: u64, deadline: u64, bond: i128) -> Result<(), DaoError> {
    let bounty = storage::get_bounty(env, id).ok_or(DaoError::NoBounty)?;
    let policy = storage::get_policy(env)?;
    if bond != policy.bounty_bond {
        return Err(DaoError::BountyWrongBond);
    }
    let claims_count = storage::get_bounty_claims_count(env, id);
    if claims_count >= bounty.times {
        return Err(DaoError::BountyAllClaimed);
    }
    if deadline > bounty.max_deadline {
        return Err(DaoError::BountyWrongDeadline);
    }

    proposals::receive_bond(env, claimant, bond)?;
    storage::set_bounty_claims_count(env, id, claims_count + 1);
    let mut claims = storage::get_bounty_claims(env, claimant);
    claims.push_back(BountyClaim {
        bounty_id: id,
        claimant: claimant.clone(),
        start_time: env.ledger().timestamp(),
        deadline,
        completed: false,
        bond,
    });
    storage::set_bounty_claims(env, claimant, &claims);

    events::emit_bounty_claimed(env, id, claimant, deadline);
    Ok(())
}

/// Reports the first open claim of `claimant` on bounty `id` as done.
///
/// A claim past its deadline is released and `None` is returned; anyone may
/// do that. Otherwise only the claimant may report, a `BountyDone` proposal
/// is added on their behalf and its id is returned.
///
/// # Errors
/// * `NoBountyClaims` - Claimant holds no claims
/// * `NoBountyClaim` - Claimant holds no claim on this bounty
/// * `BountyClaimCompleted` - Every claim on this bounty was already reported
/// * `BountyDoneMustBeSelf` - Caller is not the claimant of a running claim
pub fn done(
    env: &Env,
    caller: &Address,
    id: u64,
    claimant: &Address,
    description: String,
    bond: i128,
) -> Result<Option<u64>, DaoError> {
    let mut claims = storage::get_bounty_claims(env, claimant);
    let index = find_open_claim(&claims, id)?;
    let mut claim = claims.get(index).ok_or(DaoError::NoBountyClaim)?;

    let now = env.ledger().timestamp();
    if now > claim.start_time.saturating_add(claim.deadline) {
        remove_claim(env, claimant, &mut claims, index);
        events::emit_bounty_done(env, id, claimant, None);
        return Ok(None);
    }
    if caller != claimant {
        return Err(DaoError::BountyDoneMustBeSelf);
    }

    let input = ProposalInput {
        description,
        kind: ProposalKind::BountyDone(id, claimant.clone()),
    };
    let proposal_id = proposals::submit(env, caller, input, bond, true)?;

    claim.completed = true;
    claims.set(index, claim);
    storage::set_bounty_claims(env, claimant, &claims);

    events::emit_bounty_done(env, id, claimant, Some(proposal_id));
    Ok(Some(proposal_id))
}

/// Gives up the first open claim of `claimant` on bounty `id`.
///
/// The bond paid with the claim is returned when giving up within the
/// forgiveness period. Returns whether the bond was returned.
pub fn giveup(env: &Env, claimant: &Address, id: u64) -> Result<bool, DaoError> {
    let policy = storage::get_policy(env)?;
    let mut claims = storage::get_bounty_claims(env, claimant);
    let index = find_open_claim(&claims, id)?;
    let claim = claims.get(index).ok_or(DaoError::NoBountyClaim)?;

    let elapsed = env.ledger().timestamp().saturating_sub(claim.start_time);
    let refunded = elapsed <= policy.bounty_forgiveness_period;
    if refunded {
        proposals::return_bond(env, claimant, claim.bond)?;
    }
    remove_claim(env, claimant, &mut claims, index);

    events::emit_bounty_giveup(env, id, claimant, refunded);
    Ok(refunded)
}

/// Releases the completed claim of `claimant` on bounty `id` and returns it.
///
/// Open claims on the same bounty are left alone.
pub fn release_claim(env: &Env, claimant: &Address, id: u64) -> Option<BountyClaim> {
    let mut claims = storage::get_bounty_claims(env, claimant);
    let index = claims
        .iter()
        .position(|claim| claim.bounty_id == id && claim.completed)? as u32;
    let claim = claims.get(index)?;
    remove_claim(env, claimant, &mut claims, index);
    Some(claim)
}

/// Bookkeeping after a successful bounty payout to `claimant`: releases the
/// reported claim with a refund of its bond and uses up one completion
pub fn complete(env: &Env, id: u64, claimant: &Address) -> Result<(), DaoError> {
    if let Some(claim) = release_claim(env, claimant, id) {
        proposals::return_bond(env, claimant, claim.bond)?;
    }
    if let Some(mut bounty) = storage::get_bounty(env, id) {
        if bounty.times == 0 {
            storage::remove_bounty(env, id);
        } else {
            bounty.times -= 1;
            storage::set_bounty(env, id, &bounty);
        }
    }
    Ok(())
}

/// Index of the first claim on bounty `id` that was not reported yet
fn find_open_claim(claims: &Vec<BountyClaim>, id: u64) -> Result<u32, DaoError> {
    if claims.is_empty() {
        return Err(DaoError::NoBountyClaims);
    }
    let mut claimed = false;
    for (index, claim) in claims.iter().enumerate() {
        if claim.bounty_id != id {
            continue;
        }
        if !claim.completed {
            return Ok(index as u32);
        }
        claimed = true;
    }
    if claimed {
        Err(DaoError::BountyClaimCompleted)
    } else {
        Err(DaoError::NoBountyClaim)
    }
}

fn remove_claim(env: &Env, claimant: &Address, claims: &mut Vec<BountyClaim>, index: u32) {
    if let Some(claim) = claims.get(index) {
        let count = storage::get_bounty_claims_count(env, claim.bounty_id);
        storage::set_bounty_claims_count(env, claim.bounty_id, count.saturating_sub(1));
    }
    claims.remove(index);
    storage::set_bounty_claims(env, claimant, claims);
}
