//! Proposal engine: submission, actions and the proposal lifecycle
//!
//! Direct kinds change DAO state when approved. External kinds are handed to
//! the executor and their outcome is routed back through [`on_settled`].

use soroban_sdk::{vec, Address, Env, IntoVal, Map, String, Symbol, Val, Vec};

use crate::bounties;
use crate::delegation;
use crate::error::DaoError;
use crate::events;
use crate::executor::{self, OutboundCall, Outcome};
use crate::policy::{Policy, UserInfo};
use crate::storage;
use crate::tally;
use crate::types::{Action, Proposal, ProposalInput, ProposalKind, ProposalStatus};

// ============================================================================
// Bonds
// ============================================================================

fn transfer_base(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), DaoError> {
    if amount <= 0 {
        return Ok(());
    }
    let token = storage::get_base_token(env)?;
    let _result: () = env.invoke_contract(
        &token,
        &Symbol::new(env, "transfer"),
        (from.clone(), to.clone(), amount).into_val(env),
    );
    Ok(())
}

/// Pulls a bond of `amount` base tokens from `from` into the DAO
pub fn receive_bond(env: &Env, from: &Address, amount: i128) -> Result<(), DaoError> {
    transfer_base(env, from, &env.current_contract_address(), amount)
}

/// Pays a bond of `amount` base tokens back to `to`
pub fn return_bond(env: &Env, to: &Address, amount: i128) -> Result<(), DaoError> {
    transfer_base(env, &env.current_contract_address(), to, amount)
}

fn user_info(env: &Env, account: &Address) -> UserInfo {
    UserInfo {
        account: account.clone(),
        amount: delegation::balance_of(env, account),
    }
}

// ============================================================================
// Submission
// ============================================================================

/// Adds a proposal paid with `bond` and returns its id.
///
/// `BountyDone` proposals are only accepted when `from_bounty` is set, which
/// is the case when they come through a bounty report.
///
/// # Errors
/// * `MinBond` - `bond` is lower than the proposal bond
/// * `PermissionDenied` - No role of the proposer may add this kind
/// * Kind specific validation errors, see [`validate_kind`]
pub fn submit(
    env: &Env,
    proposer: &Address,
    input: ProposalInput,
    bond: i128,
    from_bounty: bool,
) -> Result<u64, DaoError> {
    let policy = storage::get_policy(env)?;
    if bond < policy.proposal_bond {
        return Err(DaoError::MinBond);
    }
    validate_kind(env, &policy, &input.kind, from_bounty)?;

    let label = input.kind.label();
    if !policy.can_execute_action(&user_info(env, proposer), label, Action::AddProposal) {
        return Err(DaoError::PermissionDenied);
    }

    receive_bond(env, proposer, bond)?;

    let id = storage::get_last_proposal_id(env);
    let proposal = Proposal {
        id,
        proposer: proposer.clone(),
        description: input.description,
        kind: input.kind,
        status: ProposalStatus::InProgress,
        vote_counts: Map::new(env),
        votes: Map::new(env),
        submission_time: env.ledger().timestamp(),
        bond,
    };
    storage::set_proposal(env, &proposal);
    storage::set_last_proposal_id(env, id + 1);

    events::emit_proposal_added(env, id, proposer, label, bond);
    Ok(id)
}

/// Checks the payload of a proposal kind before it is stored
///
/// # Errors
/// * `InvalidPolicy` - Policy payload is a default policy or malformed
/// * `BaseTokenNoMsg` - Transfer-and-call on the base token
/// * `InvalidAmount` - Transfer or bounty amount is not positive
/// * `StakingContractCantChange` - Staking contract is already set
/// * `RoleNotFound` / `RoleWrongKind` - Membership change on a missing or non-group role
/// * `WrongAction` - `BountyDone` outside of a bounty report
fn validate_kind(env: &Env, policy: &Policy, kind: &ProposalKind, from_bounty: bool) -> Result<(), DaoError> {
    match kind {
        ProposalKind::ChangePolicy(versioned) => {
            versioned.clone().into_current()?;
        }
        ProposalKind::Transfer(request) => {
            if request.token.is_none() && request.msg.is_some() {
                return Err(DaoError::BaseTokenNoMsg);
            }
            if request.amount <= 0 {
                return Err(DaoError::InvalidAmount);
            }
        }
        ProposalKind::AddBounty(bounty) => {
            if bounty.amount <= 0 {
                return Err(DaoError::InvalidAmount);
            }
        }
        ProposalKind::SetStakingContract(_) => {
            if storage::get_staking_id(env).is_some() {
                return Err(DaoError::StakingContractCantChange);
            }
        }
        ProposalKind::AddMemberToRole(_, role) | ProposalKind::RemoveMemberFromRole(_, role) => {
            policy.check_group_role(role)?;
        }
        ProposalKind::BountyDone(_, _) if !from_bounty => {
            return Err(DaoError::WrongAction);
        }
        ProposalKind::ChangePolicyAddOrUpdateRole(role) => {
            policy.clone().add_or_update_role(role.clone())?;
        }
        ProposalKind::ChangePolicyRemoveRole(name) => {
            policy.get_role(name).ok_or(DaoError::RoleNotFound)?;
        }
        ProposalKind::ChangePolicyDefaultVotePolicy(vote_policy) => {
            if !vote_policy.is_valid() {
                return Err(DaoError::InvalidPolicy);
            }
        }
        ProposalKind::ChangePolicyUpdateParameters(parameters) => {
            policy.clone().update_parameters(parameters)?;
        }
        _ => {}
    }
    Ok(())
}

// ============================================================================
// Actions
// ============================================================================

/// Applies `action` of `caller` to proposal `id`
///
/// # Errors
/// * `NoProposal` - Proposal does not exist or was removed
/// * `PermissionDenied` - No role of the caller grants the action for this kind
/// * `WrongAction` - `AddProposal`, or a vote or removal of a closed proposal
/// * `ProposalExpired` - Vote after the voting period
/// * `ProposalNotExpiredOrFailed` - Finalize of a proposal that is neither
pub fn act(env: &Env, caller: &Address, id: u64, action: Action, memo: &String) -> Result<(), DaoError> {
    let mut proposal = storage::get_proposal(env, id).ok_or(DaoError::NoProposal)?;
    let policy = storage::get_policy(env)?;
    let user = user_info(env, caller);
    let roles = policy.allowed_roles(&user, proposal.kind.label(), action);
    if roles.is_empty() {
        return Err(DaoError::PermissionDenied);
    }
    events::emit_proposal_acted(env, id, caller, action, memo);

    let now = env.ledger().timestamp();
    match action {
        Action::AddProposal => Err(DaoError::WrongAction),
        Action::RemoveProposal => {
            if proposal.status != ProposalStatus::InProgress {
                return Err(DaoError::WrongAction);
            }
            remove(env, &proposal);
            Ok(())
        }
        Action::VoteApprove | Action::VoteReject | Action::VoteRemove => {
            if proposal.status != ProposalStatus::InProgress {
                return Err(DaoError::WrongAction);
            }
            if tally::is_expired(&policy, &proposal, now) {
                return Err(DaoError::ProposalExpired);
            }
            let vote = action.vote().ok_or(DaoError::WrongAction)?;
            tally::record_vote(env, &policy, &mut proposal, caller, vote, &roles, user.amount);
            let status = tally::evaluate(&policy, &proposal, delegation::total_supply(env), now);
            resolve(env, &policy, proposal, status)
        }
        Action::Finalize => {
            if !matches!(proposal.status, ProposalStatus::InProgress | ProposalStatus::Failed) {
                return Err(DaoError::ProposalNotExpiredOrFailed);
            }
            match tally::evaluate(&policy, &proposal, delegation::total_supply(env), now) {
                status @ (ProposalStatus::Expired | ProposalStatus::Approved) => {
                    resolve(env, &policy, proposal, status)
                }
                _ => Err(DaoError::ProposalNotExpiredOrFailed),
            }
        }
    }
}

fn resolve(env: &Env, policy: &Policy, proposal: Proposal, status: ProposalStatus) -> Result<(), DaoError> {
    match status {
        ProposalStatus::Approved => execute(env, policy, proposal),
        ProposalStatus::Rejected | ProposalStatus::Expired => reject(env, proposal, status),
        ProposalStatus::Removed => {
            remove(env, &proposal);
            Ok(())
        }
        ProposalStatus::InProgress | ProposalStatus::Failed => {
            storage::set_proposal(env, &proposal);
            Ok(())
        }
    }
}

/// Closes `proposal` with a refund of its bond
fn reject(env: &Env, mut proposal: Proposal, status: ProposalStatus) -> Result<(), DaoError> {
    return_bond(env, &proposal.proposer, proposal.bond)?;
    if let ProposalKind::BountyDone(bounty_id, claimant) = &proposal.kind {
        if let Some(claim) = bounties::release_claim(env, claimant, *bounty_id) {
            return_bond(env, claimant, claim.bond)?;
        }
    }
    proposal.status = status;
    storage::set_proposal(env, &proposal);
    events::emit_status_changed(env, proposal.id, status);
    Ok(())
}

/// Deletes `proposal`. The bond stays with the DAO.
fn remove(env: &Env, proposal: &Proposal) {
    if let ProposalKind::BountyDone(bounty_id, claimant) = &proposal.kind {
        bounties::release_claim(env, claimant, *bounty_id);
    }
    storage::remove_proposal(env, proposal.id);
    events::emit_status_changed(env, proposal.id, ProposalStatus::Removed);
}

// ============================================================================
// Execution
// ============================================================================

fn execute(env: &Env, policy: &Policy, mut proposal: Proposal) -> Result<(), DaoError> {
    proposal.status = ProposalStatus::Approved;
    match apply(env, policy, &proposal)? {
        None => {
            return_bond(env, &proposal.proposer, proposal.bond)?;
            storage::set_proposal(env, &proposal);
            events::emit_status_changed(env, proposal.id, ProposalStatus::Approved);
            Ok(())
        }
        Some(calls) => {
            storage::set_proposal(env, &proposal);
            let pending = executor::dispatch(env, proposal.id, calls)?;
            let outcome = executor::perform(env, &pending);
            executor::settle(env, &pending, outcome);
            on_settled(env, proposal.id, outcome)
        }
    }
}

/// Applies a direct kind and returns `None`, or returns the outbound calls
/// of an external kind
fn apply(env: &Env, policy: &Policy, proposal: &Proposal) -> Result<Option<Vec<OutboundCall>>, DaoError> {
    let label = proposal.kind.label();
    let mut new_policy = policy.clone();
    match &proposal.kind {
        ProposalKind::ChangeConfig(config) => {
            storage::set_config(env, config);
            events::emit_config_changed(env, proposal.id);
            return Ok(None);
        }
        ProposalKind::ChangePolicy(versioned) => {
            new_policy = versioned.clone().into_current()?;
        }
        ProposalKind::AddMemberToRole(member, role) => {
            new_policy.add_member_to_role(role, member)?;
        }
        ProposalKind::RemoveMemberFromRole(member, role) => {
            new_policy.remove_member_from_role(role, member)?;
        }
        ProposalKind::ChangePolicyAddOrUpdateRole(role) => {
            new_policy.add_or_update_role(role.clone())?;
        }
        ProposalKind::ChangePolicyRemoveRole(name) => {
            new_policy.remove_role(name)?;
        }
        ProposalKind::ChangePolicyDefaultVotePolicy(vote_policy) => {
            new_policy.update_default_vote_policy(vote_policy.clone())?;
        }
        ProposalKind::ChangePolicyUpdateParameters(parameters) => {
            new_policy.update_parameters(parameters)?;
        }
        ProposalKind::SetStakingContract(staking_id) => {
            if storage::get_staking_id(env).is_some() {
                return Err(DaoError::StakingContractCantChange);
            }
            storage::set_staking_id(env, staking_id);
            events::emit_staking_contract_set(env, staking_id);
            return Ok(None);
        }
        ProposalKind::AddBounty(bounty) => {
            bounties::add_bounty(env, bounty);
            return Ok(None);
        }
        ProposalKind::Vote => return Ok(None),
        ProposalKind::FunctionCall(receiver, actions) => {
            let mut calls = Vec::new(env);
            for action in actions.iter() {
                calls.push_back(OutboundCall::Invoke(receiver.clone(), action.function, action.args));
            }
            return Ok(Some(calls));
        }
        ProposalKind::UpgradeSelf(wasm_hash) => {
            return Ok(Some(vec![env, OutboundCall::UpgradeSelf(wasm_hash.clone())]));
        }
        ProposalKind::UpgradeRemote(receiver, method, wasm_hash) => {
            let args: Vec<Val> = vec![env, wasm_hash.clone().into_val(env)];
            return Ok(Some(vec![
                env,
                OutboundCall::Invoke(receiver.clone(), method.clone(), args),
            ]));
        }
        ProposalKind::Transfer(request) => {
            let token = match &request.token {
                Some(token) => token.clone(),
                None => storage::get_base_token(env)?,
            };
            return Ok(Some(vec![
                env,
                OutboundCall::Payout(token, request.receiver.clone(), request.amount, request.msg.clone()),
            ]));
        }
        ProposalKind::BountyDone(bounty_id, receiver) => {
            // The claim is released once the payout settles successfully
            let bounty = storage::get_bounty(env, *bounty_id).ok_or(DaoError::NoBounty)?;
            let token = match bounty.token {
                Some(token) => token,
                None => storage::get_base_token(env)?,
            };
            return Ok(Some(vec![
                env,
                OutboundCall::Payout(token, receiver.clone(), bounty.amount, None),
            ]));
        }
    }

    storage::set_policy(env, &new_policy);
    events::emit_policy_changed(env, proposal.id, label);
    Ok(None)
}

/// Routes the outcome of a settled action into proposal `id`.
///
/// Success approves the proposal and refunds its bond. Failure marks it
/// `Failed` and keeps the bond, so it can be retried through `Finalize`.
pub fn on_settled(env: &Env, id: u64, outcome: Outcome) -> Result<(), DaoError> {
    let mut proposal = storage::get_proposal(env, id).ok_or(DaoError::NoProposal)?;
    proposal.status = match outcome {
        Outcome::Success => {
            return_bond(env, &proposal.proposer, proposal.bond)?;
            if let ProposalKind::BountyDone(bounty_id, claimant) = &proposal.kind {
                bounties::complete(env, *bounty_id, claimant)?;
            }
            ProposalStatus::Approved
        }
        Outcome::Failure { .. } => ProposalStatus::Failed,
    };
    storage::set_proposal(env, &proposal);
    events::emit_status_changed(env, id, proposal.status);
    Ok(())
}

// ============================================================================
// Queries
// ============================================================================

/// Proposals with ids in `from..from + limit`, skipping removed ones
pub fn list(env: &Env, from: u64, limit: u64) -> Vec<Proposal> {
    let end = storage::get_last_proposal_id(env).min(from.saturating_add(limit));
    let mut proposals = Vec::new(env);
    for id in from..end {
        if let Some(proposal) = storage::get_proposal(env, id) {
            proposals.push_back(proposal);
        }
    }
    proposals
}
