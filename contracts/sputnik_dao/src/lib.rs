#![no_std]

//! # Sputnik DAO
//!
//! A Soroban smart contract for DAO governance. Members add proposals with a
//! bond, vote on them through roles defined in the DAO policy, and approved
//! proposals change the DAO itself or act on other contracts.
//!
//! ## Features
//! - Role based permissions on `kind:action` pairs with wildcards
//! - Role weighted or token weighted voting with quorum and thresholds
//! - Proposal bonds, refunded unless the proposal is removed as spam
//! - Bounties with claims, deadlines and a forgiveness period
//! - Delegated voting weight fed by an external staking contract
//! - Two-phase execution of external actions with retry of failed ones
//!
//! ## Security
//! - Every mutating call authenticates its caller with `require_auth`
//! - A failing call aborts the whole invocation, no partial writes
//! - Failures of dispatched actions never abort: they mark the proposal `Failed`
//! - The staking contract can only be set once

use soroban_sdk::{contract, contractimpl, Address, Env, String, Vec};

mod bounties;
mod delegation;
mod error;
mod events;
mod executor;
mod policy;
mod proposals;
mod storage;
mod tally;
mod types;

pub use error::DaoError;
pub use executor::{OutboundCall, PendingAction};
pub use policy::{
    default_policy, ActionScope, KindScope, Permission, Policy, PolicyParameters, RoleKind,
    RolePermission, Threshold, VersionedPolicy, VotePolicy, WeightKind, BASE_UNIT, DAY,
};
pub use types::{
    Action, ActionCall, Bounty, BountyClaim, BountyOutput, Config, Proposal, ProposalInput,
    ProposalKind, ProposalLabel, ProposalStatus, TransferRequest, Vote, VoteCounts,
};

// ============================================================================
// Contract Implementation
// ============================================================================

#[contract]
pub struct SputnikDao;

#[contractimpl]
impl SputnikDao {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Initialize the DAO
    ///
    /// # Arguments
    /// * `config` - Name, purpose and metadata of the DAO
    /// * `policy` - Full policy, or `Default(council)` for the default policy
    /// * `base_token` - Token used for bonds and default payouts
    ///
    /// # Errors
    /// * `AlreadyInitialized` - Contract has already been initialized
    /// * `InvalidPolicy` - Policy does not validate
    pub fn initialize(
        env: Env,
        config: Config,
        policy: VersionedPolicy,
        base_token: Address,
    ) -> Result<(), DaoError> {
        if storage::is_initialized(&env) {
            return Err(DaoError::AlreadyInitialized);
        }

        let policy = policy.resolve(&env)?;

        storage::set_config(&env, &config);
        storage::set_policy(&env, &policy);
        storage::set_base_token(&env, &base_token);
        storage::set_last_proposal_id(&env, 0);
        storage::set_last_bounty_id(&env, 0);
        storage::set_initialized(&env);

        events::emit_initialized(&env, &base_token);
        Ok(())
    }

    // ========================================================================
    // Proposals
    // ========================================================================

    /// Add a proposal, paying `bond` base tokens
    ///
    /// # Arguments
    /// * `proposer` - Account adding the proposal (must authorize)
    /// * `proposal` - Description and kind of the proposal
    /// * `bond` - Bond to pay, at least the policy's proposal bond
    ///
    /// # Returns
    /// The id of the new proposal
    ///
    /// # Errors
    /// * `MinBond` - Bond is lower than the proposal bond
    /// * `PermissionDenied` - Proposer may not add this kind of proposal
    /// * `InvalidPolicy`, `BaseTokenNoMsg`, `InvalidAmount`,
    ///   `StakingContractCantChange`, `RoleNotFound`, `RoleWrongKind`,
    ///   `WrongAction` - Payload of the kind is invalid
    pub fn add_proposal(
        env: Env,
        proposer: Address,
        proposal: ProposalInput,
        bond: i128,
    ) -> Result<u64, DaoError> {
        if !storage::is_initialized(&env) {
            return Err(DaoError::NotInitialized);
        }
        proposer.require_auth();

        proposals::submit(&env, &proposer, proposal, bond, false)
    }

    /// Act on a proposal: vote, remove or finalize it
    ///
    /// # Arguments
    /// * `caller` - Acting account (must authorize)
    /// * `id` - Proposal ID
    /// * `action` - Action to take
    /// * `memo` - Free text published with the action
    ///
    /// # Errors
    /// * `NoProposal` - Proposal not found
    /// * `PermissionDenied` - Caller may not take this action on this kind
    /// * `WrongAction` - Action does not apply to the proposal's state
    /// * `ProposalExpired` - Vote after the voting period
    /// * `ProposalNotExpiredOrFailed` - Nothing to finalize
    pub fn act_proposal(
        env: Env,
        caller: Address,
        id: u64,
        action: Action,
        memo: String,
    ) -> Result<(), DaoError> {
        if !storage::is_initialized(&env) {
            return Err(DaoError::NotInitialized);
        }
        caller.require_auth();

        proposals::act(&env, &caller, id, action, &memo)
    }

    // ========================================================================
    // Bounties
    // ========================================================================

    /// Claim a bounty, paying exactly the bounty bond
    ///
    /// # Arguments
    /// * `claimant` - Account taking the bounty (must authorize)
    /// * `id` - Bounty ID
    /// * `deadline` - Seconds the claimant needs, at most the bounty's max deadline
    /// * `bond` - Bond to pay
    pub fn bounty_claim(
        env: Env,
        claimant: Address,
        id: u64,
        deadline: u64,
        bond: i128,
    ) -> Result<(), DaoError> {
        if !storage::is_initialized(&env) {
            return Err(DaoError::NotInitialized);
        }
        claimant.require_auth();

        bounties::claim(&env, &claimant, id, deadline, bond)
    }

    /// Report a bounty claim as done
    ///
    /// # Arguments
    /// * `caller` - Reporting account (must authorize)
    /// * `id` - Bounty ID
    /// * `account` - Claimant, defaults to the caller
    /// * `description` - Description of the `BountyDone` proposal
    /// * `bond` - Proposal bond
    ///
    /// # Returns
    /// The id of the `BountyDone` proposal, or `None` when an expired claim was released
    pub fn bounty_done(
        env: Env,
        caller: Address,
        id: u64,
        account: Option<Address>,
        description: String,
        bond: i128,
    ) -> Result<Option<u64>, DaoError> {
        if !storage::is_initialized(&env) {
            return Err(DaoError::NotInitialized);
        }
        caller.require_auth();

        let claimant = account.unwrap_or_else(|| caller.clone());
        bounties::done(&env, &caller, id, &claimant, description, bond)
    }

    /// Give up a bounty claim
    ///
    /// # Returns
    /// Whether the bounty bond was returned
    pub fn bounty_giveup(env: Env, claimant: Address, id: u64) -> Result<bool, DaoError> {
        if !storage::is_initialized(&env) {
            return Err(DaoError::NotInitialized);
        }
        claimant.require_auth();

        bounties::giveup(&env, &claimant, id)
    }

    // ========================================================================
    // Delegation (staking contract only)
    // ========================================================================

    /// Start tracking delegations to `account`
    ///
    /// # Errors
    /// * `NoStaking` - No staking contract is set
    /// * `InvalidCaller` - Caller is not the staking contract
    pub fn register_delegation(env: Env, caller: Address, account: Address) -> Result<(), DaoError> {
        delegation::register(&env, &caller, &account)
    }

    /// Delegate `amount` to `account`
    ///
    /// # Returns
    /// Previous balance, new balance and new total supply
    ///
    /// # Errors
    /// * `NoStaking`, `InvalidCaller` - Caller is not the staking contract
    /// * `NotRegistered` - Account was never registered
    /// * `InvalidAmount` - Amount is negative
    pub fn delegate(
        env: Env,
        caller: Address,
        account: Address,
        amount: i128,
    ) -> Result<(i128, i128, i128), DaoError> {
        delegation::delegate(&env, &caller, &account, amount)
    }

    /// Remove `amount` of delegation from `account`
    ///
    /// # Errors
    /// * `NoStaking`, `InvalidCaller` - Caller is not the staking contract
    /// * `NotRegistered` - Account was never registered
    /// * `InvalidAmount` - Amount is negative
    /// * `InvalidStakingContract` - Amount exceeds the delegated balance
    pub fn undelegate(
        env: Env,
        caller: Address,
        account: Address,
        amount: i128,
    ) -> Result<(i128, i128, i128), DaoError> {
        delegation::undelegate(&env, &caller, &account, amount)
    }

    // ========================================================================
    // Query Functions
    // ========================================================================

    /// Version of the contract
    pub fn version(env: Env) -> String {
        String::from_str(&env, env!("CARGO_PKG_VERSION"))
    }

    pub fn get_config(env: Env) -> Result<Config, DaoError> {
        storage::get_config(&env)
    }

    pub fn get_policy(env: Env) -> Result<Policy, DaoError> {
        storage::get_policy(&env)
    }

    pub fn get_base_token(env: Env) -> Result<Address, DaoError> {
        storage::get_base_token(&env)
    }

    pub fn get_staking_contract(env: Env) -> Option<Address> {
        storage::get_staking_id(&env)
    }

    /// Number of proposals ever added
    pub fn get_last_proposal_id(env: Env) -> u64 {
        storage::get_last_proposal_id(&env)
    }

    pub fn get_proposal(env: Env, id: u64) -> Result<Proposal, DaoError> {
        storage::get_proposal(&env, id).ok_or(DaoError::NoProposal)
    }

    /// Proposals with ids from `from`, at most `limit`, skipping removed ones
    pub fn get_proposals(env: Env, from: u64, limit: u64) -> Vec<Proposal> {
        proposals::list(&env, from, limit)
    }

    /// Number of bounties ever added
    pub fn get_last_bounty_id(env: Env) -> u64 {
        storage::get_last_bounty_id(&env)
    }

    pub fn get_bounty(env: Env, id: u64) -> Result<BountyOutput, DaoError> {
        let bounty = storage::get_bounty(&env, id).ok_or(DaoError::NoBounty)?;
        Ok(BountyOutput { id, bounty })
    }

    /// Bounties with ids from `from`, at most `limit`, skipping removed ones
    pub fn get_bounties(env: Env, from: u64, limit: u64) -> Vec<BountyOutput> {
        let end = storage::get_last_bounty_id(&env).min(from.saturating_add(limit));
        let mut result = Vec::new(&env);
        for id in from..end {
            if let Some(bounty) = storage::get_bounty(&env, id) {
                result.push_back(BountyOutput { id, bounty });
            }
        }
        result
    }

    pub fn get_bounty_claims(env: Env, account: Address) -> Vec<BountyClaim> {
        storage::get_bounty_claims(&env, &account)
    }

    /// Number of open claims on bounty `id`
    pub fn get_bounty_number_of_claims(env: Env, id: u64) -> u32 {
        storage::get_bounty_claims_count(&env, id)
    }

    pub fn delegation_balance_of(env: Env, account: Address) -> i128 {
        delegation::balance_of(&env, &account)
    }

    pub fn delegation_total_supply(env: Env) -> i128 {
        delegation::total_supply(&env)
    }

    /// Balance of `account` together with the total supply
    pub fn delegation_balance_ratio(env: Env, account: Address) -> (i128, i128) {
        (
            delegation::balance_of(&env, &account),
            delegation::total_supply(&env),
        )
    }

    /// Outbound action of proposal `id` that has not settled, if any
    pub fn get_pending_action(env: Env, id: u64) -> Option<PendingAction> {
        storage::get_pending(&env, id)
    }
}
