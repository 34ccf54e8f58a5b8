//! Storage keys and helpers for the Sputnik DAO contract

use soroban_sdk::{contracttype, Address, Env, IntoVal, Val, Vec};

use crate::error::DaoError;
use crate::executor::PendingAction;
use crate::policy::Policy;
use crate::types::{Bounty, BountyClaim, Config, Proposal};

/// Ledgers a persistent entry lives after it was written (about 30 days)
const PERSISTENT_TTL: u32 = 518_400;
/// Remaining ledgers below which a write extends the entry
const PERSISTENT_TTL_THRESHOLD: u32 = PERSISTENT_TTL - 17_280;

/// Storage keys for the DAO contract
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Boolean flag indicating contract initialization
    Initialized,
    /// DAO configuration (instance storage)
    Config,
    /// Current policy (instance storage)
    Policy,
    /// Token used for bonds and as the default payout token (instance storage)
    BaseToken,
    /// Staking contract allowed to change delegations (instance storage)
    StakingId,
    /// Number of proposals ever added, the next id (instance storage)
    LastProposalId,
    /// Number of bounties ever added, the next id (instance storage)
    LastBountyId,
    /// Sum of all delegated balances (instance storage)
    TotalDelegation,
    /// A proposal (persistent storage)
    Proposal(u64),
    /// A bounty (persistent storage)
    Bounty(u64),
    /// Claims held by an account (persistent storage)
    BountyClaimers(Address),
    /// Number of open claims on a bounty (persistent storage)
    BountyClaimsCount(u64),
    /// Delegated balance of an account (persistent storage)
    Delegation(Address),
    /// Outbound action of a proposal that has not settled yet (persistent storage)
    Pending(u64),
}

fn set_persistent<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    let storage = env.storage().persistent();
    storage.set(key, value);
    storage.extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL);
}

// ============================================================================
// Initialization Helpers
// ============================================================================

/// Check if the contract is initialized
pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .instance()
        .get::<DataKey, bool>(&DataKey::Initialized)
        .unwrap_or(false)
}

/// Mark the contract as initialized
pub fn set_initialized(env: &Env) {
    env.storage().instance().set(&DataKey::Initialized, &true);
}

// ============================================================================
// Configuration Helpers
// ============================================================================

pub fn get_config(env: &Env) -> Result<Config, DaoError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(DaoError::NotInitialized)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_policy(env: &Env) -> Result<Policy, DaoError> {
    env.storage()
        .instance()
        .get(&DataKey::Policy)
        .ok_or(DaoError::NotInitialized)
}

pub fn set_policy(env: &Env, policy: &Policy) {
    env.storage().instance().set(&DataKey::Policy, policy);
}

pub fn get_base_token(env: &Env) -> Result<Address, DaoError> {
    env.storage()
        .instance()
        .get(&DataKey::BaseToken)
        .ok_or(DaoError::NotInitialized)
}

pub fn set_base_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::BaseToken, token);
}

pub fn get_staking_id(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::StakingId)
}

pub fn set_staking_id(env: &Env, staking_id: &Address) {
    env.storage().instance().set(&DataKey::StakingId, staking_id);
}

// ============================================================================
// Proposal Helpers
// ============================================================================

pub fn get_last_proposal_id(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::LastProposalId)
        .unwrap_or(0)
}

pub fn set_last_proposal_id(env: &Env, id: u64) {
    env.storage().instance().set(&DataKey::LastProposalId, &id);
}

pub fn get_proposal(env: &Env, id: u64) -> Option<Proposal> {
    env.storage().persistent().get(&DataKey::Proposal(id))
}

pub fn set_proposal(env: &Env, proposal: &Proposal) {
    set_persistent(env, &DataKey::Proposal(proposal.id), proposal);
}

pub fn remove_proposal(env: &Env, id: u64) {
    env.storage().persistent().remove(&DataKey::Proposal(id));
}

// ============================================================================
// Bounty Helpers
// ============================================================================

pub fn get_last_bounty_id(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::LastBountyId)
        .unwrap_or(0)
}

pub fn set_last_bounty_id(env: &Env, id: u64) {
    env.storage().instance().set(&DataKey::LastBountyId, &id);
}

pub fn get_bounty(env: &Env, id: u64) -> Option<Bounty> {
    env.storage().persistent().get(&DataKey::Bounty(id))
}

pub fn set_bounty(env: &Env, id: u64, bounty: &Bounty) {
    set_persistent(env, &DataKey::Bounty(id), bounty);
}

pub fn remove_bounty(env: &Env, id: u64) {
    env.storage().persistent().remove(&DataKey::Bounty(id));
    env.storage().persistent().remove(&DataKey::BountyClaimsCount(id));
}

/// Claims of `account`, empty when it never claimed
pub fn get_bounty_claims(env: &Env, account: &Address) -> Vec<BountyClaim> {
    env.storage()
        .persistent()
        .get(&DataKey::BountyClaimers(account.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn set_bounty_claims(env: &Env, account: &Address, claims: &Vec<BountyClaim>) {
    let key = DataKey::BountyClaimers(account.clone());
    if claims.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        set_persistent(env, &key, claims);
    }
}

pub fn get_bounty_claims_count(env: &Env, id: u64) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::BountyClaimsCount(id))
        .unwrap_or(0)
}

pub fn set_bounty_claims_count(env: &Env, id: u64, count: u32) {
    set_persistent(env, &DataKey::BountyClaimsCount(id), &count);
}

// ============================================================================
// Delegation Helpers
// ============================================================================

pub fn get_delegation(env: &Env, account: &Address) -> Option<i128> {
    env.storage()
        .persistent()
        .get(&DataKey::Delegation(account.clone()))
}

pub fn set_delegation(env: &Env, account: &Address, amount: i128) {
    set_persistent(env, &DataKey::Delegation(account.clone()), &amount);
}

pub fn get_total_delegation(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalDelegation)
        .unwrap_or(0)
}

pub fn set_total_delegation(env: &Env, amount: i128) {
    env.storage().instance().set(&DataKey::TotalDelegation, &amount);
}

// ============================================================================
// Pending Action Helpers
// ============================================================================

pub fn get_pending(env: &Env, proposal_id: u64) -> Option<PendingAction> {
    env.storage().persistent().get(&DataKey::Pending(proposal_id))
}

pub fn set_pending(env: &Env, pending: &PendingAction) {
    set_persistent(env, &DataKey::Pending(pending.proposal_id), pending);
}

pub fn remove_pending(env: &Env, proposal_id: u64) {
    env.storage().persistent().remove(&DataKey::Pending(proposal_id));
}
