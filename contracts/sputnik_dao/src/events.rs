use soroban_sdk::{contractevent, Address, Env, String};

use crate::types::{Action, ProposalLabel, ProposalStatus};

#[contractevent(topics = ["SputnikDao", "INIT"])]
struct DaoInitialized {
    base_token: Address,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "PROPOSED"])]
struct ProposalAdded {
    proposal_id: u64,
    proposer: Address,
    label: u32,
    bond: i128,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "ACTED"])]
struct ProposalActed {
    proposal_id: u64,
    caller: Address,
    action: u32, // 0=AddProposal .. 5=Finalize
    memo: String,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "STATUS"])]
struct StatusChanged {
    proposal_id: u64,
    status: u32, // 0=InProgress .. 5=Failed
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "DISPATCHED"])]
struct ActionDispatched {
    proposal_id: u64,
    calls: u32,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "SETTLED"])]
struct ActionSettled {
    proposal_id: u64,
    success: bool,
    failed_call: Option<u32>,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "CONFIG"])]
struct ConfigChanged {
    proposal_id: u64,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "POLICY"])]
struct PolicyChanged {
    proposal_id: u64,
    label: u32,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "STAKING"])]
struct StakingContractSet {
    staking_id: Address,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "BOUNTY_ADD"])]
struct BountyAdded {
    bounty_id: u64,
    amount: i128,
    times: u32,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "CLAIMED"])]
struct BountyClaimed {
    bounty_id: u64,
    claimant: Address,
    deadline: u64,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "DONE"])]
struct BountyReported {
    bounty_id: u64,
    claimant: Address,
    proposal_id: Option<u64>,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "GIVEUP"])]
struct BountyGivenUp {
    bounty_id: u64,
    claimant: Address,
    refunded: bool,
    timestamp: u64,
}

#[contractevent(topics = ["SputnikDao", "DELEGATED"])]
struct Delegated {
    account: Address,
    amount: i128,
    balance: i128,
    total: i128,
}

#[contractevent(topics = ["SputnikDao", "UNDELEGATED"])]
struct Undelegated {
    account: Address,
    amount: i128,
    balance: i128,
    total: i128,
}

pub fn emit_initialized(env: &Env, base_token: &Address) {
    DaoInitialized {
        base_token: base_token.clone(),
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_proposal_added(env: &Env, proposal_id: u64, proposer: &Address, label: ProposalLabel, bond: i128) {
    ProposalAdded {
        proposal_id,
        proposer: proposer.clone(),
        label: label as u32,
        bond,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_proposal_acted(env: &Env, proposal_id: u64, caller: &Address, action: Action, memo: &String) {
    ProposalActed {
        proposal_id,
        caller: caller.clone(),
        action: action as u32,
        memo: memo.clone(),
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_status_changed(env: &Env, proposal_id: u64, status: ProposalStatus) {
    StatusChanged {
        proposal_id,
        status: status as u32,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_action_dispatched(env: &Env, proposal_id: u64, calls: u32) {
    ActionDispatched {
        proposal_id,
        calls,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_action_settled(env: &Env, proposal_id: u64, failed_call: Option<u32>) {
    ActionSettled {
        proposal_id,
        success: failed_call.is_none(),
        failed_call,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_config_changed(env: &Env, proposal_id: u64) {
    ConfigChanged {
        proposal_id,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_policy_changed(env: &Env, proposal_id: u64, label: ProposalLabel) {
    PolicyChanged {
        proposal_id,
        label: label as u32,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_staking_contract_set(env: &Env, staking_id: &Address) {
    StakingContractSet {
        staking_id: staking_id.clone(),
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_bounty_added(env: &Env, bounty_id: u64, amount: i128, times: u32) {
    BountyAdded {
        bounty_id,
        amount,
        times,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_bounty_claimed(env: &Env, bounty_id: u64, claimant: &Address, deadline: u64) {
    BountyClaimed {
        bounty_id,
        claimant: claimant.clone(),
        deadline,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_bounty_done(env: &Env, bounty_id: u64, claimant: &Address, proposal_id: Option<u64>) {
    BountyReported {
        bounty_id,
        claimant: claimant.clone(),
        proposal_id,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_bounty_giveup(env: &Env, bounty_id: u64, claimant: &Address, refunded: bool) {
    BountyGivenUp {
        bounty_id,
        claimant: claimant.clone(),
        refunded,
        timestamp: env.ledger().timestamp(),
    }
    .publish(env);
}

pub fn emit_delegated(env: &Env, account: &Address, amount: i128, balance: i128, total: i128) {
    Delegated {
        account: account.clone(),
        amount,
        balance,
        total,
    }
    .publish(env);
}

pub fn emit_undelegated(env: &Env, account: &Address, amount: i128, balance: i128, total: i128) {
    Undelegated {
        account: account.clone(),
        amount,
        balance,
        total,
    }
    .publish(env);
}
