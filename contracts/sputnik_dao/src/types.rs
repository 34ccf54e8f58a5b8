//! Data types for the Sputnik DAO contract

use soroban_sdk::{contracttype, Address, Bytes, BytesN, Map, String, Symbol, Val, Vec};

use crate::policy::{PolicyParameters, RolePermission, VersionedPolicy, VotePolicy};

/// DAO configuration
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Name of the DAO
    pub name: String,
    /// Purpose of this DAO
    pub purpose: String,
    /// Generic metadata for interfaces, not interpreted by the contract
    pub metadata: Bytes,
}

/// Actions that can be taken on a proposal
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Action {
    /// Add a proposal. Only valid through `add_proposal`
    AddProposal = 0,
    /// Delete a proposal that is still in progress
    RemoveProposal = 1,
    /// Vote to approve
    VoteApprove = 2,
    /// Vote to reject
    VoteReject = 3,
    /// Vote to remove (spam)
    VoteRemove = 4,
    /// Close an expired proposal or retry a failed one
    Finalize = 5,
}

impl Action {
    /// Vote cast by this action, if it is a vote
    pub fn vote(&self) -> Option<Vote> {
        match self {
            Action::VoteApprove => Some(Vote::Approve),
            Action::VoteReject => Some(Vote::Reject),
            Action::VoteRemove => Some(Vote::Remove),
            _ => None,
        }
    }
}

/// A single vote choice
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Vote {
    Approve = 0,
    Reject = 1,
    Remove = 2,
}

/// Status of a proposal
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ProposalStatus {
    /// Accepting votes
    InProgress = 0,
    /// Approved and applied (or settled successfully)
    Approved = 1,
    /// Rejected by vote, bond returned
    Rejected = 2,
    /// Removed as spam, bond kept. Removed records are deleted
    Removed = 3,
    /// Period elapsed without a decision, bond returned
    Expired = 4,
    /// Approved, but the dispatched action failed
    Failed = 5,
}

/// Policy label of a proposal kind
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ProposalLabel {
    Config = 0,
    Policy = 1,
    AddMemberToRole = 2,
    RemoveMemberFromRole = 3,
    Call = 4,
    UpgradeSelf = 5,
    UpgradeRemote = 6,
    Transfer = 7,
    SetVoteToken = 8,
    AddBounty = 9,
    BountyDone = 10,
    Vote = 11,
    PolicyAddOrUpdateRole = 12,
    PolicyRemoveRole = 13,
    PolicyUpdateDefaultVotePolicy = 14,
    PolicyUpdateParameters = 15,
}

/// One call of a `FunctionCall` proposal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionCall {
    /// Function to invoke on the receiver
    pub function: Symbol,
    /// Arguments for the function
    pub args: Vec<Val>,
}

/// Payload of a `Transfer` proposal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferRequest {
    /// Token to pay out. `None` is the DAO base token
    pub token: Option<Address>,
    /// Receiver of the funds
    pub receiver: Address,
    /// Amount to transfer
    pub amount: i128,
    /// If set, the receiver is notified through `on_token_transfer`
    pub msg: Option<String>,
}

/// Bounty information
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bounty {
    /// Description of the bounty
    pub description: String,
    /// Token the bounty is paid in. `None` is the DAO base token
    pub token: Option<Address>,
    /// Amount paid per completion
    pub amount: i128,
    /// How many times this bounty can still be done
    pub times: u32,
    /// Longest deadline a claimer may ask for, in seconds
    pub max_deadline: u64,
}

/// Bounty together with its id
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyOutput {
    pub id: u64,
    pub bounty: Bounty,
}

/// Claim of a bounty by an account
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyClaim {
    /// Bounty that was claimed
    pub bounty_id: u64,
    /// Account working on the bounty
    pub claimant: Address,
    /// Timestamp of the claim
    pub start_time: u64,
    /// Time the claimant asked for, in seconds from `start_time`
    pub deadline: u64,
    /// Reported as done, waiting for the `BountyDone` vote
    pub completed: bool,
    /// Bounty bond paid with the claim, refunded as paid
    pub bond: i128,
}

/// Kinds of proposals
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProposalKind {
    /// Replace the DAO config
    ChangeConfig(Config),
    /// Replace the full policy
    ChangePolicy(VersionedPolicy),
    /// Add (member, role) to a group role
    AddMemberToRole(Address, Symbol),
    /// Remove (member, role) from a group role
    RemoveMemberFromRole(Address, Symbol),
    /// Call (receiver, calls) in order
    FunctionCall(Address, Vec<ActionCall>),
    /// Upgrade this contract to an uploaded wasm hash
    UpgradeSelf(BytesN<32>),
    /// Call (receiver, function, wasm hash) on another contract
    UpgradeRemote(Address, Symbol, BytesN<32>),
    /// Transfer funds out of the DAO
    Transfer(TransferRequest),
    /// Set the staking contract. Only once
    SetStakingContract(Address),
    /// Add a new bounty
    AddBounty(Bounty),
    /// Pay out (bounty id, claimant). Created by `bounty_done`
    BountyDone(u64, Address),
    /// Signaling vote without effect
    Vote,
    /// Add a role or replace the role with the same name
    ChangePolicyAddOrUpdateRole(RolePermission),
    /// Remove a role by name
    ChangePolicyRemoveRole(Symbol),
    /// Replace the default vote policy
    ChangePolicyDefaultVotePolicy(VotePolicy),
    /// Update bonds and periods
    ChangePolicyUpdateParameters(PolicyParameters),
}

impl ProposalKind {
    /// Returns label of policy for given kind of proposal
    pub fn label(&self) -> ProposalLabel {
        match self {
            ProposalKind::ChangeConfig(_) => ProposalLabel::Config,
            ProposalKind::ChangePolicy(_) => ProposalLabel::Policy,
            ProposalKind::AddMemberToRole(_, _) => ProposalLabel::AddMemberToRole,
            ProposalKind::RemoveMemberFromRole(_, _) => ProposalLabel::RemoveMemberFromRole,
            ProposalKind::FunctionCall(_, _) => ProposalLabel::Call,
            ProposalKind::UpgradeSelf(_) => ProposalLabel::UpgradeSelf,
            ProposalKind::UpgradeRemote(_, _, _) => ProposalLabel::UpgradeRemote,
            ProposalKind::Transfer(_) => ProposalLabel::Transfer,
            ProposalKind::SetStakingContract(_) => ProposalLabel::SetVoteToken,
            ProposalKind::AddBounty(_) => ProposalLabel::AddBounty,
            ProposalKind::BountyDone(_, _) => ProposalLabel::BountyDone,
            ProposalKind::Vote => ProposalLabel::Vote,
            ProposalKind::ChangePolicyAddOrUpdateRole(_) => ProposalLabel::PolicyAddOrUpdateRole,
            ProposalKind::ChangePolicyRemoveRole(_) => ProposalLabel::PolicyRemoveRole,
            ProposalKind::ChangePolicyDefaultVotePolicy(_) => ProposalLabel::PolicyUpdateDefaultVotePolicy,
            ProposalKind::ChangePolicyUpdateParameters(_) => ProposalLabel::PolicyUpdateParameters,
        }
    }
}

/// Input of `add_proposal`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProposalInput {
    /// Description of the proposal
    pub description: String,
    /// Kind of proposal with its payload
    pub kind: ProposalKind,
}

/// Weight per choice within one role
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VoteCounts {
    pub approve: i128,
    pub reject: i128,
    pub remove: i128,
}

impl VoteCounts {
    pub fn get(&self, vote: Vote) -> i128 {
        match vote {
            Vote::Approve => self.approve,
            Vote::Reject => self.reject,
            Vote::Remove => self.remove,
        }
    }

    pub fn add(&mut self, vote: Vote, amount: i128) {
        match vote {
            Vote::Approve => self.approve += amount,
            Vote::Reject => self.reject += amount,
            Vote::Remove => self.remove += amount,
        }
    }

    /// Total weight cast, any choice
    pub fn total(&self) -> i128 {
        self.approve + self.reject + self.remove
    }
}

/// Latest vote of an account and the weight it added per role
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ballot {
    pub vote: Vote,
    pub weights: Map<Symbol, i128>,
}

/// A proposal sent to this DAO
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    /// Sequential id, never reused
    pub id: u64,
    /// Account that added the proposal
    pub proposer: Address,
    /// Description of this proposal
    pub description: String,
    /// Kind of proposal with relevant information
    pub kind: ProposalKind,
    /// Current status of the proposal
    pub status: ProposalStatus,
    /// Weight per role per choice
    pub vote_counts: Map<Symbol, VoteCounts>,
    /// Latest ballot per account
    pub votes: Map<Address, Ballot>,
    /// Submission time, for the voting period
    pub submission_time: u64,
    /// Bond paid by the proposer
    pub bond: i128,
}
