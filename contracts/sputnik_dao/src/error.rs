//! Error types for the Sputnik DAO contract

use soroban_sdk::contracterror;

/// DAO contract errors
///
/// Every failing call aborts the invocation, so no partial state is left
/// behind. Failures of dispatched actions are not errors: they surface as a
/// `Failed` proposal status.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum DaoError {
    /// Contract has already been initialized
    AlreadyInitialized = 1,
    /// Contract has not been initialized
    NotInitialized = 2,
    /// Proposal bond is lower than the policy requires
    MinBond = 3,
    /// None of the caller's roles grants the requested action
    PermissionDenied = 4,
    /// Policy is not a valid current policy
    InvalidPolicy = 5,
    /// A transfer-and-call message cannot be attached to the base token
    BaseTokenNoMsg = 6,
    /// Proposal with given ID was not found
    NoProposal = 7,
    /// Action cannot be applied to the proposal in its current state
    WrongAction = 8,
    /// Finalize requires an expired or failed proposal
    ProposalNotExpiredOrFailed = 9,
    /// Staking contract is already set
    StakingContractCantChange = 10,
    /// Voting period of the proposal is over
    ProposalExpired = 11,
    /// Bounty with given ID was not found
    NoBounty = 12,
    /// Claim bond does not equal the bounty bond
    BountyWrongBond = 13,
    /// Claim deadline exceeds the bounty's max deadline
    BountyWrongDeadline = 14,
    /// Bounty has no free claim slots
    BountyAllClaimed = 15,
    /// Account has no bounty claims
    NoBountyClaims = 16,
    /// Account has no claim on this bounty
    NoBountyClaim = 17,
    /// Only the claimant can report a claim that is still running
    BountyDoneMustBeSelf = 18,
    /// Claim was already reported as done
    BountyClaimCompleted = 19,
    /// No staking contract is set
    NoStaking = 20,
    /// Caller is not the staking contract
    InvalidCaller = 21,
    /// Account is not registered for delegation
    NotRegistered = 22,
    /// Staking contract tried to undelegate more than was delegated
    InvalidStakingContract = 23,
    /// Role with given name was not found in the policy
    RoleNotFound = 24,
    /// Role is not a group role
    RoleWrongKind = 25,
    /// Amount must be positive
    InvalidAmount = 26,
    /// An action for this proposal is already being dispatched
    ActionPending = 27,
}
