//! Policy store: roles, permissions and vote policies
//!
//! A permission is a pair of tokens, the proposal kind and the action, where
//! either side can be a wildcard. An account is allowed to take an action
//! if any role it matches holds a pair that covers it.

use soroban_sdk::{contracttype, symbol_short, vec, Address, Env, Map, Symbol, Vec};

use crate::error::DaoError;
use crate::types::{Action, ProposalLabel};

/// One unit of a 7-decimal token
pub const BASE_UNIT: i128 = 10_000_000;

/// Seconds in a day
pub const DAY: u64 = 24 * 60 * 60;

/// Which accounts a role covers
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoleKind {
    /// Matches everyone
    Everyone,
    /// Accounts with at least this much delegated weight
    Member(i128),
    /// Explicit set of accounts
    Group(Vec<Address>),
}

impl RoleKind {
    /// Checks if user matches this role
    pub fn matches(&self, user: &UserInfo) -> bool {
        match self {
            RoleKind::Everyone => true,
            RoleKind::Member(min) => user.amount >= *min,
            RoleKind::Group(members) => members.contains(&user.account),
        }
    }
}

/// Proposal-kind side of a permission
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KindScope {
    Any,
    Kind(ProposalLabel),
}

/// Action side of a permission
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ActionScope {
    Any,
    Action(Action),
}

/// `kind:action` permission, either side may be `*`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Permission {
    pub kind: KindScope,
    pub action: ActionScope,
}

impl Permission {
    pub fn new(kind: KindScope, action: ActionScope) -> Self {
        Self { kind, action }
    }

    /// `*:action`
    pub fn any_kind(action: Action) -> Self {
        Self::new(KindScope::Any, ActionScope::Action(action))
    }

    /// `kind:action`
    pub fn exact(kind: ProposalLabel, action: Action) -> Self {
        Self::new(KindScope::Kind(kind), ActionScope::Action(action))
    }

    pub fn allows(&self, label: ProposalLabel, action: Action) -> bool {
        let kind_ok = match &self.kind {
            KindScope::Any => true,
            KindScope::Kind(kind) => *kind == label,
        };
        let action_ok = match &self.action {
            ActionScope::Any => true,
            ActionScope::Action(allowed) => *allowed == action,
        };
        kind_ok && action_ok
    }
}

/// Role with its permissions and vote policies
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RolePermission {
    /// Unique name of the role
    pub name: Symbol,
    /// Accounts covered by the role
    pub kind: RoleKind,
    /// Permissions granted to the role
    pub permissions: Vec<Permission>,
    /// Vote policy per proposal kind. Falls back to the default vote policy
    pub vote_policy: Map<ProposalLabel, VotePolicy>,
}

impl RolePermission {
    pub fn allows(&self, label: ProposalLabel, action: Action) -> bool {
        self.permissions.iter().any(|p| p.allows(label, action))
    }
}

/// Account information used to resolve roles
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserInfo {
    pub account: Address,
    /// Delegated weight of the account
    pub amount: i128,
}

/// How votes are weighted
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum WeightKind {
    /// Delegated token amounts against the delegation total supply
    TokenWeight = 0,
    /// One vote per member against the group size
    RoleWeight = 1,
}

/// Absolute weight or ratio of the total weight needed to decide
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Threshold {
    Weight(i128),
    Ratio(u64, u64),
}

impl Threshold {
    /// Weight a choice needs given the total weight.
    ///
    /// Ratios require a strict majority of the ratio: `floor(num * total / den) + 1`,
    /// capped at `total`.
    pub fn to_weight(&self, total: i128) -> i128 {
        match self {
            Threshold::Weight(weight) => (*weight).min(total),
            Threshold::Ratio(num, den) => {
                if *den == 0 {
                    return total;
                }
                (*num as i128)
                    .checked_mul(total)
                    .map(|scaled| scaled / *den as i128 + 1)
                    .unwrap_or(total)
                    .min(total)
            }
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            Threshold::Weight(weight) => *weight >= 0,
            Threshold::Ratio(num, den) => *den > 0 && num <= den,
        }
    }
}

/// Configuration of a vote
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VotePolicy {
    /// Kind of weight to use for votes
    pub weight_kind: WeightKind,
    /// Minimum total weight cast before the role can decide
    pub quorum: i128,
    /// Weight needed for a choice to win
    pub threshold: Threshold,
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self {
            weight_kind: WeightKind::RoleWeight,
            quorum: 0,
            threshold: Threshold::Ratio(1, 2),
        }
    }
}

impl VotePolicy {
    pub fn is_valid(&self) -> bool {
        self.quorum >= 0 && self.threshold.is_valid()
    }
}

/// Voting and permission policy of the DAO
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Policy {
    /// Roles in evaluation order
    pub roles: Vec<RolePermission>,
    /// Used when a role has no vote policy for the proposal kind
    pub default_vote_policy: VotePolicy,
    /// Bond for adding a proposal
    pub proposal_bond: i128,
    /// Voting period of a proposal, in seconds
    pub proposal_period: u64,
    /// Bond for claiming a bounty
    pub bounty_bond: i128,
    /// Period in which giving up on a bounty is not punished, in seconds
    pub bounty_forgiveness_period: u64,
}

/// Partial update of the policy parameters
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyParameters {
    pub proposal_bond: Option<i128>,
    pub proposal_period: Option<u64>,
    pub bounty_bond: Option<i128>,
    pub bounty_forgiveness_period: Option<u64>,
}

/// Policy as supplied by callers
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VersionedPolicy {
    /// Default policy with the given accounts as council
    Default(Vec<Address>),
    Current(Policy),
}

impl VersionedPolicy {
    /// Resolves the bootstrap shorthand into a full policy
    pub fn resolve(self, env: &Env) -> Result<Policy, DaoError> {
        let policy = match self {
            VersionedPolicy::Default(council) => default_policy(env, council),
            VersionedPolicy::Current(policy) => policy,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Returns the policy only if it is already in current form
    pub fn into_current(self) -> Result<Policy, DaoError> {
        match self {
            VersionedPolicy::Current(policy) => {
                policy.validate()?;
                Ok(policy)
            }
            VersionedPolicy::Default(_) => Err(DaoError::InvalidPolicy),
        }
    }
}

/// Default policy:
/// - everyone can add proposals
/// - the council can add, vote on and finalize any proposal
/// - one vote per council member, more than half of the council decides
/// - proposal and bounty bonds of one token unit
/// - 7 day proposal period, 1 day bounty forgiveness period
pub fn default_policy(env: &Env, council: Vec<Address>) -> Policy {
    let mut members: Vec<Address> = Vec::new(env);
    for account in council.iter() {
        if !members.contains(&account) {
            members.push_back(account);
        }
    }

    let roles = vec![
        env,
        RolePermission {
            name: symbol_short!("all"),
            kind: RoleKind::Everyone,
            permissions: vec![env, Permission::any_kind(Action::AddProposal)],
            vote_policy: Map::new(env),
        },
        RolePermission {
            name: symbol_short!("council"),
            kind: RoleKind::Group(members),
            // Everything except RemoveProposal
            permissions: vec![
                env,
                Permission::any_kind(Action::AddProposal),
                Permission::any_kind(Action::VoteApprove),
                Permission::any_kind(Action::VoteReject),
                Permission::any_kind(Action::VoteRemove),
                Permission::any_kind(Action::Finalize),
            ],
            vote_policy: Map::new(env),
        },
    ];

    Policy {
        roles,
        default_vote_policy: VotePolicy::default(),
        proposal_bond: BASE_UNIT,
        proposal_period: 7 * DAY,
        bounty_bond: BASE_UNIT,
        bounty_forgiveness_period: DAY,
    }
}

impl Policy {
    /// Checks the shape of the policy
    pub fn validate(&self) -> Result<(), DaoError> {
        if self.proposal_bond < 0 || self.bounty_bond < 0 {
            return Err(DaoError::InvalidPolicy);
        }
        if !self.default_vote_policy.is_valid() {
            return Err(DaoError::InvalidPolicy);
        }
        let mut names: Vec<Symbol> = Vec::new(self.roles.env());
        for role in self.roles.iter() {
            if names.contains(&role.name) {
                return Err(DaoError::InvalidPolicy);
            }
            names.push_back(role.name.clone());
            validate_role(&role)?;
        }
        Ok(())
    }

    fn role_index(&self, name: &Symbol) -> Option<u32> {
        self.roles.iter().position(|r| r.name == *name).map(|i| i as u32)
    }

    pub fn get_role(&self, name: &Symbol) -> Option<RolePermission> {
        self.role_index(name).and_then(|i| self.roles.get(i))
    }

    pub fn add_or_update_role(&mut self, role: RolePermission) -> Result<(), DaoError> {
        validate_role(&role)?;
        match self.role_index(&role.name) {
            Some(i) => self.roles.set(i, role),
            None => self.roles.push_back(role),
        }
        Ok(())
    }

    pub fn remove_role(&mut self, name: &Symbol) -> Result<(), DaoError> {
        let i = self.role_index(name).ok_or(DaoError::RoleNotFound)?;
        self.roles.remove(i);
        Ok(())
    }

    pub fn update_default_vote_policy(&mut self, vote_policy: VotePolicy) -> Result<(), DaoError> {
        if !vote_policy.is_valid() {
            return Err(DaoError::InvalidPolicy);
        }
        self.default_vote_policy = vote_policy;
        Ok(())
    }

    pub fn update_parameters(&mut self, parameters: &PolicyParameters) -> Result<(), DaoError> {
        if let Some(bond) = parameters.proposal_bond {
            self.proposal_bond = bond;
        }
        if let Some(period) = parameters.proposal_period {
            self.proposal_period = period;
        }
        if let Some(bond) = parameters.bounty_bond {
            self.bounty_bond = bond;
        }
        if let Some(period) = parameters.bounty_forgiveness_period {
            self.bounty_forgiveness_period = period;
        }
        if self.proposal_bond < 0 || self.bounty_bond < 0 {
            return Err(DaoError::InvalidPolicy);
        }
        Ok(())
    }

    /// Fails unless `name` is a group role
    pub fn check_group_role(&self, name: &Symbol) -> Result<(), DaoError> {
        let role = self.get_role(name).ok_or(DaoError::RoleNotFound)?;
        match role.kind {
            RoleKind::Group(_) => Ok(()),
            _ => Err(DaoError::RoleWrongKind),
        }
    }

    pub fn add_member_to_role(&mut self, name: &Symbol, member: &Address) -> Result<(), DaoError> {
        let i = self.role_index(name).ok_or(DaoError::RoleNotFound)?;
        let mut role = self.roles.get(i).ok_or(DaoError::RoleNotFound)?;
        match &mut role.kind {
            RoleKind::Group(members) => {
                if !members.contains(member) {
                    members.push_back(member.clone());
                }
            }
            _ => return Err(DaoError::RoleWrongKind),
        }
        self.roles.set(i, role);
        Ok(())
    }

    pub fn remove_member_from_role(
        &mut self,
        name: &Symbol,
        member: &Address,
    ) -> Result<(), DaoError> {
        let i = self.role_index(name).ok_or(DaoError::RoleNotFound)?;
        let mut role = self.roles.get(i).ok_or(DaoError::RoleNotFound)?;
        match &mut role.kind {
            RoleKind::Group(members) => {
                if let Some(j) = members.first_index_of(member) {
                    members.remove(j);
                }
            }
            _ => return Err(DaoError::RoleWrongKind),
        }
        self.roles.set(i, role);
        Ok(())
    }

    /// Roles of `user` that allow `action` on proposals labeled `label`
    pub fn allowed_roles(
        &self,
        user: &UserInfo,
        label: ProposalLabel,
        action: Action,
    ) -> Vec<RolePermission> {
        let mut allowed = Vec::new(self.roles.env());
        for role in self.roles.iter() {
            if role.kind.matches(user) && role.allows(label, action) {
                allowed.push_back(role);
            }
        }
        allowed
    }

    pub fn can_execute_action(&self, user: &UserInfo, label: ProposalLabel, action: Action) -> bool {
        !self.allowed_roles(user, label, action).is_empty()
    }

    /// Vote policy of `role` for proposals labeled `label`
    pub fn vote_policy_for(&self, role: &RolePermission, label: ProposalLabel) -> VotePolicy {
        role.vote_policy
            .get(label)
            .unwrap_or_else(|| self.default_vote_policy.clone())
    }

    pub fn is_token_weighted(&self, role: &RolePermission, label: ProposalLabel) -> bool {
        self.vote_policy_for(role, label).weight_kind == WeightKind::TokenWeight
    }
}

fn validate_role(role: &RolePermission) -> Result<(), DaoError> {
    if let RoleKind::Member(min) = role.kind {
        if min < 0 {
            return Err(DaoError::InvalidPolicy);
        }
    }
    for (_, vote_policy) in role.vote_policy.iter() {
        if !vote_policy.is_valid() {
            return Err(DaoError::InvalidPolicy);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    fn user(account: &Address, amount: i128) -> UserInfo {
        UserInfo {
            account: account.clone(),
            amount,
        }
    }

    #[test]
    fn test_threshold_to_weight() {
        assert_eq!(Threshold::Weight(100).to_weight(1_000_000), 100);
        assert_eq!(Threshold::Weight(100).to_weight(5), 5);
        assert_eq!(Threshold::Ratio(1, 2).to_weight(2), 2);
        assert_eq!(Threshold::Ratio(1, 2).to_weight(5), 3);
        assert_eq!(Threshold::Ratio(1, 2).to_weight(1), 1);
        assert_eq!(Threshold::Ratio(1, 1).to_weight(5), 5);
        assert_eq!(Threshold::Ratio(2, 3).to_weight(9), 7);
    }

    #[test]
    fn test_default_policy_permissions() {
        let env = Env::default();
        let root = Address::generate(&env);
        let alice = Address::generate(&env);
        let policy = default_policy(&env, vec![&env, root.clone(), root.clone()]);

        assert_eq!(policy.roles.len(), 2);
        let council = policy.get_role(&symbol_short!("council")).unwrap();
        assert_eq!(council.kind, RoleKind::Group(vec![&env, root.clone()]));

        // Everyone can propose, only the council votes
        assert!(policy.can_execute_action(&user(&alice, 0), ProposalLabel::Transfer, Action::AddProposal));
        assert!(!policy.can_execute_action(&user(&alice, 0), ProposalLabel::Transfer, Action::VoteApprove));
        assert!(policy.can_execute_action(&user(&root, 0), ProposalLabel::Transfer, Action::VoteApprove));
        assert!(!policy.can_execute_action(&user(&root, 0), ProposalLabel::Transfer, Action::RemoveProposal));

        let roles = policy.allowed_roles(&user(&root, 0), ProposalLabel::Config, Action::AddProposal);
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn test_wildcard_matching() {
        let exact = Permission::exact(ProposalLabel::Config, Action::VoteApprove);
        assert!(exact.allows(ProposalLabel::Config, Action::VoteApprove));
        assert!(!exact.allows(ProposalLabel::Config, Action::VoteReject));
        assert!(!exact.allows(ProposalLabel::Policy, Action::VoteApprove));

        let any_action = Permission::new(KindScope::Kind(ProposalLabel::Vote), ActionScope::Any);
        assert!(any_action.allows(ProposalLabel::Vote, Action::Finalize));
        assert!(!any_action.allows(ProposalLabel::Call, Action::Finalize));

        let any_kind = Permission::any_kind(Action::Finalize);
        assert!(any_kind.allows(ProposalLabel::Call, Action::Finalize));
        assert!(!any_kind.allows(ProposalLabel::Call, Action::VoteApprove));

        let all = Permission::new(KindScope::Any, ActionScope::Any);
        assert!(all.allows(ProposalLabel::UpgradeSelf, Action::RemoveProposal));
    }

    #[test]
    fn test_member_role_matches_by_balance() {
        let env = Env::default();
        let holder = Address::generate(&env);
        let kind = RoleKind::Member(10);
        assert!(kind.matches(&user(&holder, 10)));
        assert!(!kind.matches(&user(&holder, 9)));
    }

    #[test]
    fn test_role_updates() {
        let env = Env::default();
        let root = Address::generate(&env);
        let bob = Address::generate(&env);
        let mut policy = default_policy(&env, vec![&env, root.clone()]);

        policy.add_member_to_role(&symbol_short!("council"), &bob).unwrap();
        policy.add_member_to_role(&symbol_short!("council"), &bob).unwrap();
        let council = policy.get_role(&symbol_short!("council")).unwrap();
        assert_eq!(council.kind, RoleKind::Group(vec![&env, root.clone(), bob.clone()]));

        policy.remove_member_from_role(&symbol_short!("council"), &root).unwrap();
        let council = policy.get_role(&symbol_short!("council")).unwrap();
        assert_eq!(council.kind, RoleKind::Group(vec![&env, bob.clone()]));

        assert_eq!(
            policy.add_member_to_role(&symbol_short!("all"), &bob),
            Err(DaoError::RoleWrongKind)
        );
        assert_eq!(
            policy.add_member_to_role(&symbol_short!("nobody"), &bob),
            Err(DaoError::RoleNotFound)
        );

        let mut community = policy.get_role(&symbol_short!("all")).unwrap();
        community.name = symbol_short!("community");
        policy.add_or_update_role(community).unwrap();
        assert_eq!(policy.roles.len(), 3);

        policy.remove_role(&symbol_short!("all")).unwrap();
        assert_eq!(policy.roles.len(), 2);
        assert_eq!(policy.remove_role(&symbol_short!("all")), Err(DaoError::RoleNotFound));
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let env = Env::default();
        let root = Address::generate(&env);

        let mut policy = default_policy(&env, vec![&env, root.clone()]);
        policy.default_vote_policy.threshold = Threshold::Ratio(1, 0);
        assert_eq!(policy.validate(), Err(DaoError::InvalidPolicy));

        let mut policy = default_policy(&env, vec![&env, root.clone()]);
        let duplicate = policy.roles.get(0).unwrap();
        policy.roles.push_back(duplicate);
        assert_eq!(policy.validate(), Err(DaoError::InvalidPolicy));

        let policy = default_policy(&env, vec![&env, root.clone()]);
        assert_eq!(policy.validate(), Ok(()));
        assert_eq!(
            VersionedPolicy::Default(vec![&env, root.clone()]).into_current(),
            Err(DaoError::InvalidPolicy)
        );
        assert_eq!(
            VersionedPolicy::Default(vec![&env, root]).resolve(&env),
            Ok(policy)
        );
    }
}
