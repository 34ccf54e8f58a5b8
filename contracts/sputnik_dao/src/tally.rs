//! Vote tally: ballots per role and status evaluation

use soroban_sdk::{Address, Env, Map, Vec};

use crate::policy::{Policy, RoleKind, RolePermission, WeightKind};
use crate::types::{Ballot, Proposal, ProposalStatus, Vote};

/// Whether the voting period of `proposal` is over at `now`
pub fn is_expired(policy: &Policy, proposal: &Proposal, now: u64) -> bool {
    proposal.submission_time.saturating_add(policy.proposal_period) < now
}

/// Records the ballot of `voter` in each of `roles`.
///
/// A previous ballot of the same voter is taken out first, so counts always
/// reflect the latest choice only.
pub fn record_vote(
    env: &Env,
    policy: &Policy,
    proposal: &mut Proposal,
    voter: &Address,
    vote: Vote,
    roles: &Vec<RolePermission>,
    balance: i128,
) {
    if let Some(previous) = proposal.votes.get(voter.clone()) {
        for (role, weight) in previous.weights.iter() {
            let mut counts = proposal.vote_counts.get(role.clone()).unwrap_or_default();
            counts.add(previous.vote, -weight);
            proposal.vote_counts.set(role, counts);
        }
    }

    let label = proposal.kind.label();
    let mut weights = Map::new(env);
    for role in roles.iter() {
        let amount = if policy.is_token_weighted(&role, label) {
            balance
        } else {
            1
        };
        let mut counts = proposal.vote_counts.get(role.name.clone()).unwrap_or_default();
        counts.add(vote, amount);
        proposal.vote_counts.set(role.name.clone(), counts);
        weights.set(role.name.clone(), amount);
    }
    proposal.votes.set(voter.clone(), Ballot { vote, weights });
}

/// Computes the status of `proposal` from its current counts.
///
/// Every role is evaluated. A rejecting role wins over a removing role, which
/// wins over an approving role. When no role decides, the stored status is
/// kept.
pub fn evaluate(policy: &Policy, proposal: &Proposal, total_supply: i128, now: u64) -> ProposalStatus {
    if is_expired(policy, proposal, now) {
        return ProposalStatus::Expired;
    }

    let mut removed = false;
    let mut approved = false;
    for role in policy.roles.iter() {
        match decide(policy, &role, proposal, total_supply) {
            Some(Vote::Reject) => return ProposalStatus::Rejected,
            Some(Vote::Remove) => removed = true,
            Some(Vote::Approve) => approved = true,
            None => {}
        }
    }

    if removed {
        ProposalStatus::Removed
    } else if approved {
        ProposalStatus::Approved
    } else {
        proposal.status
    }
}

/// Total weight a role votes against, `None` for roles without a size
fn role_total(role: &RolePermission, weight_kind: WeightKind, total_supply: i128) -> Option<i128> {
    match &role.kind {
        RoleKind::Everyone => None,
        RoleKind::Group(members) => match weight_kind {
            WeightKind::RoleWeight => Some(members.len() as i128),
            WeightKind::TokenWeight => Some(total_supply),
        },
        RoleKind::Member(_) => Some(total_supply),
    }
}

fn decide(policy: &Policy, role: &RolePermission, proposal: &Proposal, total_supply: i128) -> Option<Vote> {
    let vote_policy = policy.vote_policy_for(role, proposal.kind.label());
    let total = role_total(role, vote_policy.weight_kind, total_supply)?;
    if total <= 0 {
        return None;
    }

    let counts = proposal.vote_counts.get(role.name.clone()).unwrap_or_default();
    if counts.total() < vote_policy.quorum {
        return None;
    }

    let needed = vote_policy.threshold.to_weight(total);
    [Vote::Reject, Vote::Remove, Vote::Approve]
        .into_iter()
        .find(|vote| {
            let weight = counts.get(*vote);
            weight > 0 && weight >= needed
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{default_policy, Threshold, VotePolicy};
    use crate::types::{Action, ProposalKind, VoteCounts};
    use soroban_sdk::{symbol_short, testutils::Address as _, vec, String};

    fn proposal(env: &Env, proposer: &Address) -> Proposal {
        Proposal {
            id: 0,
            proposer: proposer.clone(),
            description: String::from_str(env, "test"),
            kind: ProposalKind::Vote,
            status: ProposalStatus::InProgress,
            vote_counts: Map::new(env),
            votes: Map::new(env),
            submission_time: 100,
            bond: 0,
        }
    }

    fn council_roles(env: &Env, policy: &Policy) -> Vec<RolePermission> {
        vec![env, policy.get_role(&symbol_short!("council")).unwrap()]
    }

    #[test]
    fn test_revote_replaces_previous_ballot() {
        let env = Env::default();
        let (a, b, c) = (Address::generate(&env), Address::generate(&env), Address::generate(&env));
        let policy = default_policy(&env, vec![&env, a.clone(), b.clone(), c.clone()]);
        let roles = council_roles(&env, &policy);
        let mut p = proposal(&env, &a);

        record_vote(&env, &policy, &mut p, &a, Vote::Approve, &roles, 0);
        record_vote(&env, &policy, &mut p, &a, Vote::Approve, &roles, 0);
        record_vote(&env, &policy, &mut p, &a, Vote::Reject, &roles, 0);

        let counts = p.vote_counts.get(symbol_short!("council")).unwrap();
        assert_eq!(counts, VoteCounts { approve: 0, reject: 1, remove: 0 });
        assert_eq!(p.votes.len(), 1);
        assert_eq!(evaluate(&policy, &p, 0, 100), ProposalStatus::InProgress);

        record_vote(&env, &policy, &mut p, &b, Vote::Reject, &roles, 0);
        assert_eq!(evaluate(&policy, &p, 0, 100), ProposalStatus::Rejected);
    }

    #[test]
    fn test_strict_majority_of_group() {
        let env = Env::default();
        let (a, b) = (Address::generate(&env), Address::generate(&env));
        let policy = default_policy(&env, vec![&env, a.clone(), b.clone()]);
        let roles = council_roles(&env, &policy);
        let mut p = proposal(&env, &a);

        // Half of a two member council is not enough
        record_vote(&env, &policy, &mut p, &a, Vote::Approve, &roles, 0);
        assert_eq!(evaluate(&policy, &p, 0, 100), ProposalStatus::InProgress);

        record_vote(&env, &policy, &mut p, &b, Vote::Approve, &roles, 0);
        assert_eq!(evaluate(&policy, &p, 0, 100), ProposalStatus::Approved);
    }

    #[test]
    fn test_reject_dominates_across_roles() {
        let env = Env::default();
        let (a, b) = (Address::generate(&env), Address::generate(&env));
        let mut policy = default_policy(&env, vec![&env, a.clone()]);
        let mut second = policy.get_role(&symbol_short!("council")).unwrap();
        second.name = symbol_short!("second");
        second.kind = RoleKind::Group(vec![&env, b.clone()]);
        policy.add_or_update_role(second.clone()).unwrap();

        let mut p = proposal(&env, &a);
        record_vote(&env, &policy, &mut p, &a, Vote::Approve, &council_roles(&env, &policy), 0);
        record_vote(&env, &policy, &mut p, &b, Vote::Reject, &vec![&env, second], 0);

        assert_eq!(evaluate(&policy, &p, 0, 100), ProposalStatus::Rejected);
    }

    #[test]
    fn test_quorum_keeps_role_undecided() {
        let env = Env::default();
        let a = Address::generate(&env);
        let mut policy = default_policy(&env, vec![&env, a.clone()]);
        policy.default_vote_policy = VotePolicy {
            quorum: 2,
            ..VotePolicy::default()
        };
        let mut p = proposal(&env, &a);
        record_vote(&env, &policy, &mut p, &a, Vote::Approve, &council_roles(&env, &policy), 0);

        assert_eq!(evaluate(&policy, &p, 0, 100), ProposalStatus::InProgress);
    }

    #[test]
    fn test_token_weight_uses_delegated_balance() {
        let env = Env::default();
        let (a, b) = (Address::generate(&env), Address::generate(&env));
        let mut policy = default_policy(&env, vec![&env, a.clone(), b.clone()]);
        policy.default_vote_policy = VotePolicy {
            weight_kind: WeightKind::TokenWeight,
            quorum: 0,
            threshold: Threshold::Ratio(1, 2),
        };
        let roles = council_roles(&env, &policy);
        let mut p = proposal(&env, &a);

        record_vote(&env, &policy, &mut p, &a, Vote::Approve, &roles, 50);
        assert_eq!(evaluate(&policy, &p, 100, 100), ProposalStatus::InProgress);

        record_vote(&env, &policy, &mut p, &b, Vote::Approve, &roles, 1);
        assert_eq!(evaluate(&policy, &p, 100, 100), ProposalStatus::Approved);

        // No supply, no decision
        assert_eq!(evaluate(&policy, &p, 0, 100), ProposalStatus::InProgress);
    }

    #[test]
    fn test_expiry() {
        let env = Env::default();
        let a = Address::generate(&env);
        let policy = default_policy(&env, vec![&env, a.clone()]);
        let p = proposal(&env, &a);

        let end = 100 + policy.proposal_period;
        assert!(!is_expired(&policy, &p, end));
        assert!(is_expired(&policy, &p, end + 1));
        assert_eq!(evaluate(&policy, &p, 0, end + 1), ProposalStatus::Expired);
    }

    #[test]
    fn test_everyone_role_never_decides() {
        let env = Env::default();
        let (a, b) = (Address::generate(&env), Address::generate(&env));
        let policy = default_policy(&env, vec![&env, a.clone()]);
        let everyone = policy.get_role(&symbol_short!("all")).unwrap();
        let mut p = proposal(&env, &a);

        assert!(!everyone.allows(crate::types::ProposalLabel::Vote, Action::VoteApprove));
        record_vote(&env, &policy, &mut p, &b, Vote::Approve, &vec![&env, everyone], 0);
        assert_eq!(evaluate(&policy, &p, 0, 100), ProposalStatus::InProgress);
    }
}
