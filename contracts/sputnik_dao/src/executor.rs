//! Action executor for approved proposals with external effects
//!
//! An approved action goes through three steps. `dispatch` records the
//! outbound calls under the proposal id, `perform` issues them in order and
//! `settle` clears the record. The caller routes the outcome back into the
//! proposal. A failing call never aborts the invocation: it ends the chain
//! and is reported as `Outcome::Failure`.

use soroban_sdk::{contracttype, Address, BytesN, Env, IntoVal, String, Symbol, Val, Vec};

use crate::error::DaoError;
use crate::events;
use crate::storage;

/// One outbound call of an approved proposal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OutboundCall {
    /// Invoke (contract, function, args)
    Invoke(Address, Symbol, Vec<Val>),
    /// Pay (token, receiver, amount) from the DAO, notifying the receiver
    /// through `on_token_transfer` when a message is given
    Payout(Address, Address, i128, Option<String>),
    /// Replace the code of this contract
    UpgradeSelf(BytesN<32>),
}

/// Outbound calls of a proposal that has not settled yet
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingAction {
    pub proposal_id: u64,
    pub calls: Vec<OutboundCall>,
    pub dispatched_at: u64,
}

/// Result of performing a pending action
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Success,
    /// Call at `call_index` failed, later calls were not issued
    Failure { call_index: u32 },
}

/// Records `calls` as the pending action of `proposal_id`
///
/// # Errors
/// * `ActionPending` - An action for this proposal has not settled yet
pub fn dispatch(env: &Env, proposal_id: u64, calls: Vec<OutboundCall>) -> Result<PendingAction, DaoError> {
    if storage::get_pending(env, proposal_id).is_some() {
        return Err(DaoError::ActionPending);
    }
    let pending = PendingAction {
        proposal_id,
        calls,
        dispatched_at: env.ledger().timestamp(),
    };
    storage::set_pending(env, &pending);
    events::emit_action_dispatched(env, proposal_id, pending.calls.len());
    Ok(pending)
}

/// Issues the calls of `pending` in order, stopping at the first failure
pub fn perform(env: &Env, pending: &PendingAction) -> Outcome {
    for (index, call) in pending.calls.iter().enumerate() {
        let ok = match call {
            OutboundCall::Invoke(contract, function, args) => try_call(env, &contract, &function, args),
            OutboundCall::Payout(token, receiver, amount, msg) => payout(env, &token, &receiver, amount, msg),
            OutboundCall::UpgradeSelf(wasm_hash) => {
                env.deployer().update_current_contract_wasm(wasm_hash);
                true
            }
        };
        if !ok {
            return Outcome::Failure {
                call_index: index as u32,
            };
        }
    }
    Outcome::Success
}

/// Clears the pending action of `pending.proposal_id`
pub fn settle(env: &Env, pending: &PendingAction, outcome: Outcome) {
    storage::remove_pending(env, pending.proposal_id);
    let failed_call = match outcome {
        Outcome::Success => None,
        Outcome::Failure { call_index } => Some(call_index),
    };
    events::emit_action_settled(env, pending.proposal_id, failed_call);
}

fn try_call(env: &Env, contract: &Address, function: &Symbol, args: Vec<Val>) -> bool {
    matches!(
        env.try_invoke_contract::<Val, soroban_sdk::Error>(contract, function, args),
        Ok(Ok(_))
    )
}

/// Transfers from the DAO, then notifies the receiver if `msg` is set.
///
/// Only the transfer decides the result. A failed notification cannot undo
/// the transfer, and a retry must not pay twice.
fn payout(env: &Env, token: &Address, receiver: &Address, amount: i128, msg: Option<String>) -> bool {
    let dao = env.current_contract_address();
    let transfer_args: Vec<Val> = (dao.clone(), receiver.clone(), amount).into_val(env);
    if !try_call(env, token, &Symbol::new(env, "transfer"), transfer_args) {
        return false;
    }
    if let Some(msg) = msg {
        let notify_args: Vec<Val> = (dao, token.clone(), amount, msg).into_val(env);
        try_call(env, receiver, &Symbol::new(env, "on_token_transfer"), notify_args);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SputnikDao;
    use soroban_sdk::vec;

    #[test]
    fn test_dispatch_records_until_settled() {
        let env = Env::default();
        let contract_id = env.register(SputnikDao, ());
        let wasm_hash = BytesN::from_array(&env, &[1u8; 32]);

        env.as_contract(&contract_id, || {
            let calls = vec![&env, OutboundCall::UpgradeSelf(wasm_hash.clone())];
            let pending = dispatch(&env, 3, calls.clone()).unwrap();
            assert_eq!(pending.calls, calls);
            assert_eq!(storage::get_pending(&env, 3), Some(pending.clone()));

            assert_eq!(dispatch(&env, 3, calls), Err(DaoError::ActionPending));

            settle(&env, &pending, Outcome::Failure { call_index: 0 });
            assert_eq!(storage::get_pending(&env, 3), None);
        });
    }
}
