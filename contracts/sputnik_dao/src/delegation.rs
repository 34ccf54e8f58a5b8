//! Delegation ledger fed by the staking contract
//!
//! Balances are only changed by the staking contract set through a
//! `SetStakingContract` proposal. The sum of all balances always equals the
//! total supply.

use soroban_sdk::{Address, Env};

use crate::error::DaoError;
use crate::events;
use crate::storage;

/// Delegated balance of `account`, zero when not registered
pub fn balance_of(env: &Env, account: &Address) -> i128 {
    storage::get_delegation(env, account).unwrap_or(0)
}

pub fn total_supply(env: &Env) -> i128 {
    storage::get_total_delegation(env)
}

/// Authenticates `caller` as the staking contract
fn require_staking(env: &Env, caller: &Address) -> Result<(), DaoError> {
    let staking_id = storage::get_staking_id(env).ok_or(DaoError::NoStaking)?;
    caller.require_auth();
    if *caller != staking_id {
        return Err(DaoError::InvalidCaller);
    }
    Ok(())
}

/// Starts tracking `account` with a zero balance. An existing balance is kept.
pub fn register(env: &Env, caller: &Address, account: &Address) -> Result<(), DaoError> {
    require_staking(env, caller)?;
    if storage::get_delegation(env, account).is_none() {
        storage::set_delegation(env, account, 0);
    }
    Ok(())
}

/// Adds `amount` to the balance of `account`.
///
/// Returns the previous balance, the new balance and the new total supply.
pub fn delegate(
    env: &Env,
    caller: &Address,
    account: &Address,
    amount: i128,
) -> Result<(i128, i128, i128), DaoError> {
    require_staking(env, caller)?;
    if amount < 0 {
        return Err(DaoError::InvalidAmount);
    }
    let prev = storage::get_delegation(env, account).ok_or(DaoError::NotRegistered)?;
    let new = prev.checked_add(amount).ok_or(DaoError::InvalidAmount)?;
    let total = total_supply(env)
        .checked_add(amount)
        .ok_or(DaoError::InvalidAmount)?;

    storage::set_delegation(env, account, new);
    storage::set_total_delegation(env, total);
    events::emit_delegated(env, account, amount, new, total);
    Ok((prev, new, total))
}

/// Removes `amount` from the balance of `account`.
///
/// Returns the previous balance, the new balance and the new total supply.
pub fn undelegate(
    env: &Env,
    caller: &Address,
    account: &Address,
    amount: i128,
) -> Result<(i128, i128, i128), DaoError> {
    require_staking(env, caller)?;
    if amount < 0 {
        return Err(DaoError::InvalidAmount);
    }
    let prev = storage::get_delegation(env, account).ok_or(DaoError::NotRegistered)?;
    if amount > prev {
        return Err(DaoError::InvalidStakingContract);
    }
    let new = prev - amount;
    let total = total_supply(env) - amount;

    storage::set_delegation(env, account, new);
    storage::set_total_delegation(env, total);
    events::emit_undelegated(env, account, amount, new, total);
    Ok((prev, new, total))
}
