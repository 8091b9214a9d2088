//! Greedy debt-simplification engine
//!
//! Consumes a snapshot of member balances for one organization and produces
//! the ordered set of debtor to creditor obligations that would zero out
//! those balances, subject to a minimum settlement threshold.
//!
//! # Invariants
//!
//! - The engine never mutates a balance. It only reads the snapshot and
//!   proposes bills; balances move when a bill settles.
//! - The same snapshot always produces the same ordered bill set.
//! - Every proposed amount is at least the threshold, and the signed sum of
//!   proposed bills equals the value actually matched (conservation).

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, info};

use core_kernel::{Amount, SettlementPeriod, UserId};

use crate::error::NettingError;

/// Default settlement threshold: 500 minor units
pub const DEFAULT_THRESHOLD_MINOR: i64 = 500;

/// One member's balance within the organization being netted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// The member
    pub user_id: UserId,
    /// Signed balance: positive means the organization owes this member
    pub balance: Amount,
}

impl MemberBalance {
    pub fn new(user_id: UserId, balance: Amount) -> Self {
        Self { user_id, balance }
    }
}

/// A directed obligation proposed by a netting run
///
/// Proposals are pure data; persisting them as bills is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedBill {
    /// Member who owes
    pub debtor_id: UserId,
    /// Member who is owed
    pub creditor_id: UserId,
    /// Obligation amount, always positive and at least the threshold
    pub amount: Amount,
    /// Settlement period the proposal belongs to
    pub period: SettlementPeriod,
}

/// Netting run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NettingConfig {
    /// Minimum magnitude a balance must reach to participate in a run.
    /// Smaller balances roll forward to the next period untouched.
    pub threshold: Amount,
}

impl NettingConfig {
    /// Creates a configuration with a validated threshold
    pub fn new(threshold: Amount) -> Result<Self, NettingError> {
        if !threshold.is_positive() {
            return Err(NettingError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }
}

impl Default for NettingConfig {
    fn default() -> Self {
        Self {
            threshold: Amount::from_minor(DEFAULT_THRESHOLD_MINOR),
        }
    }
}

/// A party still holding unmatched value during a run
#[derive(Debug, Clone, Copy)]
struct OpenParty {
    user_id: UserId,
    /// Remaining unmatched magnitude, always positive
    remaining: Amount,
}

/// Runs one greedy netting pass over a balance snapshot
///
/// Repeatedly pairs the largest remaining debtor with the largest remaining
/// creditor, emitting one bill per pairing, until either side's largest
/// remaining magnitude drops below the threshold. Ties in magnitude are
/// broken by ascending user id so the output is reproducible.
///
/// The snapshot is usually zero-sum (every rental debits one member and
/// credits another by the same amount), but the engine does not require it:
/// an unbalanced snapshot simply leaves an unmatched remainder unbilled.
///
/// # Errors
///
/// Returns an error if a member appears twice in the snapshot.
pub fn net_balances(
    balances: &[MemberBalance],
    period: SettlementPeriod,
    config: &NettingConfig,
) -> Result<Vec<ProposedBill>, NettingError> {
    let mut seen = HashSet::with_capacity(balances.len());
    for member in balances {
        if !seen.insert(member.user_id) {
            return Err(NettingError::DuplicateMember(member.user_id));
        }
    }

    let mut debtors: Vec<OpenParty> = balances
        .iter()
        .filter(|m| m.balance.is_negative())
        .map(|m| OpenParty {
            user_id: m.user_id,
            remaining: m.balance.abs(),
        })
        .collect();
    let mut creditors: Vec<OpenParty> = balances
        .iter()
        .filter(|m| m.balance.is_positive())
        .map(|m| OpenParty {
            user_id: m.user_id,
            remaining: m.balance,
        })
        .collect();

    let mut bills = Vec::new();

    loop {
        let Some(debtor_idx) = largest(&debtors, config.threshold) else {
            break;
        };
        let Some(creditor_idx) = largest(&creditors, config.threshold) else {
            break;
        };

        let amount = debtors[debtor_idx]
            .remaining
            .min(creditors[creditor_idx].remaining);

        let bill = ProposedBill {
            debtor_id: debtors[debtor_idx].user_id,
            creditor_id: creditors[creditor_idx].user_id,
            amount,
            period,
        };
        debug!(
            debtor = %bill.debtor_id,
            creditor = %bill.creditor_id,
            amount = bill.amount.minor(),
            "netting pairing"
        );
        bills.push(bill);

        debtors[debtor_idx].remaining -= amount;
        creditors[creditor_idx].remaining -= amount;
        if debtors[debtor_idx].remaining.is_zero() {
            debtors.swap_remove(debtor_idx);
        }
        if creditors[creditor_idx].remaining.is_zero() {
            creditors.swap_remove(creditor_idx);
        }
    }

    info!(
        period = %period,
        members = balances.len(),
        bills = bills.len(),
        "netting run complete"
    );
    Ok(bills)
}

/// Index of the party with the largest remaining magnitude at or above the
/// threshold, ties broken by ascending user id. None if no party qualifies.
fn largest(parties: &[OpenParty], threshold: Amount) -> Option<usize> {
    parties
        .iter()
        .enumerate()
        .filter(|(_, p)| p.remaining >= threshold)
        .max_by_key(|(_, p)| (p.remaining, Reverse(p.user_id)))
        .map(|(idx, _)| idx)
}
