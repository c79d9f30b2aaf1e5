//! Settlement minimization: turns net balances into the transfers that zero
//! them, using greedy largest-pair matching.
//!
//! True transfer-count minimization is NP-hard; the greedy heuristic is
//! optimal for small groups, bounded at `debtors + creditors - 1` transfers,
//! and always produces a balance-zeroing set, which is the property that
//! matters operationally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, ops::MemberBalance};

/// One peer-to-peer transfer: `from` (debtor) pays `to` (creditor).
///
/// `amount` is always positive and `from != to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: Money,
}

/// Working entry of the greedy loop: a member id plus its outstanding amount.
#[derive(Clone, Copy, Debug)]
struct Outstanding {
    member_id: Uuid,
    balance: Money,
}

/// Computes the transfers that drive every balance to zero.
///
/// Balances are integer minor units, so "settled" means exactly zero; the
/// one-minor-unit tolerance of the contract is absorbed by the integer
/// representation. Input whose balances do not sum to zero cannot be settled
/// peer-to-peer (this includes an unspent or overspent pool remainder) and
/// fails with [`EngineError::SettlementImbalance`].
///
/// Determinism: ties between equal balances break on member id ascending, so
/// two calls with identical input produce the identical transfer list.
pub fn minimize_settlements(balances: &[MemberBalance]) -> ResultEngine<Vec<Settlement>> {
    let mut debtors: Vec<Outstanding> = Vec::new();
    let mut creditors: Vec<Outstanding> = Vec::new();
    for entry in balances {
        let outstanding = Outstanding {
            member_id: entry.member_id,
            balance: entry.balance,
        };
        if entry.balance.is_negative() {
            debtors.push(outstanding);
        } else if entry.balance.is_positive() {
            creditors.push(outstanding);
        }
    }

    let mut settlements = Vec::new();
    while !debtors.is_empty() && !creditors.is_empty() {
        // Largest magnitude on both sides; ties to the smaller member id.
        let debtor_pos = select(&debtors, |a, b| {
            a.balance.cmp(&b.balance).then(a.member_id.cmp(&b.member_id))
        });
        let creditor_pos = select(&creditors, |a, b| {
            b.balance.cmp(&a.balance).then(a.member_id.cmp(&b.member_id))
        });

        let transfer = Money::new(
            (-debtors[debtor_pos].balance.minor()).min(creditors[creditor_pos].balance.minor()),
        );
        settlements.push(Settlement {
            from: debtors[debtor_pos].member_id,
            to: creditors[creditor_pos].member_id,
            amount: transfer,
        });

        debtors[debtor_pos].balance += transfer;
        creditors[creditor_pos].balance -= transfer;
        if debtors[debtor_pos].balance.is_zero() {
            debtors.swap_remove(debtor_pos);
        }
        if creditors[creditor_pos].balance.is_zero() {
            creditors.swap_remove(creditor_pos);
        }
    }

    // Each pass fully discharges at least one side, so the loop terminates;
    // leftovers mean the input was not a zero-sum balance set.
    if !debtors.is_empty() || !creditors.is_empty() {
        let residue: Money = debtors
            .iter()
            .chain(creditors.iter())
            .map(|o| o.balance)
            .sum();
        return Err(EngineError::SettlementImbalance(format!(
            "balances do not sum to zero: {residue} left unpaired"
        )));
    }

    tracing::debug!(
        transfers = settlements.len(),
        "minimized settlements"
    );
    Ok(settlements)
}

/// Index of the entry ranked first by `ordering`, scanning in place instead
/// of re-sorting after every mutation.
fn select(
    entries: &[Outstanding],
    ordering: impl Fn(&Outstanding, &Outstanding) -> std::cmp::Ordering,
) -> usize {
    let mut best = 0;
    for index in 1..entries.len() {
        if ordering(&entries[index], &entries[best]) == std::cmp::Ordering::Less {
            best = index;
        }
    }
    best
}

/// Sums, per member, the settlement amounts that member receives.
///
/// This is the "will get" figure of the original bill view: it is net of how
/// the greedy pairing grouped debtors and creditors, not `max(balance, 0)`.
#[must_use]
pub fn receivable_totals(settlements: &[Settlement]) -> BTreeMap<Uuid, Money> {
    let mut totals: BTreeMap<Uuid, Money> = BTreeMap::new();
    for settlement in settlements {
        *totals.entry(settlement.to).or_insert(Money::ZERO) += settlement.amount;
    }
    totals
}
