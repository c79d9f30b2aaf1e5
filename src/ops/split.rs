//! Split resolution: one expense in, one owed share per member out.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::{EngineError, Expense, Member, Money, ResultEngine, SplitPolicy};

/// Resolves an expense into owed shares, keyed by member id.
///
/// The result covers exactly the members with a non-zero share; shares are
/// non-negative and sum exactly to `expense.amount`. Rounding is banker's
/// (ties-to-even) to the minor unit, with the leftover minor units folded
/// back one unit at a time in member-id order, so resolution is
/// byte-identical across runs for identical inputs.
pub fn resolve_shares(
    expense: &Expense,
    members: &[Member],
) -> ResultEngine<BTreeMap<Uuid, Money>> {
    match &expense.split {
        SplitPolicy::Equal { excluded } => resolve_equal(expense, members, excluded),
        SplitPolicy::Percentage { shares } | SplitPolicy::Custom { shares } => {
            resolve_weighted(expense, members, shares)
        }
    }
}

fn resolve_equal(
    expense: &Expense,
    members: &[Member],
    excluded: &BTreeSet<Uuid>,
) -> ResultEngine<BTreeMap<Uuid, Money>> {
    // BTreeSet gives id order; unknown ids in `excluded` simply match nothing.
    let eligible: BTreeSet<Uuid> = members
        .iter()
        .map(|m| m.id)
        .filter(|id| !excluded.contains(id))
        .collect();
    if eligible.is_empty() {
        return Err(EngineError::InvalidSplit(format!(
            "expense '{}' excludes every member",
            expense.description
        )));
    }

    let count = eligible.len() as i64;
    let base = div_ties_even(expense.amount.minor(), count);
    let residual = expense.amount.minor() - base * count;

    let mut shares: BTreeMap<Uuid, i64> = eligible.iter().map(|id| (*id, base)).collect();
    assign_residual(&mut shares, residual);

    Ok(collect_non_zero(shares))
}

fn resolve_weighted(
    expense: &Expense,
    members: &[Member],
    weights: &BTreeMap<Uuid, f64>,
) -> ResultEngine<BTreeMap<Uuid, Money>> {
    if weights.is_empty() {
        return Err(EngineError::InvalidSplit(format!(
            "expense '{}' has no split shares",
            expense.description
        )));
    }

    let member_ids: BTreeSet<Uuid> = members.iter().map(|m| m.id).collect();
    for (member_id, weight) in weights {
        if !member_ids.contains(member_id) {
            // A weight with no member to carry it would silently lose money.
            return Err(EngineError::InvalidSplit(format!(
                "expense '{}' assigns a share to unknown member {member_id}",
                expense.description
            )));
        }
        if !weight.is_finite() || *weight < 0.0 {
            return Err(EngineError::InvalidSplit(format!(
                "expense '{}' has an invalid share for member {member_id}: {weight}",
                expense.description
            )));
        }
    }

    // Normalize by the actual sum instead of assuming 100, tolerating entry
    // drift. A sum far from 100 is the caller's warning, not an error here.
    let total: f64 = weights.values().sum();
    if total <= 0.0 {
        return Err(EngineError::InvalidSplit(format!(
            "expense '{}' has shares summing to zero",
            expense.description
        )));
    }

    let amount = expense.amount.minor();
    let mut shares: BTreeMap<Uuid, i64> = BTreeMap::new();
    let mut assigned: i64 = 0;
    for (member_id, weight) in weights {
        let raw = amount as f64 * (weight / total);
        let rounded = raw.round_ties_even() as i64;
        assigned += rounded;
        shares.insert(*member_id, rounded);
    }

    assign_residual(&mut shares, amount - assigned);

    Ok(collect_non_zero(shares))
}

/// Banker's rounding of `amount / count` in exact integer arithmetic.
///
/// `amount >= 0`, `count > 0`.
fn div_ties_even(amount: i64, count: i64) -> i64 {
    let quotient = amount / count;
    let remainder = amount % count;
    match (remainder * 2).cmp(&count) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => {
            if quotient % 2 == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
    }
}

/// Folds the rounding leftover back into the shares, one minor unit at a
/// time in id order, so no share ever drops below zero.
///
/// A positive leftover goes to members already carrying a share (every
/// member only when nothing rounded above zero), so a zero-weight member
/// never gains one. A negative leftover skips shares that are already zero;
/// the rounded shares always hold at least `|residual|` units, since they
/// sum to the amount minus the (negative) residual.
fn assign_residual(shares: &mut BTreeMap<Uuid, i64>, residual: i64) {
    if residual == 0 || shares.is_empty() {
        return;
    }

    let ids: Vec<Uuid> = shares.keys().copied().collect();
    if residual > 0 {
        let carriers: Vec<Uuid> = ids
            .iter()
            .copied()
            .filter(|id| shares.get(id).is_some_and(|share| *share > 0))
            .collect();
        let targets = if carriers.is_empty() { ids } else { carriers };
        let mut remaining = residual;
        let mut index = 0;
        while remaining > 0 {
            if let Some(share) = shares.get_mut(&targets[index % targets.len()]) {
                *share += 1;
                remaining -= 1;
            }
            index += 1;
        }
    } else {
        let mut remaining = residual;
        let mut index = 0;
        while remaining < 0 {
            let id = ids[index % ids.len()];
            if let Some(share) = shares.get_mut(&id)
                && *share > 0
            {
                *share -= 1;
                remaining += 1;
            }
            index += 1;
        }
    }
}

fn collect_non_zero(shares: BTreeMap<Uuid, i64>) -> BTreeMap<Uuid, Money> {
    shares
        .into_iter()
        .filter(|(_, share)| *share != 0)
        .map(|(id, share)| (id, Money::new(share)))
        .collect()
}
