//! Balance calculation: folds contributions and resolved expense shares into
//! per-member net positions and pool totals.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Expense, Member, Money, ResultEngine, Transaction, TransactionKind, ops::resolve_shares,
};

/// Tolerated deviation of a percentage weight sum from 100 before a
/// [`Warning::ShareSumDrift`] is recorded.
const SHARE_SUM_TOLERANCE: f64 = 0.5;

/// A member's net position, derived per call and never stored.
///
/// Positive `balance` means the group owes this member money.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member_id: Uuid,
    pub name: String,
    /// Sum of this member's contribution transactions.
    pub contributed: Money,
    /// Sum of this member's resolved shares across all expenses.
    pub owed: Money,
    /// `contributed - owed`.
    pub balance: Money,
}

impl MemberBalance {
    /// How much this member paid beyond their share (presentation-only).
    #[must_use]
    pub fn extra_paid(&self) -> Money {
        self.balance.clamp_non_negative()
    }
}

/// Pool-level totals.
///
/// `remaining` may be negative when the group overspent its pool; that is a
/// valid state and is never clamped here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub total_contributions: Money,
    pub total_expenses: Money,
    pub remaining: Money,
}

/// Non-fatal diagnostics returned alongside a balance sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// Percentage/custom weights of an expense do not sum to ~100.
    ShareSumDrift { expense_id: Uuid, sum: f64 },
    /// Expense totals and resolved shares disagree by a minor unit or more.
    ///
    /// Unreachable while split resolution stays exact; kept as a diagnostic
    /// against rounding regressions.
    RoundingDrift {
        total_expenses: Money,
        total_owed: Money,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ShareSumDrift { expense_id, sum } => {
                write!(f, "shares of expense {expense_id} sum to {sum}, not 100")
            }
            Warning::RoundingDrift {
                total_expenses,
                total_owed,
            } => write!(
                f,
                "total expenses {total_expenses} but resolved shares sum to {total_owed}"
            ),
        }
    }
}

/// The full output of a balance computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// One entry per member, in input member order.
    pub balances: Vec<MemberBalance>,
    pub pool: PoolState,
    pub warnings: Vec<Warning>,
}

/// Computes every member's net position plus pool totals.
///
/// - Only [`TransactionKind::Contribution`] transactions move `contributed`;
///   other kinds are ignored. A transaction for an id outside `members` is
///   ignored too: the caller owns the referential integrity of its snapshot.
/// - Every expense is resolved via [`resolve_shares`]; a resolver error fails
///   the whole computation rather than silently skewing the totals.
/// - Members with no activity still appear, with a zero balance. Zero members
///   is not an error: the sheet is simply empty.
pub fn compute_balances(
    members: &[Member],
    expenses: &[Expense],
    transactions: &[Transaction],
) -> ResultEngine<BalanceSheet> {
    let index: HashMap<Uuid, usize> = members
        .iter()
        .enumerate()
        .map(|(position, member)| (member.id, position))
        .collect();
    let mut contributed = vec![Money::ZERO; members.len()];
    let mut owed = vec![Money::ZERO; members.len()];
    let mut warnings = Vec::new();

    for tx in transactions {
        if tx.kind != TransactionKind::Contribution {
            continue;
        }
        if let Some(&position) = index.get(&tx.member_id) {
            contributed[position] += tx.amount;
        }
    }

    for expense in expenses {
        if let Some(warning) = share_sum_drift(expense) {
            tracing::warn!("{warning}");
            warnings.push(warning);
        }
        for (member_id, share) in resolve_shares(expense, members)? {
            if let Some(&position) = index.get(&member_id) {
                owed[position] += share;
            }
        }
    }

    let total_contributions: Money = contributed.iter().copied().sum();
    // Summed from the raw expense amounts, independently of the resolved
    // shares, so rounding drift in the resolver shows up as a diagnostic.
    let total_expenses: Money = expenses.iter().map(|e| e.amount).sum();
    let total_owed: Money = owed.iter().copied().sum();
    if total_expenses != total_owed {
        let warning = Warning::RoundingDrift {
            total_expenses,
            total_owed,
        };
        tracing::warn!("{warning}");
        warnings.push(warning);
    }

    let balances: Vec<MemberBalance> = members
        .iter()
        .enumerate()
        .map(|(position, member)| MemberBalance {
            member_id: member.id,
            name: member.name.clone(),
            contributed: contributed[position],
            owed: owed[position],
            balance: contributed[position] - owed[position],
        })
        .collect();

    let pool = PoolState {
        total_contributions,
        total_expenses,
        remaining: total_contributions - total_expenses,
    };

    tracing::debug!(
        members = members.len(),
        expenses = expenses.len(),
        total_contributions = %pool.total_contributions,
        total_expenses = %pool.total_expenses,
        "computed balance sheet"
    );

    Ok(BalanceSheet {
        balances,
        pool,
        warnings,
    })
}

fn share_sum_drift(expense: &Expense) -> Option<Warning> {
    let weights = expense.split.weights()?;
    if weights.is_empty() {
        // The resolver reports empty shares as an error; no warning needed.
        return None;
    }
    let sum: f64 = weights.values().sum();
    ((sum - 100.0).abs() > SHARE_SUM_TOLERANCE).then_some(Warning::ShareSumDrift {
        expense_id: expense.id,
        sum,
    })
}
