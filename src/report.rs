//! Shareable settlement summary.
//!
//! Combines a balance sheet and a settlement list into the text the host
//! application shares with the group ("who owes whom"), formatted with the
//! group's currency convention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, Money,
    ops::{BalanceSheet, Settlement, receivable_totals},
};

/// Fallback shown when a settlement references an id missing from the sheet.
const UNKNOWN_MEMBER: &str = "Unknown";

/// One member's line in the summary, with the presentation-only figures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLine {
    pub member_id: Uuid,
    pub name: String,
    pub balance: Money,
    /// `max(balance, 0)`: what this member paid beyond their share.
    pub extra_paid: Money,
    /// What this member receives across the settlement set. Net of how the
    /// minimizer paired debtors and creditors, so it is derived from the
    /// settlements rather than from the balance.
    pub will_get: Money,
}

/// A rendered view over one balance computation and its settlements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub total_contributions: Money,
    pub total_expenses: Money,
    pub remaining: Money,
    pub members: Vec<MemberLine>,
    pub settlements: Vec<Settlement>,
}

impl SettlementReport {
    /// Builds the report from engine output. Member order follows the sheet.
    #[must_use]
    pub fn new(sheet: &BalanceSheet, settlements: &[Settlement]) -> Self {
        let receivable = receivable_totals(settlements);
        let members = sheet
            .balances
            .iter()
            .map(|entry| MemberLine {
                member_id: entry.member_id,
                name: entry.name.clone(),
                balance: entry.balance,
                extra_paid: entry.extra_paid(),
                will_get: receivable
                    .get(&entry.member_id)
                    .copied()
                    .unwrap_or(Money::ZERO),
            })
            .collect();

        Self {
            total_contributions: sheet.pool.total_contributions,
            total_expenses: sheet.pool.total_expenses,
            remaining: sheet.pool.remaining,
            members,
            settlements: settlements.to_vec(),
        }
    }

    /// Renders the shareable summary text.
    ///
    /// Layout follows the original bill view: group totals, then per-member
    /// details (zero extra-paid/will-get lines are omitted), then one
    /// `<from> → <to>: <amount>` line per settlement.
    #[must_use]
    pub fn share_text(&self, currency: Currency) -> String {
        let names: BTreeMap<Uuid, &str> = self
            .members
            .iter()
            .map(|line| (line.member_id, line.name.as_str()))
            .collect();
        let name_of =
            |id: &Uuid| -> &str { names.get(id).copied().unwrap_or(UNKNOWN_MEMBER) };

        let mut text = String::from("Expense Settlement Summary\n\n");
        text.push_str("Group Total:\n");
        text.push_str(&format!(
            "Total Expenses: {}\n",
            self.total_expenses.format(currency)
        ));
        text.push_str(&format!(
            "Total Contributions: {}\n\n",
            self.total_contributions.format(currency)
        ));

        text.push_str("Member Details:\n");
        let details: Vec<String> = self
            .members
            .iter()
            .map(|line| {
                let mut block = format!(
                    "{}\n• Balance: {}",
                    line.name,
                    line.balance.format(currency)
                );
                if !line.extra_paid.is_zero() {
                    block.push_str(&format!(
                        "\n• Extra Paid: {}",
                        line.extra_paid.format(currency)
                    ));
                }
                if !line.will_get.is_zero() {
                    block.push_str(&format!(
                        "\n• Will Get: {}",
                        line.will_get.format(currency)
                    ));
                }
                block
            })
            .collect();
        text.push_str(&details.join("\n\n"));

        text.push_str("\n\nSettlements Required:\n");
        let lines: Vec<String> = self
            .settlements
            .iter()
            .map(|s| {
                format!(
                    "{} → {}: {}",
                    name_of(&s.from),
                    name_of(&s.to),
                    s.amount.format(currency)
                )
            })
            .collect();
        text.push_str(&lines.join("\n"));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{MemberBalance, PoolState};

    fn sheet_for(balances: Vec<MemberBalance>) -> BalanceSheet {
        let total_contributions: Money = balances.iter().map(|b| b.contributed).sum();
        let total_expenses: Money = balances.iter().map(|b| b.owed).sum();
        BalanceSheet {
            balances,
            pool: PoolState {
                total_contributions,
                total_expenses,
                remaining: total_contributions - total_expenses,
            },
            warnings: Vec::new(),
        }
    }

    fn member_balance(name: &str, contributed: i64, owed: i64) -> MemberBalance {
        MemberBalance {
            member_id: Uuid::new_v4(),
            name: name.to_string(),
            contributed: Money::new(contributed),
            owed: Money::new(owed),
            balance: Money::new(contributed - owed),
        }
    }

    #[test]
    fn will_get_follows_settlements_not_balance() {
        let creditor = member_balance("anita", 30_000, 10_000);
        let debtor = member_balance("bela", 0, 10_000);
        let other = member_balance("chirag", 0, 10_000);
        let settlements = vec![
            Settlement {
                from: debtor.member_id,
                to: creditor.member_id,
                amount: Money::new(10_000),
            },
            Settlement {
                from: other.member_id,
                to: creditor.member_id,
                amount: Money::new(10_000),
            },
        ];
        let report =
            SettlementReport::new(&sheet_for(vec![creditor, debtor, other]), &settlements);
        assert_eq!(report.members[0].will_get, Money::new(20_000));
        assert_eq!(report.members[0].extra_paid, Money::new(20_000));
        assert_eq!(report.members[1].will_get, Money::ZERO);
    }

    #[test]
    fn share_text_matches_bill_layout() {
        let creditor = member_balance("anita", 20_000, 10_000);
        let debtor = member_balance("bela", 0, 10_000);
        let settlements = vec![Settlement {
            from: debtor.member_id,
            to: creditor.member_id,
            amount: Money::new(10_000),
        }];
        let report = SettlementReport::new(&sheet_for(vec![creditor, debtor]), &settlements);
        let text = report.share_text(Currency::Inr);

        assert!(text.starts_with("Expense Settlement Summary\n"));
        assert!(text.contains("Total Expenses: ₹200.00"));
        assert!(text.contains("Total Contributions: ₹200.00"));
        assert!(text.contains("anita\n• Balance: ₹100.00\n• Extra Paid: ₹100.00\n• Will Get: ₹100.00"));
        // Zero figures are omitted from a member's block.
        assert!(text.contains("bela\n• Balance: ₹-100.00\n\n"));
        assert!(text.ends_with("bela → anita: ₹100.00"));
    }

    #[test]
    fn unknown_settlement_party_renders_as_unknown() {
        let creditor = member_balance("anita", 100, 0);
        let settlements = vec![Settlement {
            from: Uuid::new_v4(),
            to: creditor.member_id,
            amount: Money::new(100),
        }];
        let report = SettlementReport::new(&sheet_for(vec![creditor]), &settlements);
        let text = report.share_text(Currency::Inr);
        assert!(text.contains("Unknown → anita: ₹1.00"));
    }
}
