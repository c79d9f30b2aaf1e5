use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use splitpool::{
    Currency, EngineError, Expense, Member, Money, SettlementReport, SplitPolicy, Transaction,
    TransactionKind, compute_balances, minimize_settlements, resolve_shares,
};

fn group(names: &[&str]) -> Vec<Member> {
    names.iter().map(|n| Member::new((*n).to_string())).collect()
}

fn contribution(member: &Member, minor: i64) -> Transaction {
    Transaction::new(
        member.id,
        TransactionKind::Contribution,
        Money::new(minor),
        Utc::now(),
        None,
    )
    .unwrap()
}

fn expense(minor: i64, paid_by: &Member, split: SplitPolicy) -> Expense {
    Expense::new(
        "shared".to_string(),
        Money::new(minor),
        paid_by.id,
        split,
        Utc::now(),
    )
    .unwrap()
}

fn balance_of(sheet: &splitpool::BalanceSheet, member: &Member) -> Money {
    sheet
        .balances
        .iter()
        .find(|b| b.member_id == member.id)
        .map(|b| b.balance)
        .unwrap()
}

/// One contributor funds an equally split expense; the two
/// non-contributors each owe the contributor a third.
#[test]
fn equal_split_single_contributor_settles_in_two_transfers() {
    let members = group(&["a", "b", "c"]);
    let transactions = vec![contribution(&members[0], 30_000)];
    let expenses = vec![expense(30_000, &members[0], SplitPolicy::equal())];

    let sheet = compute_balances(&members, &expenses, &transactions).unwrap();
    assert_eq!(balance_of(&sheet, &members[0]), Money::new(20_000));
    assert_eq!(balance_of(&sheet, &members[1]), Money::new(-10_000));
    assert_eq!(balance_of(&sheet, &members[2]), Money::new(-10_000));
    assert!(sheet.warnings.is_empty());

    let settlements = minimize_settlements(&sheet.balances).unwrap();
    assert_eq!(settlements.len(), 2);
    assert!(settlements.iter().all(|s| s.to == members[0].id));
    let total: Money = settlements.iter().map(|s| s.amount).sum();
    assert_eq!(total, Money::new(20_000));
}

/// Paying an expense and contributing to the pool are independent ledgers:
/// the payer still owes their share unless a matching contribution is
/// recorded.
#[test]
fn payer_gets_no_automatic_reimbursement() {
    let members = group(&["a", "b"]);
    let shares = BTreeMap::from([(members[0].id, 70.0), (members[1].id, 30.0)]);
    let expenses = vec![expense(
        10_000,
        &members[0],
        SplitPolicy::Percentage { shares },
    )];

    let sheet = compute_balances(&members, &expenses, &[]).unwrap();
    assert_eq!(balance_of(&sheet, &members[0]), Money::new(-7_000));
    assert_eq!(balance_of(&sheet, &members[1]), Money::new(-3_000));

    // Recording the payer's outlay as a contribution restores the intuitive
    // "reimburse the payer" reading.
    let with_contribution = vec![contribution(&members[0], 10_000)];
    let sheet = compute_balances(&members, &expenses, &with_contribution).unwrap();
    assert_eq!(balance_of(&sheet, &members[0]), Money::new(3_000));
    assert_eq!(balance_of(&sheet, &members[1]), Money::new(-3_000));
}

/// Excluding every member leaves nobody to bill.
#[test]
fn excluding_every_member_is_an_invalid_split() {
    let members = group(&["a", "b"]);
    let excluded = members.iter().map(|m| m.id).collect();
    let expenses = vec![expense(100, &members[0], SplitPolicy::Equal { excluded })];

    let err = compute_balances(&members, &expenses, &[]).unwrap_err();
    assert!(matches!(err, EngineError::InvalidSplit(_)));
}

/// Weights summing to 90 are normalized (55.56% / 44.44%) and
/// flagged with a warning.
#[test]
fn drifted_percentage_sum_normalizes_with_warning() {
    let members = group(&["a", "b"]);
    let shares = BTreeMap::from([(members[0].id, 50.0), (members[1].id, 40.0)]);
    let expenses = vec![expense(
        10_000,
        &members[0],
        SplitPolicy::Percentage { shares },
    )];

    let sheet = compute_balances(&members, &expenses, &[]).unwrap();
    assert_eq!(sheet.warnings.len(), 1);
    // 100.00 * 50/90 = 55.56 after banker's rounding; the remainder of the
    // amount lands on the other member.
    assert_eq!(balance_of(&sheet, &members[0]), Money::new(-5_556));
    assert_eq!(balance_of(&sheet, &members[1]), Money::new(-4_444));
}

/// Three debtors, one creditor with an exactly matching
/// total.
#[test]
fn three_debtors_one_creditor_settle_in_three_transfers() {
    let members = group(&["a", "b", "c", "d"]);
    let transactions = vec![contribution(&members[0], 60_000)];
    let expenses = vec![expense(
        60_000,
        &members[0],
        SplitPolicy::Equal {
            excluded: [members[0].id].into_iter().collect(),
        },
    )];

    let sheet = compute_balances(&members, &expenses, &transactions).unwrap();
    let settlements = minimize_settlements(&sheet.balances).unwrap();
    assert_eq!(settlements.len(), 3);
    assert!(settlements.iter().all(|s| s.to == members[0].id));
    let total: Money = settlements.iter().map(|s| s.amount).sum();
    assert_eq!(total, Money::new(60_000));
}

/// Conservation: the balances always sum to the pool remainder.
#[test]
fn balances_sum_to_pool_remainder() {
    let members = group(&["a", "b", "c"]);
    let transactions = vec![
        contribution(&members[0], 12_345),
        contribution(&members[1], 6_789),
    ];
    let shares = BTreeMap::from([
        (members[0].id, 20.0),
        (members[1].id, 30.0),
        (members[2].id, 50.0),
    ]);
    let expenses = vec![
        expense(9_999, &members[0], SplitPolicy::equal()),
        expense(5_001, &members[1], SplitPolicy::Custom { shares }),
    ];

    let sheet = compute_balances(&members, &expenses, &transactions).unwrap();
    let total: Money = sheet.balances.iter().map(|b| b.balance).sum();
    assert_eq!(total, sheet.pool.remaining);
    assert_eq!(sheet.pool.remaining, Money::new(12_345 + 6_789 - 9_999 - 5_001));
}

/// Split exactness: resolved shares always reproduce the expense amount.
#[test]
fn resolved_shares_sum_to_expense_amount() {
    let members = group(&["a", "b", "c", "d", "e", "f", "g"]);
    let awkward_amounts = [1, 2, 99, 100, 101, 9_999, 100_003];
    for amount in awkward_amounts {
        let e = expense(amount, &members[0], SplitPolicy::equal());
        let shares = resolve_shares(&e, &members).unwrap();
        let total: Money = shares.values().copied().sum();
        assert_eq!(total, Money::new(amount), "equal split of {amount}");
        assert!(shares.values().all(|s| s.is_positive()));
    }

    let weights: BTreeMap<Uuid, f64> = members
        .iter()
        .enumerate()
        .map(|(i, m)| (m.id, 3.0 + 2.5 * i as f64))
        .collect();
    for amount in awkward_amounts {
        let e = expense(
            amount,
            &members[0],
            SplitPolicy::Percentage {
                shares: weights.clone(),
            },
        );
        let shares = resolve_shares(&e, &members).unwrap();
        let total: Money = shares.values().copied().sum();
        assert_eq!(total, Money::new(amount), "weighted split of {amount}");
        assert!(shares.values().all(|s| !s.is_negative()));
    }
}

/// Tiny amounts across larger groups sit right at the rounding boundary,
/// where banker's rounding can over-assign by several minor units; shares
/// must stay non-negative and exact there too.
#[test]
fn tiny_amounts_in_large_groups_stay_non_negative() {
    for size in [10usize, 12, 15] {
        let members: Vec<Member> = (0..size).map(|i| Member::new(format!("m{i}"))).collect();
        let weights: BTreeMap<Uuid, f64> = members
            .iter()
            .map(|m| (m.id, 100.0 / size as f64))
            .collect();
        for amount in 1..=10 {
            let e = expense(amount, &members[0], SplitPolicy::equal());
            let shares = resolve_shares(&e, &members).unwrap();
            let total: Money = shares.values().copied().sum();
            assert_eq!(total, Money::new(amount), "equal split of {amount} among {size}");
            assert!(shares.values().all(|s| s.is_positive()));

            let e = expense(
                amount,
                &members[0],
                SplitPolicy::Percentage {
                    shares: weights.clone(),
                },
            );
            let shares = resolve_shares(&e, &members).unwrap();
            let total: Money = shares.values().copied().sum();
            assert_eq!(
                total,
                Money::new(amount),
                "weighted split of {amount} among {size}"
            );
            assert!(shares.values().all(|s| s.is_positive()));
        }
    }
}

/// Determinism: identical inputs produce identical outputs end to end,
/// including rounding-residual assignment and settlement ordering.
#[test]
fn engine_is_deterministic() {
    let members = group(&["a", "b", "c", "d", "e"]);
    let transactions: Vec<Transaction> = members
        .iter()
        .enumerate()
        .map(|(i, m)| contribution(m, 1_000 * (i as i64 + 1)))
        .collect();
    let weights: BTreeMap<Uuid, f64> = members
        .iter()
        .enumerate()
        .map(|(i, m)| (m.id, 10.0 + 7.3 * i as f64))
        .collect();
    let expenses = vec![
        expense(7_777, &members[1], SplitPolicy::equal()),
        expense(
            3_333,
            &members[2],
            SplitPolicy::Custom {
                shares: weights,
            },
        ),
    ];

    let first = compute_balances(&members, &expenses, &transactions).unwrap();
    let second = compute_balances(&members, &expenses, &transactions).unwrap();
    assert_eq!(first, second);
}

/// Applying the settlements drives every balance to zero.
#[test]
fn settlements_discharge_all_balances() {
    let members = group(&["a", "b", "c", "d"]);
    let transactions = vec![
        contribution(&members[0], 40_000),
        contribution(&members[1], 8_000),
    ];
    let expenses = vec![expense(48_000, &members[0], SplitPolicy::equal())];

    let sheet = compute_balances(&members, &expenses, &transactions).unwrap();
    let settlements = minimize_settlements(&sheet.balances).unwrap();

    let mut residual: BTreeMap<Uuid, i64> = sheet
        .balances
        .iter()
        .map(|b| (b.member_id, b.balance.minor()))
        .collect();
    for s in &settlements {
        assert!(s.amount.is_positive());
        assert_ne!(s.from, s.to);
        *residual.get_mut(&s.from).unwrap() += s.amount.minor();
        *residual.get_mut(&s.to).unwrap() -= s.amount.minor();
    }
    assert!(residual.values().all(|r| *r == 0));
}

/// An unspent pool remainder cannot be settled peer-to-peer.
#[test]
fn leftover_pool_money_cannot_be_settled() {
    let members = group(&["a", "b"]);
    let transactions = vec![contribution(&members[0], 10_000)];
    let expenses = vec![expense(4_000, &members[0], SplitPolicy::equal())];

    let sheet = compute_balances(&members, &expenses, &transactions).unwrap();
    assert_eq!(sheet.pool.remaining, Money::new(6_000));
    let err = minimize_settlements(&sheet.balances).unwrap_err();
    assert!(matches!(err, EngineError::SettlementImbalance(_)));
}

/// End-to-end report: the shareable text carries totals, member details and
/// settlement lines in the group's currency.
#[test]
fn report_renders_shareable_summary() {
    let members = group(&["anita", "bela", "chirag"]);
    let transactions = vec![contribution(&members[0], 30_000)];
    let expenses = vec![expense(30_000, &members[0], SplitPolicy::equal())];

    let sheet = compute_balances(&members, &expenses, &transactions).unwrap();
    let settlements = minimize_settlements(&sheet.balances).unwrap();
    let report = SettlementReport::new(&sheet, &settlements);

    assert_eq!(report.members[0].will_get, Money::new(20_000));
    assert_eq!(report.members[1].will_get, Money::ZERO);

    let text = report.share_text(Currency::Inr);
    assert!(text.contains("Total Expenses: ₹300.00"));
    assert!(text.contains("Total Contributions: ₹300.00"));
    assert!(text.contains("anita\n• Balance: ₹200.00"));
    assert!(text.contains("→ anita: ₹100.00"));
}
