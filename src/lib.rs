//! Balance and settlement engine for shared-expense pools.
//!
//! A group of members contributes money into a common pool and draws it down
//! via recorded expenses, each split among members by a [`SplitPolicy`]. The
//! engine computes each member's net position ([`compute_balances`]) and the
//! peer-to-peer transfers that zero every position
//! ([`minimize_settlements`]).
//!
//! The engine is a pure function of its inputs: it holds no state, performs
//! no I/O, and recomputes every derived value from scratch per call. The
//! caller owns members, expenses, and transactions; persistence and UI live
//! outside this crate.
//!
//! ```rust
//! use chrono::Utc;
//! use splitpool::{
//!     Expense, Member, Money, SplitPolicy, Transaction, TransactionKind,
//!     compute_balances, minimize_settlements,
//! };
//!
//! let members = vec![Member::new("anita".into()), Member::new("bela".into())];
//! let transactions = vec![Transaction::new(
//!     members[0].id,
//!     TransactionKind::Contribution,
//!     Money::new(10_000),
//!     Utc::now(),
//!     None,
//! )?];
//! let expenses = vec![Expense::new(
//!     "groceries".into(),
//!     Money::new(10_000),
//!     members[0].id,
//!     SplitPolicy::equal(),
//!     Utc::now(),
//! )?];
//!
//! let sheet = compute_balances(&members, &expenses, &transactions)?;
//! let settlements = minimize_settlements(&sheet.balances)?;
//! assert_eq!(settlements.len(), 1);
//! # Ok::<(), splitpool::EngineError>(())
//! ```

pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, SplitPolicy};
pub use members::Member;
pub use money::Money;
pub use ops::{
    BalanceSheet, MemberBalance, PoolState, Settlement, Warning, compute_balances,
    minimize_settlements, receivable_totals, resolve_shares,
};
pub use report::{MemberLine, SettlementReport};
pub use transactions::{Transaction, TransactionKind};

mod currency;
mod error;
mod expenses;
mod members;
mod money;
pub mod ops;
mod report;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
