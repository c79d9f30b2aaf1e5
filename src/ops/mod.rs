//! The engine's operations, evaluated leaf-first: split resolution feeds the
//! balance calculation, whose output is the sole input of the settlement
//! minimizer.

mod balances;
mod settlements;
mod split;

pub use balances::{BalanceSheet, MemberBalance, PoolState, Warning, compute_balances};
pub use settlements::{Settlement, minimize_settlements, receivable_totals};
pub use split::resolve_shares;
