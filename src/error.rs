//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`InvalidSplit`] returned when an expense's split policy cannot be
//!   resolved against the member set.
//! - [`SettlementImbalance`] returned when the settlement minimizer is left
//!   with balances it cannot pair off.
//! - [`InvalidAmount`] returned when a monetary input is malformed.
//!
//!  [`InvalidSplit`]: EngineError::InvalidSplit
//!  [`SettlementImbalance`]: EngineError::SettlementImbalance
//!  [`InvalidAmount`]: EngineError::InvalidAmount
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Settlement imbalance: {0}")]
    SettlementImbalance(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
