//! Transaction primitives.
//!
//! A `Transaction` is a movement of real money between a member and the
//! group's pool. Only contributions feed the balance calculation; any other
//! kind is carried for the caller's history views and ignored by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Contribution,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contribution => "contribution",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "contribution" => Ok(Self::Contribution),
            "withdrawal" => Ok(Self::Withdrawal),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub member_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl Transaction {
    pub fn new(
        member_id: Uuid,
        kind: TransactionKind,
        amount: Money,
        occurred_at: DateTime<Utc>,
        note: Option<String>,
    ) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "transaction amount must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            member_id,
            kind,
            amount,
            occurred_at,
            note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_as_str() {
        for kind in [TransactionKind::Contribution, TransactionKind::Withdrawal] {
            assert_eq!(TransactionKind::try_from(kind.as_str()), Ok(kind));
        }
        assert!(TransactionKind::try_from("transfer").is_err());
    }

    #[test]
    fn new_rejects_negative_amount() {
        let err = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Contribution,
            Money::new(-1),
            Utc::now(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}
