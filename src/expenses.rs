//! Expense primitives.
//!
//! An `Expense` is money drawn from the pool, split among members according
//! to its [`SplitPolicy`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// How an expense's amount is divided among members.
///
/// Modeled as a closed tagged union so every resolver handles all variants
/// exhaustively. The serde shape mirrors the host application's stored
/// `split_details` JSON (`type` tag, `excluded_members`, `custom_splits`).
///
/// `Percentage` and `Custom` resolve identically; the distinct tag is kept
/// because callers display them differently.
///
/// Keys and excluded ids are `BTree*` collections so every iteration is
/// ordered by member id, independent of insertion or hash order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitPolicy {
    /// Even split among all members not in `excluded`.
    Equal {
        #[serde(rename = "excluded_members", default)]
        excluded: BTreeSet<Uuid>,
    },
    /// Split proportional to per-member percentage weights (0–100).
    Percentage {
        #[serde(rename = "custom_splits")]
        shares: BTreeMap<Uuid, f64>,
    },
    /// Caller-defined weights; resolved exactly like `Percentage`.
    Custom {
        #[serde(rename = "custom_splits")]
        shares: BTreeMap<Uuid, f64>,
    },
}

impl SplitPolicy {
    /// Even split with nobody excluded.
    #[must_use]
    pub fn equal() -> Self {
        Self::Equal {
            excluded: BTreeSet::new(),
        }
    }

    /// The weight map of a `Percentage`/`Custom` policy, if any.
    #[must_use]
    pub fn weights(&self) -> Option<&BTreeMap<Uuid, f64>> {
        match self {
            Self::Equal { .. } => None,
            Self::Percentage { shares } | Self::Custom { shares } => Some(shares),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: Money,
    /// Who fronted the money.
    ///
    /// Deliberately decoupled from the contribution ledger: paying an expense
    /// grants no automatic reimbursement. A payer who should be made whole
    /// must also have a matching contribution transaction recorded.
    pub paid_by: Uuid,
    pub split: SplitPolicy,
    pub occurred_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        description: String,
        amount: Money,
        paid_by: Uuid,
        split: SplitPolicy,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount,
            paid_by,
            split,
            occurred_at,
        })
    }
}
