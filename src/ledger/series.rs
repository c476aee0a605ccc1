use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::pattern::RecurrencePattern;

/// One leg of an operation: an amount applied to a single account. Amounts
/// are stored positive; the operation kind decides the sign during
/// projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub account_id: Uuid,
    pub amount: f64,
}

impl Split {
    pub fn new(account_id: Uuid, amount: f64) -> Self {
        Self { account_id, amount }
    }
}

/// The origin and destination legs of an operation. Expenses use origin
/// legs, income uses destination legs, transfers use both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origin: Vec<Split>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destination: Vec<Split>,
}

impl SplitSet {
    pub fn expense(origin: Vec<Split>) -> Self {
        Self {
            origin,
            destination: Vec::new(),
        }
    }

    pub fn income(destination: Vec<Split>) -> Self {
        Self {
            origin: Vec::new(),
            destination,
        }
    }

    pub fn transfer(origin: Vec<Split>, destination: Vec<Split>) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn origin_total(&self) -> f64 {
        self.origin.iter().map(|split| split.amount).sum()
    }

    pub fn destination_total(&self) -> f64 {
        self.destination.iter().map(|split| split.amount).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Expense,
    Income,
    Transfer,
}

/// A recurring series: the pattern plus the account splits and metadata the
/// engine needs to resolve and project it. A read-only snapshot of what the
/// persistence layer stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: Uuid,
    pub name: String,
    pub pattern: RecurrencePattern,
    pub kind: OperationKind,
    pub splits: SplitSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl Series {
    pub fn new(
        name: impl Into<String>,
        pattern: RecurrencePattern,
        kind: OperationKind,
        splits: SplitSet,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pattern,
            kind,
            splits,
            category_id: None,
        }
    }

    /// Average budgeted amount per calendar month from the series' nominal
    /// splits. `None` for one-time series. An approximation, see
    /// [`crate::schedule::frequency::Frequency::occurrences_per_month`].
    pub fn budgeted_monthly(&self) -> Option<f64> {
        let frequency = self.pattern.frequency()?;
        let nominal = match self.kind {
            OperationKind::Income => self.splits.destination_total(),
            OperationKind::Expense | OperationKind::Transfer => self.splits.origin_total(),
        };
        Some(nominal * frequency.occurrences_per_month())
    }
}
