//! Expense records consumed by the balance aggregator.

use crate::error::{EngineError, Result};
use crate::money::Money;
use crate::split::{allocate, validate_exact_splits, Split, SplitPolicy};
use serde::{Deserialize, Serialize};

/// A paid expense, already divided among its participants.
///
/// # Invariants
///
/// - `splits` is non-empty and every split amount is non-negative
/// - split amounts sum to `total_amount`
/// - the payer is owed every split not assigned to the payer
///
/// The payer does not need to appear among the splits; paying entirely for
/// other people is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub total_amount: Money,
    /// Opaque currency tag, carried through unchanged.
    pub currency: String,
    pub payer: String,
    pub splits: Vec<Split>,
}

impl Expense {
    /// Builds an expense whose splits are allocated from `policy`.
    pub fn from_policy(
        id: impl Into<String>,
        total_amount: Money,
        currency: impl Into<String>,
        payer: impl Into<String>,
        policy: &SplitPolicy,
    ) -> Result<Self> {
        let expense = Expense {
            id: id.into(),
            total_amount,
            currency: currency.into(),
            payer: payer.into(),
            splits: allocate(total_amount, policy)?,
        };
        expense.validate()?;
        Ok(expense)
    }

    /// Checks the structural invariants the aggregator relies on.
    pub fn validate(&self) -> Result<()> {
        if self.payer.trim().is_empty() {
            return Err(EngineError::invalid(format!(
                "expense {} has no payer",
                self.id
            )));
        }
        if self.splits.is_empty() {
            return Err(EngineError::invalid(format!(
                "expense {} has no splits",
                self.id
            )));
        }
        validate_exact_splits(&self.splits, self.total_amount)
            .map_err(|e| match e {
                EngineError::InvalidInput(message) => {
                    EngineError::invalid(format!("expense {}: {}", self.id, message))
                }
                other => other,
            })
    }

    /// Splits owed to the payer, i.e. those assigned to someone else.
    pub fn owed_splits(&self) -> impl Iterator<Item = &Split> {
        self.splits
            .iter()
            .filter(move |split| split.participant != self.payer)
    }
}
