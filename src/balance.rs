//! Balance aggregation: reducing expenses to net pairwise debts.
//!
//! Debts are folded into a directed edge map keyed by `(debtor, creditor)`.
//! An edge and its reverse never coexist: a new debt against an existing
//! reverse edge is netted immediately. Because the arithmetic is exact to the
//! cent, the surviving edges depend only on the expense set, never on the
//! order the expenses were processed in.

use crate::error::{EngineError, Result};
use crate::expense::Expense;
use crate::money::Money;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `debtor` owes `creditor` a positive `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseBalance {
    pub debtor: String,
    pub creditor: String,
    pub amount: Money,
    pub currency: String,
}

/// Directed debt edges, rebuilt from scratch for every aggregation.
#[derive(Debug, Default)]
struct DebtGraph {
    edges: BTreeMap<(String, String), Money>,
}

impl DebtGraph {
    /// Records that `debtor` owes `creditor` an additional `amount`.
    fn record(&mut self, debtor: &str, creditor: &str, amount: Money) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let reverse_key = (creditor.to_string(), debtor.to_string());
        let reverse = self
            .edges
            .get(&reverse_key)
            .copied()
            .filter(Money::is_positive);

        let Some(reverse) = reverse else {
            let owed = self
                .edges
                .entry((debtor.to_string(), creditor.to_string()))
                .or_default();
            *owed = owed.checked_add(amount).ok_or_else(|| {
                EngineError::invalid(format!(
                    "debt from {} to {} is out of range",
                    debtor, creditor
                ))
            })?;
            return Ok(());
        };

        self.edges.remove(&reverse_key);
        let net = amount.checked_sub(reverse).ok_or_else(|| {
            EngineError::invalid(format!(
                "debt between {} and {} is out of range",
                debtor, creditor
            ))
        })?;
        trace!(
            "Netting {} -> {} ({}) against {} -> {} ({}): {}",
            debtor,
            creditor,
            amount,
            creditor,
            debtor,
            reverse,
            net
        );

        if net.is_positive() {
            self.edges
                .insert((debtor.to_string(), creditor.to_string()), net);
        } else if net.is_negative() {
            self.edges.insert(reverse_key, -net);
        }
        Ok(())
    }

    fn into_balances(self, currency: &str) -> Vec<PairwiseBalance> {
        self.edges
            .into_iter()
            .filter_map(|((debtor, creditor), amount)| {
                if amount < Money::CENT {
                    debug!(
                        "Dropping negligible balance {} -> {} ({})",
                        debtor, creditor, amount
                    );
                    return None;
                }
                Some(PairwiseBalance {
                    debtor,
                    creditor,
                    amount,
                    currency: currency.to_string(),
                })
            })
            .collect()
    }
}

/// Aggregates `expenses` into net pairwise balances.
///
/// Every split not assigned to the expense's payer is a debt from the split's
/// participant to the payer. Opposite debts between the same two people are
/// netted, so at most one balance exists per pair. The output is sorted by
/// `(debtor, creditor)`.
///
/// All expenses are validated before any aggregation; a malformed expense or
/// a mix of currencies fails the whole call with [`EngineError::InvalidInput`].
pub fn aggregate_balances(expenses: &[Expense]) -> Result<Vec<PairwiseBalance>> {
    let Some(first) = expenses.first() else {
        return Ok(Vec::new());
    };

    for expense in expenses {
        expense.validate()?;
        if expense.currency != first.currency {
            return Err(EngineError::invalid(format!(
                "expense {} is in {} but expense {} is in {}; balances are computed in one currency",
                expense.id, expense.currency, first.id, first.currency
            )));
        }
    }

    let graph = expenses
        .iter()
        .try_fold(DebtGraph::default(), |mut graph, expense| {
            for split in expense.owed_splits() {
                graph.record(&split.participant, &expense.payer, split.amount)?;
            }
            Ok::<_, EngineError>(graph)
        })?;

    let balances = graph.into_balances(&first.currency);
    debug!(
        "Aggregated {} expense(s) into {} balance(s)",
        expenses.len(),
        balances.len()
    );
    Ok(balances)
}

/// Collapses pairwise balances into one net figure per participant.
///
/// Positive means the participant is owed money overall, negative means they
/// owe. The figures always sum to zero.
pub fn net_positions(balances: &[PairwiseBalance]) -> BTreeMap<String, Money> {
    let mut positions: BTreeMap<String, Money> = BTreeMap::new();
    for balance in balances {
        *positions.entry(balance.debtor.clone()).or_default() -= balance.amount;
        *positions.entry(balance.creditor.clone()).or_default() += balance.amount;
    }
    positions
}

/// Returns what `participant` is owed minus what they owe.
pub fn net_balance_for_participant(balances: &[PairwiseBalance], participant: &str) -> Money {
    balances.iter().fold(Money::ZERO, |net, balance| {
        if balance.debtor == participant {
            net - balance.amount
        } else if balance.creditor == participant {
            net + balance.amount
        } else {
            net
        }
    })
}
