//! Settlement optimization: turning pairwise debts into few payments.
//!
//! Pairwise balances are first collapsed into one net position per
//! participant. Creditors and debtors are then each sorted largest first and
//! matched greedily with two cursors. Every step fully closes at least one
//! side, so the result has at most `creditors + debtors - 1` payments.
//!
//! Greedy matching is not guaranteed to reach the true minimum number of
//! payments (that problem is combinatorial), but it is deterministic and
//! linear in the number of participants after sorting.

use crate::balance::{net_positions, PairwiseBalance};
use crate::error::{EngineError, Result};
use crate::money::Money;
use log::debug;
use serde::{Deserialize, Serialize};

/// A proposed payment of `amount` from `debtor` to `creditor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub debtor: String,
    pub creditor: String,
    pub amount: Money,
    pub currency: String,
}

/// A participant's outstanding exposure during matching.
#[derive(Debug)]
struct Position {
    participant: String,
    remaining: Money,
}

/// Computes payments that zero every participant's net balance.
///
/// Creditors and debtors are ordered by amount descending, ties by
/// participant id ascending, which makes the output reproducible.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] for a self-balance, a non-positive amount
///   or mixed currencies
/// - [`EngineError::InternalConsistency`] if matching leaves a residue of a
///   cent or more
pub fn optimize_settlements(balances: &[PairwiseBalance]) -> Result<Vec<Settlement>> {
    let Some(first) = balances.first() else {
        return Ok(Vec::new());
    };
    for balance in balances {
        check_balance(balance, &first.currency)?;
    }
    let currency = first.currency.as_str();

    let mut creditors = Vec::new();
    let mut debtors = Vec::new();
    for (participant, net) in net_positions(balances) {
        if net >= Money::CENT {
            creditors.push(Position {
                participant,
                remaining: net,
            });
        } else if -net >= Money::CENT {
            debtors.push(Position {
                participant,
                remaining: -net,
            });
        }
    }

    // Stable sort keeps the participant-id order of `net_positions` on ties.
    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut settlements = Vec::new();
    let (mut ci, mut di) = (0, 0);
    while ci < creditors.len() && di < debtors.len() {
        let creditor = &mut creditors[ci];
        let debtor = &mut debtors[di];
        let amount = creditor.remaining.min(debtor.remaining);

        if amount >= Money::CENT {
            debug!(
                "Settlement: {} pays {} {} {}",
                debtor.participant, creditor.participant, amount, currency
            );
            settlements.push(Settlement {
                debtor: debtor.participant.clone(),
                creditor: creditor.participant.clone(),
                amount,
                currency: currency.to_string(),
            });
            creditor.remaining -= amount;
            debtor.remaining -= amount;
        }

        if creditor.remaining < Money::CENT {
            ci += 1;
        }
        if debtor.remaining < Money::CENT {
            di += 1;
        }
    }

    let residue = creditors[ci..]
        .iter()
        .chain(debtors[di..].iter())
        .find(|p| p.remaining >= Money::CENT);
    if let Some(position) = residue {
        return Err(EngineError::InternalConsistency(format!(
            "{} is left with unmatched balance {} after settlement",
            position.participant, position.remaining
        )));
    }

    debug!(
        "Settled {} creditor(s) and {} debtor(s) with {} payment(s)",
        creditors.len(),
        debtors.len(),
        settlements.len()
    );
    Ok(settlements)
}

fn check_balance(balance: &PairwiseBalance, currency: &str) -> Result<()> {
    if balance.debtor == balance.creditor {
        return Err(EngineError::invalid(format!(
            "{} cannot owe themselves",
            balance.debtor
        )));
    }
    if !balance.amount.is_positive() {
        return Err(EngineError::invalid(format!(
            "balance {} -> {} must be positive, got {}",
            balance.debtor, balance.creditor, balance.amount
        )));
    }
    if balance.currency != currency {
        return Err(EngineError::invalid(format!(
            "balance {} -> {} is in {}, expected {}",
            balance.debtor, balance.creditor, balance.currency, currency
        )));
    }
    Ok(())
}
