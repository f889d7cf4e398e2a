//! Split allocation: dividing an expense total among its participants.
//!
//! Every allocator returns splits whose amounts sum to the requested total
//! exactly, to the cent. Rounding leftovers are never dropped; they are handed
//! to a deterministic participant (see each function).

use crate::error::{EngineError, Result};
use crate::money::Money;
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One participant's allocation of an expense total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Opaque participant identifier.
    pub participant: String,

    /// Amount this participant is responsible for.
    pub amount: Money,

    /// Percentage the amount was derived from, for percentage splits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,

    /// Share count the amount was derived from, for share splits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<Decimal>,
}

impl Split {
    /// Creates a split with a directly specified amount.
    pub fn new(participant: impl Into<String>, amount: Money) -> Self {
        Split {
            participant: participant.into(),
            amount,
            percentage: None,
            shares: None,
        }
    }
}

/// A participant's requested percentage of the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageShare {
    pub participant: String,
    pub percentage: Decimal,
}

impl PercentageShare {
    pub fn new(participant: impl Into<String>, percentage: Decimal) -> Self {
        PercentageShare {
            participant: participant.into(),
            percentage,
        }
    }
}

/// A participant's weight in a share-based split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareCount {
    pub participant: String,
    pub shares: Decimal,
}

impl ShareCount {
    pub fn new(participant: impl Into<String>, shares: Decimal) -> Self {
        ShareCount {
            participant: participant.into(),
            shares,
        }
    }
}

/// The ways an expense total can be divided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entries", rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Same amount for everyone; leftover cents go to the first participants.
    Equal(Vec<String>),

    /// Each participant pays a percentage; percentages must total 100.
    Percentage(Vec<PercentageShare>),

    /// Each participant pays in proportion to a share count.
    Shares(Vec<ShareCount>),

    /// Amounts are supplied by the caller and only validated.
    Exact(Vec<Split>),
}

/// Allocates `amount` according to `policy`.
pub fn allocate(amount: Money, policy: &SplitPolicy) -> Result<Vec<Split>> {
    match policy {
        SplitPolicy::Equal(participants) => allocate_equal(amount, participants),
        SplitPolicy::Percentage(shares) => allocate_percentage(amount, shares),
        SplitPolicy::Shares(shares) => allocate_shares(amount, shares),
        SplitPolicy::Exact(splits) => {
            validate_exact_splits(splits, amount)?;
            Ok(splits.clone())
        }
    }
}

/// Divides `amount` equally among `participants`.
///
/// Each participant receives `floor(amount / n)` to the cent; the leftover
/// cents go one each to the first participants in input order. No two
/// resulting amounts differ by more than one cent.
///
/// ```
/// use std::str::FromStr;
/// use expense_engine::{allocate_equal, Money};
///
/// let splits = allocate_equal(Money::from_str("10.00").unwrap(), &["A", "B", "C"]).unwrap();
/// let amounts: Vec<String> = splits.iter().map(|s| s.amount.to_string()).collect();
/// assert_eq!(amounts, ["3.34", "3.33", "3.33"]);
/// ```
pub fn allocate_equal<S: AsRef<str>>(amount: Money, participants: &[S]) -> Result<Vec<Split>> {
    if participants.is_empty() {
        return Err(EngineError::invalid(
            "at least one participant is required for an equal split",
        ));
    }
    check_total(amount)?;
    for participant in participants {
        check_participant(participant.as_ref())?;
    }

    let total_cents = amount
        .cents()
        .ok_or_else(|| out_of_range(amount))?;
    let count = participants.len() as i64;
    let base = total_cents / count;
    let remainder = total_cents % count;

    debug!(
        "Equal split of {} among {}: base {} with {} extra cent(s)",
        amount,
        count,
        Money::from_cents(base),
        remainder
    );

    Ok(participants
        .iter()
        .enumerate()
        .map(|(index, participant)| {
            let cents = if (index as i64) < remainder {
                base + 1
            } else {
                base
            };
            Split::new(participant.as_ref(), Money::from_cents(cents))
        })
        .collect())
}

/// Divides `amount` by percentage.
///
/// Percentages must sum to 100 within 0.01. Each amount is rounded to the
/// nearest cent, then any rounding residual is added to the largest split.
pub fn allocate_percentage(amount: Money, shares: &[PercentageShare]) -> Result<Vec<Split>> {
    check_total(amount)?;

    let mut total_percentage = Decimal::ZERO;
    for share in shares {
        check_participant(&share.participant)?;
        if share.percentage < Decimal::ZERO {
            return Err(EngineError::invalid(format!(
                "percentage for {} must not be negative",
                share.participant
            )));
        }
        total_percentage += share.percentage;
    }

    if (total_percentage - Decimal::ONE_HUNDRED).abs() > Decimal::new(1, 2) {
        return Err(EngineError::invalid(format!(
            "percentages must sum to 100, got {}",
            total_percentage
        )));
    }

    let mut splits = Vec::with_capacity(shares.len());
    for share in shares {
        let raw = amount
            .as_decimal()
            .checked_mul(share.percentage)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| out_of_range(amount))?;
        splits.push(Split {
            participant: share.participant.clone(),
            amount: Money::new(raw),
            percentage: Some(share.percentage),
            shares: None,
        });
    }

    absorb_residual(amount, &mut splits)?;
    Ok(splits)
}

/// Divides `amount` in proportion to share counts.
///
/// Total shares must be positive. Rounding is handled the same way as
/// [`allocate_percentage`].
pub fn allocate_shares(amount: Money, shares: &[ShareCount]) -> Result<Vec<Split>> {
    check_total(amount)?;

    let mut total_shares = Decimal::ZERO;
    for share in shares {
        check_participant(&share.participant)?;
        if share.shares < Decimal::ZERO {
            return Err(EngineError::invalid(format!(
                "share count for {} must not be negative",
                share.participant
            )));
        }
        total_shares += share.shares;
    }

    if total_shares <= Decimal::ZERO {
        return Err(EngineError::invalid("total shares must be greater than 0"));
    }

    let mut splits = Vec::with_capacity(shares.len());
    for share in shares {
        let raw = amount
            .as_decimal()
            .checked_mul(share.shares)
            .and_then(|v| v.checked_div(total_shares))
            .ok_or_else(|| out_of_range(amount))?;
        splits.push(Split {
            participant: share.participant.clone(),
            amount: Money::new(raw),
            percentage: None,
            shares: Some(share.shares),
        });
    }

    absorb_residual(amount, &mut splits)?;
    Ok(splits)
}

/// Checks that caller-supplied split amounts add up to `total`.
///
/// Amounts are compared at cent precision, so any mismatch of a cent or more
/// is rejected.
pub fn validate_exact_splits(splits: &[Split], total: Money) -> Result<()> {
    for split in splits {
        check_participant(&split.participant)?;
        if split.amount.is_negative() {
            return Err(EngineError::invalid(format!(
                "split amount for {} must not be negative, got {}",
                split.participant, split.amount
            )));
        }
    }

    let allocated = sum_amounts(splits)?;
    let difference = allocated.checked_sub(total).ok_or_else(|| out_of_range(total))?;
    if difference.abs() >= Money::CENT {
        return Err(EngineError::invalid(format!(
            "split amounts sum to {} but the total is {}",
            allocated, total
        )));
    }
    Ok(())
}

/// Adds whatever rounding left unallocated to the largest split (first one
/// on ties), so the splits sum to `amount` exactly.
///
/// When rounding overshoots by more than the largest split holds (only for
/// totals of a few cents spread over many participants), the overshoot is
/// instead taken back one cent at a time from whichever split is largest.
fn absorb_residual(amount: Money, splits: &mut [Split]) -> Result<()> {
    let allocated = sum_amounts(splits)?;
    let residual = amount
        .checked_sub(allocated)
        .ok_or_else(|| out_of_range(amount))?;
    if residual.is_zero() {
        return Ok(());
    }

    let largest = largest_split(splits)?;
    let corrected = splits[largest]
        .amount
        .checked_add(residual)
        .ok_or_else(|| out_of_range(amount))?;
    if !corrected.is_negative() {
        let target = &mut splits[largest];
        trace!(
            "Adding rounding residual {} to {} ({})",
            residual,
            target.participant,
            target.amount
        );
        target.amount = corrected;
        return Ok(());
    }

    let mut overshoot = -residual;
    while overshoot.is_positive() {
        let index = largest_split(splits)?;
        let target = &mut splits[index];
        if !target.amount.is_positive() {
            return Err(EngineError::InternalConsistency(format!(
                "rounding overshoot {} exceeds the allocated amounts",
                overshoot
            )));
        }
        trace!("Taking back one cent of overshoot from {}", target.participant);
        target.amount -= Money::CENT;
        overshoot -= Money::CENT;
    }
    Ok(())
}

/// Index of the first split holding the largest amount.
fn largest_split(splits: &[Split]) -> Result<usize> {
    let mut largest: Option<usize> = None;
    for (index, split) in splits.iter().enumerate() {
        match largest {
            Some(current) if split.amount <= splits[current].amount => {}
            _ => largest = Some(index),
        }
    }
    largest.ok_or_else(|| EngineError::InternalConsistency("no split to absorb rounding".into()))
}

fn sum_amounts(splits: &[Split]) -> Result<Money> {
    Money::checked_sum(splits.iter().map(|s| s.amount))
        .ok_or_else(|| EngineError::invalid("split amounts are out of range"))
}

fn out_of_range(amount: Money) -> EngineError {
    EngineError::invalid(format!("amount {} is out of range", amount))
}

fn check_total(amount: Money) -> Result<()> {
    if amount.is_negative() {
        return Err(EngineError::invalid(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

fn check_participant(participant: &str) -> Result<()> {
    if participant.trim().is_empty() {
        return Err(EngineError::invalid("participant id must not be blank"));
    }
    Ok(())
}
