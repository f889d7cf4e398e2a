//! # Expense Engine
//!
//! Splits shared expenses among participants, aggregates them into net
//! pairwise debts, and proposes a small set of payments that settles
//! everyone up.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: Amounts are exact cents via `rust_decimal`
//! - **Exact sums**: Allocated splits always add up to the expense total
//! - **Pure functions**: No I/O or shared state; every call starts fresh
//! - **Fail whole**: Invalid input yields an error, never a partial result
//! - **Deterministic output**: Balances and settlements have a stable order
//!
//! Data flows one way: [`split`] produces the splits stored on an
//! [`Expense`], [`balance`] aggregates expenses into [`PairwiseBalance`]s,
//! and [`settlement`] turns those into [`Settlement`]s.
//!
//! ## Example
//!
//! ```
//! use expense_engine::{aggregate_balances, optimize_settlements, Expense, Money, SplitPolicy};
//! use std::str::FromStr;
//!
//! let policy = SplitPolicy::Equal(vec!["A".into(), "B".into(), "C".into()]);
//! let dinner = Expense::from_policy("dinner", Money::from_str("30").unwrap(), "USD", "A", &policy).unwrap();
//!
//! let balances = aggregate_balances(&[dinner]).unwrap();
//! let settlements = optimize_settlements(&balances).unwrap();
//! assert_eq!(settlements.len(), 2);
//! assert!(settlements.iter().all(|s| s.creditor == "A"));
//! ```

pub mod balance;
pub mod currency;
pub mod error;
pub mod expense;
pub mod ledger;
pub mod money;
pub mod settlement;
pub mod split;

pub use balance::{
    aggregate_balances, net_balance_for_participant, net_positions, PairwiseBalance,
};
pub use error::{EngineError, Result};
pub use expense::Expense;
pub use money::Money;
pub use settlement::{optimize_settlements, Settlement};
pub use split::{
    allocate, allocate_equal, allocate_percentage, allocate_shares, validate_exact_splits,
    PercentageShare, ShareCount, Split, SplitPolicy,
};
