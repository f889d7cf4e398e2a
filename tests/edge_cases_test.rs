//! End-to-end edge cases for the split -> balance -> settlement pipeline.

use expense_engine::{
    aggregate_balances, allocate_equal, allocate_percentage, allocate_shares,
    net_balance_for_participant, optimize_settlements, validate_exact_splits, EngineError,
    Expense, Money, PairwiseBalance, PercentageShare, Settlement, ShareCount, Split, SplitPolicy,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn money(s: &str) -> Money {
    Money::from_str(s).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn exact(id: &str, payer: &str, splits: &[(&str, &str)]) -> Expense {
    let splits: Vec<Split> = splits
        .iter()
        .map(|(p, a)| Split::new(*p, money(a)))
        .collect();
    Expense {
        id: id.to_string(),
        total_amount: splits.iter().map(|s| s.amount).sum(),
        currency: "USD".to_string(),
        payer: payer.to_string(),
        splits,
    }
}

fn balance_triples(balances: &[PairwiseBalance]) -> Vec<(&str, &str, String)> {
    balances
        .iter()
        .map(|b| (b.debtor.as_str(), b.creditor.as_str(), b.amount.to_string()))
        .collect()
}

fn settlement_triples(settlements: &[Settlement]) -> Vec<(&str, &str, String)> {
    settlements
        .iter()
        .map(|s| (s.debtor.as_str(), s.creditor.as_str(), s.amount.to_string()))
        .collect()
}

// ==================== DOCUMENTED EXAMPLES ====================

#[test]
fn test_equal_split_of_ten_between_three() {
    let splits = allocate_equal(money("10.00"), &["A", "B", "C"]).unwrap();
    let got: Vec<(&str, String)> = splits
        .iter()
        .map(|s| (s.participant.as_str(), s.amount.to_string()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("A", "3.34".to_string()),
            ("B", "3.33".to_string()),
            ("C", "3.33".to_string())
        ]
    );
}

#[test]
fn test_percentage_split_of_hundred() {
    let shares = vec![
        PercentageShare::new("A", dec("33.33")),
        PercentageShare::new("B", dec("33.33")),
        PercentageShare::new("C", dec("33.34")),
    ];
    let splits = allocate_percentage(money("100.00"), &shares).unwrap();
    let total: Money = splits.iter().map(|s| s.amount).sum();
    assert_eq!(total, money("100.00"));
}

#[test]
fn test_three_way_dinner_balances_and_settlements() {
    let expenses = vec![exact("e1", "A", &[("A", "10"), ("B", "10"), ("C", "10")])];

    let balances = aggregate_balances(&expenses).unwrap();
    assert_eq!(
        balance_triples(&balances),
        vec![("B", "A", "10.00".to_string()), ("C", "A", "10.00".to_string())]
    );

    let settlements = optimize_settlements(&balances).unwrap();
    assert_eq!(
        settlement_triples(&settlements),
        vec![("B", "A", "10.00".to_string()), ("C", "A", "10.00".to_string())]
    );
}

#[test]
fn test_reciprocal_expenses_net_to_single_balance() {
    let expenses = vec![
        exact("e1", "A", &[("A", "10"), ("B", "10")]),
        exact("e2", "B", &[("A", "5"), ("B", "5")]),
    ];
    let balances = aggregate_balances(&expenses).unwrap();
    assert_eq!(
        balance_triples(&balances),
        vec![("B", "A", "5.00".to_string())]
    );
}

// ==================== ALLOCATION EDGE CASES ====================

#[test]
fn test_zero_amount_splits_to_zero() {
    let splits = allocate_equal(Money::ZERO, &["A", "B"]).unwrap();
    assert!(splits.iter().all(|s| s.amount.is_zero()));
}

#[test]
fn test_single_cent_among_many() {
    let participants: Vec<String> = (0..100).map(|i| format!("p{}", i)).collect();
    let splits = allocate_equal(Money::CENT, &participants).unwrap();
    assert_eq!(splits[0].amount, Money::CENT);
    assert!(splits[1..].iter().all(|s| s.amount.is_zero()));
}

#[test]
fn test_shares_with_fractional_weights() {
    let shares = vec![
        ShareCount::new("A", dec("1.5")),
        ShareCount::new("B", dec("0.5")),
    ];
    let splits = allocate_shares(money("10.00"), &shares).unwrap();
    assert_eq!(splits[0].amount, money("7.50"));
    assert_eq!(splits[1].amount, money("2.50"));
}

#[test]
fn test_shares_with_single_zero_weight_participant() {
    let shares = vec![ShareCount::new("A", dec("3")), ShareCount::new("B", dec("0"))];
    let splits = allocate_shares(money("10.00"), &shares).unwrap();
    assert_eq!(splits[0].amount, money("10.00"));
    assert!(splits[1].amount.is_zero());
}

#[test]
fn test_exact_split_mismatch_is_invalid_input() {
    let splits = vec![Split::new("A", money("3.00")), Split::new("B", money("3.00"))];
    let err = validate_exact_splits(&splits, money("7.00")).unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn test_expense_from_each_policy() {
    let total = money("12.00");
    let policies = vec![
        SplitPolicy::Equal(vec!["A".into(), "B".into()]),
        SplitPolicy::Percentage(vec![
            PercentageShare::new("A", dec("25")),
            PercentageShare::new("B", dec("75")),
        ]),
        SplitPolicy::Shares(vec![ShareCount::new("A", dec("1")), ShareCount::new("B", dec("2"))]),
        SplitPolicy::Exact(vec![Split::new("A", money("2")), Split::new("B", money("10"))]),
    ];
    let expected_b = ["6.00", "9.00", "8.00", "10.00"];

    for (policy, expected) in policies.iter().zip(expected_b) {
        let expense = Expense::from_policy("e", total, "USD", "A", policy).unwrap();
        let balances = aggregate_balances(&[expense]).unwrap();
        assert_eq!(
            balance_triples(&balances),
            vec![("B", "A", expected.to_string())]
        );
    }
}

// ==================== AGGREGATION EDGE CASES ====================

#[test]
fn test_payer_paying_for_others_only() {
    let expenses = vec![exact("gift", "A", &[("B", "15"), ("C", "5")])];
    let balances = aggregate_balances(&expenses).unwrap();
    assert_eq!(net_balance_for_participant(&balances, "A"), money("20.00"));
    assert_eq!(net_balance_for_participant(&balances, "B"), money("-15.00"));
}

#[test]
fn test_aggregation_is_rerunnable() {
    let expenses = vec![
        exact("e1", "A", &[("B", "4.10"), ("C", "2.05")]),
        exact("e2", "C", &[("A", "3.00")]),
    ];
    let first = aggregate_balances(&expenses).unwrap();
    let second = aggregate_balances(&expenses).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_expense_fails_whole_call() {
    let mut bad = exact("e2", "A", &[("B", "1")]);
    bad.total_amount = money("2");
    let expenses = vec![exact("e1", "A", &[("B", "1")]), bad];
    assert!(matches!(
        aggregate_balances(&expenses),
        Err(EngineError::InvalidInput(_))
    ));
}

// ==================== SETTLEMENT EDGE CASES ====================

#[test]
fn test_settlements_use_fewer_payments_than_balances() {
    let expenses = vec![
        exact("e1", "A", &[("B", "20")]),
        exact("e2", "B", &[("C", "20")]),
        exact("e3", "C", &[("D", "20")]),
    ];
    let balances = aggregate_balances(&expenses).unwrap();
    assert_eq!(balances.len(), 3);

    let settlements = optimize_settlements(&balances).unwrap();
    assert_eq!(
        settlement_triples(&settlements),
        vec![("D", "A", "20.00".to_string())]
    );
}

#[test]
fn test_settlement_output_is_reproducible() {
    let expenses = vec![
        exact("e1", "A", &[("B", "10"), ("C", "10"), ("D", "10")]),
        exact("e2", "E", &[("B", "5"), ("C", "5"), ("D", "5")]),
    ];
    let balances = aggregate_balances(&expenses).unwrap();
    let first = optimize_settlements(&balances).unwrap();
    let second = optimize_settlements(&balances).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        settlement_triples(&first),
        vec![
            ("B", "A", "15.00".to_string()),
            ("C", "A", "15.00".to_string()),
            ("D", "E", "15.00".to_string()),
        ]
    );
}
