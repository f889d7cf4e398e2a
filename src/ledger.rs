//! CSV input and output for the command-line front end.
//!
//! Input holds one row per split:
//!
//! ```text
//! expense,payer,total,currency,participant,amount
//! dinner,alice,30.00,USD,alice,10.00
//! dinner,alice,30.00,USD,bob,10.00
//! ```
//!
//! Rows sharing an `expense` id form one expense, in order of first
//! appearance. Unlike the engine functions, which take already-built
//! expenses, this reader reports problems with the row they occurred on.

use crate::balance::PairwiseBalance;
use crate::error::{EngineError, Result};
use crate::expense::Expense;
use crate::money::Money;
use crate::settlement::Settlement;
use crate::split::Split;
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::str::FromStr;

/// Raw split row as read from CSV.
#[derive(Debug, Deserialize)]
pub struct ExpenseRow {
    pub expense: String,
    pub payer: String,
    pub total: String,
    pub currency: String,
    pub participant: String,
    pub amount: String,
}

impl ExpenseRow {
    fn require<'a>(value: &'a str, field: &str, row: usize) -> Result<&'a str> {
        if value.is_empty() {
            return Err(EngineError::InvalidRecord {
                row,
                message: format!("missing {}", field),
            });
        }
        Ok(value)
    }

    fn money(value: &str, field: &str, row: usize) -> Result<Money> {
        Money::from_str(Self::require(value, field, row)?).map_err(|e| {
            EngineError::InvalidRecord {
                row,
                message: format!("invalid {} '{}': {}", field, value, e),
            }
        })
    }
}

/// Reads expense rows and groups them into expenses.
pub fn read_expenses<R: Read>(reader: R) -> Result<Vec<Expense>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut expenses: Vec<Expense> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row_idx, result) in csv_reader.deserialize::<ExpenseRow>().enumerate() {
        let row = row_idx + 2; // 1-indexed, accounting for header row
        let record = result.map_err(|e| EngineError::InvalidRecord {
            row,
            message: e.to_string(),
        })?;

        let id = ExpenseRow::require(&record.expense, "expense", row)?;
        let payer = ExpenseRow::require(&record.payer, "payer", row)?;
        let currency = ExpenseRow::require(&record.currency, "currency", row)?;
        let participant = ExpenseRow::require(&record.participant, "participant", row)?;
        let total = ExpenseRow::money(&record.total, "total", row)?;
        let amount = ExpenseRow::money(&record.amount, "amount", row)?;

        match index.get(id) {
            Some(&position) => {
                let expense = &mut expenses[position];
                if expense.payer != payer
                    || expense.total_amount != total
                    || expense.currency != currency
                {
                    return Err(EngineError::InvalidRecord {
                        row,
                        message: format!(
                            "expense {} disagrees with its earlier rows on payer, total or currency",
                            id
                        ),
                    });
                }
                expense.splits.push(Split::new(participant, amount));
            }
            None => {
                index.insert(id.to_string(), expenses.len());
                expenses.push(Expense {
                    id: id.to_string(),
                    total_amount: total,
                    currency: currency.to_string(),
                    payer: payer.to_string(),
                    splits: vec![Split::new(participant, amount)],
                });
            }
        }
    }

    debug!("Read {} expense(s)", expenses.len());
    Ok(expenses)
}

/// Writes pairwise balances as `debtor,creditor,amount,currency`.
pub fn write_balances<W: Write>(writer: W, balances: &[PairwiseBalance]) -> Result<()> {
    let rows = balances.iter().map(|b| {
        [
            b.debtor.clone(),
            b.creditor.clone(),
            b.amount.to_string(),
            b.currency.clone(),
        ]
    });
    write_rows(writer, ["debtor", "creditor", "amount", "currency"], rows)
}

/// Writes settlements as `debtor,creditor,amount,currency`.
pub fn write_settlements<W: Write>(writer: W, settlements: &[Settlement]) -> Result<()> {
    let rows = settlements.iter().map(|s| {
        [
            s.debtor.clone(),
            s.creditor.clone(),
            s.amount.to_string(),
            s.currency.clone(),
        ]
    });
    write_rows(writer, ["debtor", "creditor", "amount", "currency"], rows)
}

/// Writes per-participant net positions as `participant,net`.
pub fn write_net_positions<W: Write>(
    writer: W,
    positions: &BTreeMap<String, Money>,
) -> Result<()> {
    let rows = positions
        .iter()
        .map(|(participant, net)| [participant.clone(), net.to_string()]);
    write_rows(writer, ["participant", "net"], rows)
}

fn write_rows<W, const N: usize, I>(writer: W, header: [&str; N], rows: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = [String; N]>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(header)?;
    for row in rows {
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_groups_rows_by_expense_in_first_seen_order() {
        let csv = r#"expense,payer,total,currency,participant,amount
taxi,bob,12.00,USD,alice,6.00
dinner,alice,30,USD,alice,10
taxi,bob,12.00,USD,bob,6.00
dinner,alice,30,USD,bob,10
dinner,alice,30,USD,carol,10"#;

        let expenses = read_expenses(Cursor::new(csv)).unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].id, "taxi");
        assert_eq!(expenses[0].splits.len(), 2);
        assert_eq!(expenses[1].id, "dinner");
        assert_eq!(expenses[1].total_amount.to_string(), "30.00");
        assert_eq!(expenses[1].splits[2].participant, "carol");
    }

    #[test]
    fn test_whitespace_handling() {
        let csv = "expense, payer, total, currency, participant, amount\n e1 , a , 5.5 , USD , b , 5.5 \n";
        let expenses = read_expenses(Cursor::new(csv)).unwrap();
        assert_eq!(expenses[0].payer, "a");
        assert_eq!(expenses[0].splits[0].amount.to_string(), "5.50");
    }

    #[test]
    fn test_invalid_amount_reports_row() {
        let csv = r#"expense,payer,total,currency,participant,amount
e1,a,10,USD,a,5
e1,a,10,USD,b,five"#;
        let err = read_expenses(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRecord { row: 3, .. }));
    }

    #[test]
    fn test_conflicting_expense_rows_rejected() {
        let csv = r#"expense,payer,total,currency,participant,amount
e1,a,10,USD,a,5
e1,b,10,USD,b,5"#;
        let err = read_expenses(Cursor::new(csv)).unwrap_err();
        assert!(err.to_string().contains("disagrees"));
    }

    #[test]
    fn test_missing_field_rejected() {
        let csv = r#"expense,payer,total,currency,participant,amount
e1,,10,USD,a,10"#;
        let err = read_expenses(Cursor::new(csv)).unwrap_err();
        assert!(err.to_string().contains("missing payer"));
    }

    #[test]
    fn test_write_net_positions() {
        let mut positions = BTreeMap::new();
        positions.insert("bob".to_string(), Money::from_cents(-500));
        positions.insert("alice".to_string(), Money::from_cents(500));

        let mut output = Vec::new();
        write_net_positions(&mut output, &positions).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "participant,net\nalice,5.00\nbob,-5.00\n");
    }
}
