//! Expense Engine CLI
//!
//! Reads expense split rows from CSV and prints either the optimized
//! settlements, the net pairwise balances, or each participant's net position.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- expenses.csv > settlements.csv
//! cargo run -- expenses.csv balances
//! cargo run -- expenses.csv net
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `trace` to control logging verbosity

use expense_engine::{aggregate_balances, ledger, net_positions, optimize_settlements};
use expense_engine::{EngineError, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

/// What the CLI prints.
enum Mode {
    Settlements,
    Balances,
    Net,
}

impl Mode {
    fn parse(arg: Option<&String>) -> Result<Self> {
        match arg.map(|s| s.trim().to_lowercase()).as_deref() {
            None | Some("settlements") => Ok(Mode::Settlements),
            Some("balances") => Ok(Mode::Balances),
            Some("net") => Ok(Mode::Net),
            Some(other) => Err(EngineError::UnknownMode(other.to_string())),
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(EngineError::MissingArgument);
    }

    let input_path = &args[1];
    let mode = Mode::parse(args.get(2))?;

    let file = File::open(input_path)?;
    let expenses = ledger::read_expenses(BufReader::new(file))?;
    let balances = aggregate_balances(&expenses)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    match mode {
        Mode::Settlements => ledger::write_settlements(handle, &optimize_settlements(&balances)?),
        Mode::Balances => ledger::write_balances(handle, &balances),
        Mode::Net => ledger::write_net_positions(handle, &net_positions(&balances)),
    }
}
