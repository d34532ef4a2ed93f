//! Read-only commands: show and check

use std::path::Path;

use banker_core::LedgerSnapshot;
use colored::Colorize;
use serde::Serialize;

use crate::error::CliResult;
use crate::output::{emit, print_verdict, snapshot_table, OutputFormat};
use crate::scenario::load_ledger;

#[derive(Serialize)]
struct ShowReport {
    state: LedgerSnapshot,
    invariants: String,
}

/// Print the configured ledger
pub fn show(config: &Path, format: OutputFormat) -> CliResult<()> {
    let ledger = load_ledger(config)?;
    let invariants = match ledger.verify_invariants() {
        Ok(()) => "ok".to_string(),
        Err(e) => e.to_string(),
    };
    let report = ShowReport {
        state: ledger.snapshot(),
        invariants,
    };

    emit(format, &report, || {
        println!("{}", "Resource Ledger".bold().cyan());
        println!("{}", snapshot_table(&report.state));
        println!("Invariants: {}", report.invariants);
    })
}

/// Print the safety verdict for the configured ledger
pub fn check(config: &Path, format: OutputFormat) -> CliResult<()> {
    let ledger = load_ledger(config)?;
    let verdict = ledger.find_safe_sequence();
    emit(format, &verdict, || print_verdict(&verdict))
}
