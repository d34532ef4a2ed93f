//! One-shot request and release evaluation

use std::path::Path;

use banker_core::{BankerError, LedgerSnapshot, ProcessId, Units};
use serde::Serialize;

use crate::error::{CliError, CliResult};
use crate::output::{emit, snapshot_table, OutputFormat, Outcome};
use crate::scenario::load_ledger;

#[derive(Serialize)]
struct MutationReport {
    process: ProcessId,
    units: Vec<Units>,
    #[serde(flatten)]
    outcome: Outcome,
    state: LedgerSnapshot,
}

/// Evaluate a request against the configured ledger
pub fn request(config: &Path, process: usize, units: &[Units], format: OutputFormat) -> CliResult<()> {
    let mut ledger = load_ledger(config)?;
    let result = ledger
        .request(ProcessId(process), units)
        .map(|grant| Outcome::Granted {
            sequence: grant.sequence,
        });
    report(ProcessId(process), units, result, ledger.snapshot(), format)
}

/// Evaluate a release against the configured ledger
pub fn release(config: &Path, process: usize, units: &[Units], format: OutputFormat) -> CliResult<()> {
    let mut ledger = load_ledger(config)?;
    let result = ledger
        .release(ProcessId(process), units)
        .map(|()| Outcome::Released);
    report(ProcessId(process), units, result, ledger.snapshot(), format)
}

fn report(
    process: ProcessId,
    units: &[Units],
    result: Result<Outcome, BankerError>,
    state: LedgerSnapshot,
    format: OutputFormat,
) -> CliResult<()> {
    let (outcome, denial) = match result {
        Ok(outcome) => (outcome, None),
        Err(e) => match Outcome::denied(&e) {
            Some(outcome) => (outcome, Some(e)),
            None => return Err(e.into()),
        },
    };

    let summary = MutationReport {
        process,
        units: units.to_vec(),
        outcome,
        state,
    };
    emit(format, &summary, || {
        summary.outcome.print_table();
        println!("{}", snapshot_table(&summary.state));
    })?;

    match denial {
        Some(e) => Err(CliError::Denied(e)),
        None => Ok(()),
    }
}
