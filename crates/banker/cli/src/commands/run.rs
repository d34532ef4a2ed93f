//! Scenario replay

use std::path::Path;

use banker_core::{LedgerSnapshot, ProcessId, Units};
use colored::Colorize;
use serde::Serialize;

use crate::error::CliResult;
use crate::output::{emit, snapshot_table, OutputFormat, Outcome};
use crate::scenario::{build, load, ScenarioFile, Step};

#[derive(Serialize)]
struct StepReport {
    step: usize,
    operation: Step,
    outcome: Outcome,
}

#[derive(Serialize)]
struct RunReport {
    steps: Vec<StepReport>,
    applied: usize,
    denied: usize,
    final_state: LedgerSnapshot,
}

/// Apply every scenario step to one ledger, in order.
///
/// Denials are recorded and the run moves on; any other engine error
/// (unknown process, wrong vector length) aborts the run.
pub fn execute(path: &Path, format: OutputFormat) -> CliResult<()> {
    let scenario: ScenarioFile = load(path)?;
    let mut ledger = build(&scenario.config())?;

    let mut steps = Vec::with_capacity(scenario.steps.len());
    let (mut applied, mut denied) = (0, 0);

    for (i, step) in scenario.steps.iter().enumerate() {
        let result = match step {
            Step::Request { process, units } => ledger
                .request(ProcessId(*process), units)
                .map(|grant| Outcome::Granted {
                    sequence: grant.sequence,
                }),
            Step::Release { process, units } => ledger
                .release(ProcessId(*process), units)
                .map(|()| Outcome::Released),
            Step::Check => Ok(Outcome::Verdict {
                verdict: ledger.find_safe_sequence(),
            }),
            Step::Show => Ok(Outcome::State {
                state: ledger.snapshot(),
            }),
        };

        let outcome = match result {
            Ok(outcome) => {
                if matches!(outcome, Outcome::Granted { .. } | Outcome::Released) {
                    applied += 1;
                }
                outcome
            }
            Err(e) => match Outcome::denied(&e) {
                Some(outcome) => {
                    denied += 1;
                    outcome
                }
                None => return Err(e.into()),
            },
        };

        steps.push(StepReport {
            step: i + 1,
            operation: step.clone(),
            outcome,
        });
    }

    let report = RunReport {
        steps,
        applied,
        denied,
        final_state: ledger.snapshot(),
    };

    emit(format, &report, || {
        println!("{}", "Scenario".bold().cyan());
        for step in &report.steps {
            print!("{:>3}. {:<28} ", step.step, describe(&step.operation));
            step.outcome.print_table();
        }
        println!();
        println!(
            "{} applied, {} denied",
            report.applied.to_string().green(),
            report.denied.to_string().red()
        );
        println!("{}", snapshot_table(&report.final_state));
    })
}

fn describe(step: &Step) -> String {
    match step {
        Step::Request { process, units } => {
            format!("request {} [{}]", ProcessId(*process), join_units(units))
        }
        Step::Release { process, units } => {
            format!("release {} [{}]", ProcessId(*process), join_units(units))
        }
        Step::Check => "check".to_string(),
        Step::Show => "show".to_string(),
    }
}

fn join_units(units: &[Units]) -> String {
    units
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_steps() {
        let step = Step::Request {
            process: 1,
            units: vec![1, 0, 2],
        };
        assert_eq!(describe(&step), "request P1 [1,0,2]");
        assert_eq!(describe(&Step::Check), "check");
    }
}
