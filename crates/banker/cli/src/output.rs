//! Output formatting for CLI

use banker_core::{
    BankerError, LedgerSnapshot, ProcessId, ResourceId, SafeSequence, SafetyVerdict, Units,
};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a serializable report as JSON or YAML, or hand off to `table`.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, table: impl FnOnce()) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => table(),
    }
    Ok(())
}

/// Result of one request, release or inspection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Granted {
        sequence: SafeSequence,
    },
    Released,
    Denied {
        reason: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        blocked: Vec<ProcessId>,
    },
    Verdict {
        verdict: SafetyVerdict,
    },
    State {
        state: LedgerSnapshot,
    },
}

impl Outcome {
    /// `None` for errors that are not denials; those abort the command.
    pub fn denied(err: &BankerError) -> Option<Self> {
        let (reason, blocked) = match err {
            BankerError::ExceedsClaim { .. } => ("exceeds_claim", Vec::new()),
            BankerError::InsufficientResources { .. } => ("insufficient_resources", Vec::new()),
            BankerError::WouldDeadlock { blocked, .. } => ("would_deadlock", blocked.clone()),
            BankerError::ExceedsAllocation { .. } => ("exceeds_allocation", Vec::new()),
            _ => return None,
        };
        Some(Outcome::Denied {
            reason,
            message: err.to_string(),
            blocked,
        })
    }

    pub fn print_table(&self) {
        match self {
            Outcome::Granted { sequence } => {
                println!("{} safe sequence {}", "GRANTED".green().bold(), sequence);
            }
            Outcome::Released => println!("{}", "RELEASED".green().bold()),
            Outcome::Denied { reason, message, .. } => {
                println!("{} [{}] {}", "DENIED".red().bold(), reason, message);
            }
            Outcome::Verdict { verdict } => print_verdict(verdict),
            Outcome::State { state } => println!("{}", snapshot_table(state)),
        }
    }
}

pub fn print_verdict(verdict: &SafetyVerdict) {
    match verdict {
        SafetyVerdict::Safe { sequence } => {
            println!("{} safe sequence {}", "SAFE".green().bold(), sequence);
        }
        SafetyVerdict::Unsafe { blocked } => {
            let names: Vec<String> = blocked.iter().map(|p| p.to_string()).collect();
            println!("{} blocked: {}", "UNSAFE".red().bold(), names.join(", "));
        }
    }
}

/// Resource pool table followed by the per-process matrices.
pub fn snapshot_table(snapshot: &LedgerSnapshot) -> String {
    let mut pool = Builder::default();
    let mut header = vec![String::new()];
    header.extend((0..snapshot.resource_count()).map(|r| ResourceId(r).to_string()));
    pool.push_record(header);
    pool.push_record(labelled("Total", &snapshot.totals));
    pool.push_record(labelled("Available", &snapshot.available));

    let mut processes = Builder::default();
    processes.push_record(["Process", "Max claim", "Allocated", "Need"].map(String::from));
    for p in 0..snapshot.process_count() {
        processes.push_record(vec![
            ProcessId(p).to_string(),
            join(&snapshot.max_claim[p]),
            join(&snapshot.allocated[p]),
            join(&snapshot.need[p]),
        ]);
    }

    format!(
        "{}\n{}",
        pool.build().with(Style::rounded()),
        processes.build().with(Style::rounded())
    )
}

fn labelled(label: &str, units: &[Units]) -> Vec<String> {
    std::iter::once(label.to_string())
        .chain(units.iter().map(|u| u.to_string()))
        .collect()
}

fn join(units: &[Units]) -> String {
    units
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_reasons() {
        let err = BankerError::WouldDeadlock {
            process: ProcessId(0),
            blocked: vec![ProcessId(1)],
        };
        match Outcome::denied(&err) {
            Some(Outcome::Denied {
                reason, blocked, ..
            }) => {
                assert_eq!(reason, "would_deadlock");
                assert_eq!(blocked, vec![ProcessId(1)]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(Outcome::denied(&BankerError::NotConfigured).is_none());
    }

    #[test]
    fn outcome_json_shape() {
        let outcome = Outcome::Granted {
            sequence: SafeSequence(vec![ProcessId(1), ProcessId(0)]),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "granted");
        assert_eq!(json["sequence"], serde_json::json!([1, 0]));
    }

    #[test]
    fn table_lists_every_process() {
        let snapshot = LedgerSnapshot {
            totals: vec![4, 2],
            available: vec![3, 2],
            max_claim: vec![vec![2, 1], vec![4, 2]],
            allocated: vec![vec![1, 0], vec![0, 0]],
            need: vec![vec![1, 1], vec![4, 2]],
        };
        let table = snapshot_table(&snapshot);
        assert!(table.contains("Available"));
        assert!(table.contains("P1"));
        assert!(table.contains("4 2"));
    }
}
