//! Configuration and scenario file loading

use std::path::Path;

use banker_core::{BankerConfig, Ledger, LedgerSpec, LimitsConfig, Units, Validator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// A ledger configuration plus an ordered list of operations to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub limits: LimitsConfig,

    pub ledger: LedgerSpec,

    #[serde(default)]
    pub steps: Vec<Step>,
}

impl ScenarioFile {
    pub fn config(&self) -> BankerConfig {
        BankerConfig {
            limits: self.limits.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

/// One scenario operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    Request { process: usize, units: Vec<Units> },
    Release { process: usize, units: Vec<Units> },
    Check,
    Show,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Toml,
    Yaml,
    Json,
}

fn format_of(path: &Path) -> CliResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(Format::Toml),
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(CliError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Parse a document, picking the format from the file extension.
pub fn load<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let format = format_of(path)?;
    let text = std::fs::read_to_string(path)?;
    Ok(match format {
        Format::Toml => toml::from_str(&text)?,
        Format::Yaml => serde_yaml::from_str(&text)?,
        Format::Json => serde_json::from_str(&text)?,
    })
}

/// Load a configuration file and validate it into a ledger.
pub fn load_ledger(path: &Path) -> CliResult<Ledger> {
    let config: BankerConfig = load(path)?;
    build(&config)
}

pub fn build(config: &BankerConfig) -> CliResult<Ledger> {
    Ok(Validator::new(config.limits.clone()).build(&config.ledger)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_parse_from_toml() {
        let scenario: ScenarioFile = toml::from_str(
            r#"
            [ledger]
            processes = 2
            resources = 1
            totals = [3]
            max_claims = [[2], [3]]

            [[steps]]
            action = "request"
            process = 0
            units = [1]

            [[steps]]
            action = "check"
            "#,
        )
        .unwrap();

        assert_eq!(
            scenario.steps,
            vec![
                Step::Request {
                    process: 0,
                    units: vec![1]
                },
                Step::Check
            ]
        );
        assert!(build(&scenario.config()).is_ok());
    }

    #[test]
    fn steps_parse_from_yaml() {
        let scenario: ScenarioFile = serde_yaml::from_str(
            r#"
ledger:
  processes: 1
  resources: 1
  totals: [2]
  max_claims: [[2]]
  allocations: [[1]]
steps:
  - action: release
    process: 0
    units: [1]
  - action: show
"#,
        )
        .unwrap();

        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.steps[1], Step::Show);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load::<BankerConfig>(Path::new("ledger.ini")).unwrap_err();
        assert!(matches!(err, CliError::UnsupportedFormat(_)));
        assert_eq!(format_of(Path::new("a.yml")).unwrap(), Format::Yaml);
    }
}
