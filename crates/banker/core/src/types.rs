use std::fmt;

use serde::{Deserialize, Serialize};

/// Count of interchangeable units of one resource type.
pub type Units = u64;

/// Zero-based index of a process row in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub usize);

impl ProcessId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl From<usize> for ProcessId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Zero-based index of a resource type in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub usize);

impl ResourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

impl From<usize> for ResourceId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// An order in which every process can run to completion.
///
/// Witnesses that a ledger state is safe. Deterministic for a given state:
/// the checker always picks the lowest eligible index first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafeSequence(pub Vec<ProcessId>);

impl SafeSequence {
    pub fn as_slice(&self) -> &[ProcessId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw indices, handy for comparisons in reports and tests.
    pub fn indices(&self) -> Vec<usize> {
        self.0.iter().map(|p| p.index()).collect()
    }
}

impl fmt::Display for SafeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ">")
    }
}

/// Outcome of the safety check over one ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SafetyVerdict {
    /// Every process can finish; `sequence` is one order that proves it.
    Safe { sequence: SafeSequence },
    /// The scan stalled; `blocked` lists the processes left unfinished, ascending.
    Unsafe { blocked: Vec<ProcessId> },
}

impl SafetyVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyVerdict::Safe { .. })
    }

    pub fn sequence(&self) -> Option<&SafeSequence> {
        match self {
            SafetyVerdict::Safe { sequence } => Some(sequence),
            SafetyVerdict::Unsafe { .. } => None,
        }
    }

    /// Processes that could not finish. Empty for a safe state.
    pub fn blocked(&self) -> &[ProcessId] {
        match self {
            SafetyVerdict::Safe { .. } => &[],
            SafetyVerdict::Unsafe { blocked } => blocked,
        }
    }
}

/// A committed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub process: ProcessId,
    pub units: Vec<Units>,
    /// Safe sequence of the state after the grant.
    pub sequence: SafeSequence,
}

/// Read-only copy of the whole ledger, laid out as row-per-process matrices.
///
/// This is what display and reporting consume; nothing written here flows
/// back into the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub totals: Vec<Units>,
    pub available: Vec<Units>,
    pub max_claim: Vec<Vec<Units>>,
    pub allocated: Vec<Vec<Units>>,
    pub need: Vec<Vec<Units>>,
}

impl LedgerSnapshot {
    pub fn process_count(&self) -> usize {
        self.max_claim.len()
    }

    pub fn resource_count(&self) -> usize {
        self.totals.len()
    }
}
