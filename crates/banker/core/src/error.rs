use std::fmt;

use thiserror::Error;

use crate::types::{ProcessId, ResourceId, Units};

/// The bound a configuration value was checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// Configured per-resource unit ceiling (applies to totals).
    UnitCeiling(Units),
    /// Total units of the resource (applies to claims).
    TotalUnits(Units),
    /// The process's own declared claim (applies to allocations).
    MaxClaim(Units),
    /// Units still unallocated after earlier processes (applies to allocations).
    Available(Units),
}

impl Bound {
    pub fn limit(self) -> Units {
        match self {
            Bound::UnitCeiling(n) | Bound::TotalUnits(n) | Bound::MaxClaim(n) | Bound::Available(n) => n,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::UnitCeiling(n) => write!(f, "unit ceiling {}", n),
            Bound::TotalUnits(n) => write!(f, "total units {}", n),
            Bound::MaxClaim(n) => write!(f, "max claim {}", n),
            Bound::Available(n) => write!(f, "available units {}", n),
        }
    }
}

/// Ledger quantity named in arithmetic errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    Available,
    Allocated,
    Need,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Available => write!(f, "available"),
            Quantity::Allocated => write!(f, "allocated"),
            Quantity::Need => write!(f, "need"),
        }
    }
}

/// A configuration rejected while building a ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one process is required")]
    NoProcesses,

    #[error("at least one resource type is required")]
    NoResources,

    #[error("{count} processes exceeds the configured limit of {limit}")]
    TooManyProcesses { count: usize, limit: usize },

    #[error("{count} resource types exceeds the configured limit of {limit}")]
    TooManyResources { count: usize, limit: usize },

    #[error("{what}: expected {expected} entries, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{}value {value} for resource {resource} exceeds {bound}", process_prefix(.process))]
    OutOfBound {
        process: Option<ProcessId>,
        resource: ResourceId,
        value: Units,
        bound: Bound,
    },
}

fn process_prefix(process: &Option<ProcessId>) -> String {
    match process {
        Some(p) => format!("process {}: ", p),
        None => String::new(),
    }
}

/// Errors from ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankerError {
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    // --- Request denials ---
    #[error("process {process} requested {requested} of {resource}, exceeding its remaining claim {need}")]
    ExceedsClaim {
        process: ProcessId,
        resource: ResourceId,
        requested: Units,
        need: Units,
    },

    #[error("process {process} requested {requested} of {resource}, only {available} available")]
    InsufficientResources {
        process: ProcessId,
        resource: ResourceId,
        requested: Units,
        available: Units,
    },

    #[error("granting process {process} would leave the system unsafe; blocked: {}", list_processes(.blocked))]
    WouldDeadlock {
        process: ProcessId,
        blocked: Vec<ProcessId>,
    },

    // --- Release denials ---
    #[error("process {process} released {released} of {resource} but holds only {allocated}")]
    ExceedsAllocation {
        process: ProcessId,
        resource: ResourceId,
        released: Units,
        allocated: Units,
    },

    // --- Arithmetic ---
    #[error("{quantity} of {resource} would overflow")]
    ArithmeticOverflow {
        quantity: Quantity,
        process: Option<ProcessId>,
        resource: ResourceId,
    },

    #[error("{quantity} of {resource} would underflow")]
    ArithmeticUnderflow {
        quantity: Quantity,
        process: Option<ProcessId>,
        resource: ResourceId,
    },

    // --- Misuse ---
    #[error("unknown process {process}: ledger has {process_count} processes")]
    UnknownProcess {
        process: ProcessId,
        process_count: usize,
    },

    #[error("unit vector has {actual} entries, ledger has {expected} resource types")]
    VectorLength { expected: usize, actual: usize },

    #[error("ledger has not been configured")]
    NotConfigured,

    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("ledger invariant violated: {detail}")]
    InvariantViolation { detail: String },
}

impl BankerError {
    /// Denials are expected outcomes of a well-formed request or release;
    /// the ledger is untouched and the caller may simply try again later.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            BankerError::ExceedsClaim { .. }
                | BankerError::InsufficientResources { .. }
                | BankerError::WouldDeadlock { .. }
                | BankerError::ExceedsAllocation { .. }
        )
    }
}

fn list_processes(processes: &[ProcessId]) -> String {
    processes
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
