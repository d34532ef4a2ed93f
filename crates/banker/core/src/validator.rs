use tracing::{info, warn};

use crate::config::{LedgerSpec, LimitsConfig};
use crate::error::{Bound, ValidationError};
use crate::ledger::{Cell, Ledger};
use crate::types::{ProcessId, ResourceId, Units};

/// Builds ledgers from operator input.
///
/// Construction is staged: totals, claims and allocations are checked into
/// local buffers and a `Ledger` only exists once every value is inside its
/// bound. A failed call therefore never yields a half-populated ledger, and
/// whatever ledger the caller already holds stays as it was.
///
/// No safety check runs here. An unsafe but well-formed starting state is
/// accepted; safety only matters relative to later requests.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Build a ledger from a parsed [`LedgerSpec`].
    pub fn build(&self, spec: &LedgerSpec) -> Result<Ledger, ValidationError> {
        self.configure(
            spec.processes,
            spec.resources,
            &spec.totals,
            &spec.max_claims,
            &spec.allocations,
        )
    }

    /// Validate and build a fresh ledger.
    ///
    /// Checks, in order: counts; totals against the unit ceiling; each claim
    /// against its resource total; each allocation against its claim and then
    /// against the units still unallocated after earlier processes. The first
    /// value outside its bound is reported. An empty `allocations` slice
    /// means nothing is allocated yet.
    pub fn configure(
        &self,
        process_count: usize,
        resource_count: usize,
        totals: &[Units],
        max_claims: &[Vec<Units>],
        allocations: &[Vec<Units>],
    ) -> Result<Ledger, ValidationError> {
        let result = self.stage(process_count, resource_count, totals, max_claims, allocations);
        match &result {
            Ok(_) => info!(
                processes = process_count,
                resources = resource_count,
                "Ledger configured"
            ),
            Err(e) => warn!(error = %e, "Ledger configuration rejected"),
        }
        result
    }

    fn stage(
        &self,
        process_count: usize,
        resource_count: usize,
        totals: &[Units],
        max_claims: &[Vec<Units>],
        allocations: &[Vec<Units>],
    ) -> Result<Ledger, ValidationError> {
        if process_count == 0 {
            return Err(ValidationError::NoProcesses);
        }
        if resource_count == 0 {
            return Err(ValidationError::NoResources);
        }
        if process_count > self.limits.max_processes {
            return Err(ValidationError::TooManyProcesses {
                count: process_count,
                limit: self.limits.max_processes,
            });
        }
        if resource_count > self.limits.max_resources {
            return Err(ValidationError::TooManyResources {
                count: resource_count,
                limit: self.limits.max_resources,
            });
        }

        check_len("totals", resource_count, totals.len())?;
        for (r, &total) in totals.iter().enumerate() {
            if total > self.limits.max_units {
                return Err(ValidationError::OutOfBound {
                    process: None,
                    resource: ResourceId(r),
                    value: total,
                    bound: Bound::UnitCeiling(self.limits.max_units),
                });
            }
        }

        check_len("max_claims rows", process_count, max_claims.len())?;
        for row in max_claims {
            check_len("max_claims columns", resource_count, row.len())?;
        }
        for (p, row) in max_claims.iter().enumerate() {
            for (r, &claim) in row.iter().enumerate() {
                if claim > totals[r] {
                    return Err(ValidationError::OutOfBound {
                        process: Some(ProcessId(p)),
                        resource: ResourceId(r),
                        value: claim,
                        bound: Bound::TotalUnits(totals[r]),
                    });
                }
            }
        }

        let no_allocations = allocations.is_empty();
        if !no_allocations {
            check_len("allocations rows", process_count, allocations.len())?;
            for row in allocations {
                check_len("allocations columns", resource_count, row.len())?;
            }
        }

        let mut available = totals.to_vec();
        let mut cells = Vec::with_capacity(process_count * resource_count);
        for (p, claims) in max_claims.iter().enumerate() {
            for (r, &claim) in claims.iter().enumerate() {
                let held = if no_allocations { 0 } else { allocations[p][r] };
                let bound = if held > claim {
                    Some(Bound::MaxClaim(claim))
                } else if held > available[r] {
                    Some(Bound::Available(available[r]))
                } else {
                    None
                };
                if let Some(bound) = bound {
                    return Err(ValidationError::OutOfBound {
                        process: Some(ProcessId(p)),
                        resource: ResourceId(r),
                        value: held,
                        bound,
                    });
                }
                available[r] -= held;
                cells.push(Cell::new(claim, held));
            }
        }

        Ok(Ledger::from_parts(
            process_count,
            resource_count,
            totals.to_vec(),
            available,
            cells,
        ))
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), ValidationError> {
    if expected != actual {
        return Err(ValidationError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Build a ledger with the default [`LimitsConfig`].
pub fn configure(
    process_count: usize,
    resource_count: usize,
    totals: &[Units],
    max_claims: &[Vec<Units>],
    allocations: &[Vec<Units>],
) -> Result<Ledger, ValidationError> {
    Validator::default().configure(process_count, resource_count, totals, max_claims, allocations)
}
