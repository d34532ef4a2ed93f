use tracing::{debug, info, warn};

use crate::error::BankerError;
use crate::ledger::Ledger;
use crate::safety::find_safe_sequence;
use crate::types::{Grant, ProcessId, ResourceId, SafetyVerdict, Units};

/// Evaluate a request by `process` for `units` and commit it if safe.
///
/// Denial reasons are checked in order, first failure wins:
/// 1. any `units[r] > need[r]` — `ExceedsClaim`
/// 2. any `units[r] > available[r]` — `InsufficientResources`
/// 3. the state after a tentative grant is unsafe — `WouldDeadlock`
///
/// The safety check always runs, even when the request exactly drains the
/// process's need or the pool. On `WouldDeadlock` the tentative grant is
/// rolled back to the exact prior values; no other process is touched.
pub fn request(
    ledger: &mut Ledger,
    process: ProcessId,
    units: &[Units],
) -> Result<Grant, BankerError> {
    ledger.check_operands(process, units)?;

    let view = ledger
        .process(process)
        .ok_or(BankerError::UnknownProcess {
            process,
            process_count: ledger.process_count(),
        })?;
    for (r, (&requested, &need)) in units.iter().zip(view.need().iter()).enumerate() {
        if requested > need {
            warn!(
                process = %process,
                resource = r,
                requested = requested,
                need = need,
                "Request exceeds remaining claim"
            );
            return Err(BankerError::ExceedsClaim {
                process,
                resource: ResourceId(r),
                requested,
                need,
            });
        }
    }

    for (r, (&requested, &available)) in units.iter().zip(ledger.available()).enumerate() {
        if requested > available {
            warn!(
                process = %process,
                resource = r,
                requested = requested,
                available = available,
                "Request exceeds available units"
            );
            return Err(BankerError::InsufficientResources {
                process,
                resource: ResourceId(r),
                requested,
                available,
            });
        }
    }

    let checkpoint = ledger.checkpoint(process);
    ledger.apply_grant(process, units)?;
    debug!(process = %process, units = ?units, "Tentative grant applied, checking safety");

    match find_safe_sequence(ledger) {
        SafetyVerdict::Safe { sequence } => {
            info!(
                process = %process,
                units = ?units,
                sequence = %sequence,
                "Request granted"
            );
            Ok(Grant {
                process,
                units: units.to_vec(),
                sequence,
            })
        }
        SafetyVerdict::Unsafe { blocked } => {
            ledger.restore(checkpoint);
            warn!(
                process = %process,
                units = ?units,
                blocked = ?blocked,
                "Request denied: resulting state is unsafe"
            );
            Err(BankerError::WouldDeadlock { process, blocked })
        }
    }
}
