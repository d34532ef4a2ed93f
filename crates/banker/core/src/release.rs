use tracing::{info, warn};

use crate::error::BankerError;
use crate::ledger::Ledger;
use crate::types::{ProcessId, ResourceId, Units};

/// Return `units` held by `process` to the pool.
///
/// Denied with `ExceedsAllocation` when any `units[r]` is more than the
/// process holds; nothing is changed in that case. A release only grows
/// `available`, so it can never make a safe state unsafe and no safety check
/// is run.
pub fn release(ledger: &mut Ledger, process: ProcessId, units: &[Units]) -> Result<(), BankerError> {
    ledger.check_operands(process, units)?;

    let view = ledger
        .process(process)
        .ok_or(BankerError::UnknownProcess {
            process,
            process_count: ledger.process_count(),
        })?;
    for (r, (&released, &allocated)) in units.iter().zip(view.allocated().iter()).enumerate() {
        if released > allocated {
            warn!(
                process = %process,
                resource = r,
                released = released,
                allocated = allocated,
                "Release exceeds allocation"
            );
            return Err(BankerError::ExceedsAllocation {
                process,
                resource: ResourceId(r),
                released,
                allocated,
            });
        }
    }

    ledger.apply_release(process, units)?;
    info!(process = %process, units = ?units, "Units released");
    Ok(())
}
