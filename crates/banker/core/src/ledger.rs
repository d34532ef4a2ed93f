use tracing::debug;

use crate::error::{BankerError, Quantity};
use crate::safety;
use crate::types::{Grant, LedgerSnapshot, ProcessId, ResourceId, SafetyVerdict, Units};

/// One `(process, resource)` entry. `need` is kept in lockstep with the
/// other two: `need == max_claim - allocated` at all times.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) max_claim: Units,
    pub(crate) allocated: Units,
    pub(crate) need: Units,
}

impl Cell {
    /// Caller guarantees `allocated <= max_claim`.
    pub(crate) fn new(max_claim: Units, allocated: Units) -> Self {
        Self {
            max_claim,
            allocated,
            need: max_claim - allocated,
        }
    }
}

/// Resource-allocation ledger.
///
/// Owns per-resource totals and availability and a single row-major table
/// of claim / allocation / need cells indexed by `(process, resource)`.
/// Built only through the validator, so every `Ledger` value starts out
/// satisfying the invariants; every mutator keeps them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    process_count: usize,
    resource_count: usize,
    totals: Vec<Units>,
    available: Vec<Units>,
    cells: Vec<Cell>,
}

/// Values overwritten by a tentative grant, for exact rollback.
pub(crate) struct RowCheckpoint {
    process: usize,
    available: Vec<Units>,
    row: Vec<Cell>,
}

impl Ledger {
    pub(crate) fn from_parts(
        process_count: usize,
        resource_count: usize,
        totals: Vec<Units>,
        available: Vec<Units>,
        cells: Vec<Cell>,
    ) -> Self {
        debug_assert_eq!(cells.len(), process_count * resource_count);
        Self {
            process_count,
            resource_count,
            totals,
            available,
            cells,
        }
    }

    pub fn process_count(&self) -> usize {
        self.process_count
    }

    pub fn resource_count(&self) -> usize {
        self.resource_count
    }

    pub fn totals(&self) -> &[Units] {
        &self.totals
    }

    pub fn available(&self) -> &[Units] {
        &self.available
    }

    /// Read-only view of one process, `None` when out of range.
    pub fn process(&self, process: ProcessId) -> Option<ProcessView<'_>> {
        (process.index() < self.process_count).then(|| ProcessView {
            id: process,
            cells: self.row(process.index()),
        })
    }

    /// Views of every process in index order.
    pub fn processes(&self) -> impl Iterator<Item = ProcessView<'_>> + '_ {
        self.cells
            .chunks_exact(self.resource_count)
            .enumerate()
            .map(|(i, cells)| ProcessView {
                id: ProcessId(i),
                cells,
            })
    }

    pub(crate) fn row(&self, process: usize) -> &[Cell] {
        let start = process * self.resource_count;
        &self.cells[start..start + self.resource_count]
    }

    /// Check that `process` exists and `units` has one entry per resource.
    pub(crate) fn check_operands(
        &self,
        process: ProcessId,
        units: &[Units],
    ) -> Result<(), BankerError> {
        if process.index() >= self.process_count {
            return Err(BankerError::UnknownProcess {
                process,
                process_count: self.process_count,
            });
        }
        if units.len() != self.resource_count {
            return Err(BankerError::VectorLength {
                expected: self.resource_count,
                actual: units.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn checkpoint(&self, process: ProcessId) -> RowCheckpoint {
        RowCheckpoint {
            process: process.index(),
            available: self.available.clone(),
            row: self.row(process.index()).to_vec(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: RowCheckpoint) {
        let start = checkpoint.process * self.resource_count;
        self.cells[start..start + self.resource_count].copy_from_slice(&checkpoint.row);
        self.available = checkpoint.available;
    }

    /// Move `units` from the pool to `process`.
    ///
    /// Every new value is computed with checked arithmetic before any field
    /// is written, so an error leaves the ledger untouched.
    pub(crate) fn apply_grant(
        &mut self,
        process: ProcessId,
        units: &[Units],
    ) -> Result<(), BankerError> {
        let start = process.index() * self.resource_count;
        let mut staged = Vec::with_capacity(self.resource_count);

        for (r, &amount) in units.iter().enumerate() {
            let resource = ResourceId(r);
            let cell = self.cells[start + r];
            let available = self.available[r].checked_sub(amount).ok_or(
                BankerError::ArithmeticUnderflow {
                    quantity: Quantity::Available,
                    process: None,
                    resource,
                },
            )?;
            let allocated =
                cell.allocated
                    .checked_add(amount)
                    .ok_or(BankerError::ArithmeticOverflow {
                        quantity: Quantity::Allocated,
                        process: Some(process),
                        resource,
                    })?;
            let need = cell
                .need
                .checked_sub(amount)
                .ok_or(BankerError::ArithmeticUnderflow {
                    quantity: Quantity::Need,
                    process: Some(process),
                    resource,
                })?;
            staged.push((available, Cell { allocated, need, ..cell }));
        }

        self.commit_row(start, staged);
        debug!(process = %process, units = ?units, "Applied allocation");
        Ok(())
    }

    /// Move `units` from `process` back to the pool. Same staging as
    /// [`apply_grant`](Self::apply_grant).
    pub(crate) fn apply_release(
        &mut self,
        process: ProcessId,
        units: &[Units],
    ) -> Result<(), BankerError> {
        let start = process.index() * self.resource_count;
        let mut staged = Vec::with_capacity(self.resource_count);

        for (r, &amount) in units.iter().enumerate() {
            let resource = ResourceId(r);
            let cell = self.cells[start + r];
            let available = self.available[r]
                .checked_add(amount)
                .filter(|&a| a <= self.totals[r])
                .ok_or(BankerError::ArithmeticOverflow {
                    quantity: Quantity::Available,
                    process: None,
                    resource,
                })?;
            let allocated =
                cell.allocated
                    .checked_sub(amount)
                    .ok_or(BankerError::ArithmeticUnderflow {
                        quantity: Quantity::Allocated,
                        process: Some(process),
                        resource,
                    })?;
            let need = cell
                .need
                .checked_add(amount)
                .filter(|&n| n <= cell.max_claim)
                .ok_or(BankerError::ArithmeticOverflow {
                    quantity: Quantity::Need,
                    process: Some(process),
                    resource,
                })?;
            staged.push((available, Cell { allocated, need, ..cell }));
        }

        self.commit_row(start, staged);
        debug!(process = %process, units = ?units, "Applied release");
        Ok(())
    }

    fn commit_row(&mut self, start: usize, staged: Vec<(Units, Cell)>) {
        for (r, (available, cell)) in staged.into_iter().enumerate() {
            self.available[r] = available;
            self.cells[start + r] = cell;
        }
    }

    /// Copy the ledger out as plain matrices.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let matrix = |f: fn(&Cell) -> Units| -> Vec<Vec<Units>> {
            self.cells
                .chunks_exact(self.resource_count)
                .map(|row| row.iter().map(f).collect())
                .collect()
        };

        LedgerSnapshot {
            totals: self.totals.clone(),
            available: self.available.clone(),
            max_claim: matrix(|c| c.max_claim),
            allocated: matrix(|c| c.allocated),
            need: matrix(|c| c.need),
        }
    }

    /// Audit the three ledger invariants, reporting the first one broken.
    pub fn verify_invariants(&self) -> Result<(), BankerError> {
        let violation = |detail: String| BankerError::InvariantViolation { detail };

        if self.totals.len() != self.resource_count
            || self.available.len() != self.resource_count
            || self.cells.len() != self.process_count * self.resource_count
        {
            return Err(violation("table dimensions disagree with counts".into()));
        }

        for r in 0..self.resource_count {
            let mut held: Units = 0;
            for p in 0..self.process_count {
                let cell = self.cells[p * self.resource_count + r];
                if cell.allocated > cell.max_claim || cell.max_claim > self.totals[r] {
                    return Err(violation(format!(
                        "{} on {}: allocated {} / claim {} / total {} out of order",
                        ProcessId(p),
                        ResourceId(r),
                        cell.allocated,
                        cell.max_claim,
                        self.totals[r]
                    )));
                }
                if cell.need != cell.max_claim - cell.allocated {
                    return Err(violation(format!(
                        "{} on {}: need {} != claim {} - allocated {}",
                        ProcessId(p),
                        ResourceId(r),
                        cell.need,
                        cell.max_claim,
                        cell.allocated
                    )));
                }
                held = held
                    .checked_add(cell.allocated)
                    .ok_or_else(|| violation(format!("allocations of {} overflow", ResourceId(r))))?;
            }
            if self.available[r].checked_add(held) != Some(self.totals[r]) {
                return Err(violation(format!(
                    "{}: available {} + allocated {} != total {}",
                    ResourceId(r),
                    self.available[r],
                    held,
                    self.totals[r]
                )));
            }
        }

        Ok(())
    }

    /// See [`safety::find_safe_sequence`].
    pub fn find_safe_sequence(&self) -> SafetyVerdict {
        safety::find_safe_sequence(self)
    }

    /// See [`crate::request::request`].
    pub fn request(&mut self, process: ProcessId, units: &[Units]) -> Result<Grant, BankerError> {
        crate::request::request(self, process, units)
    }

    /// See [`crate::release::release`].
    pub fn release(&mut self, process: ProcessId, units: &[Units]) -> Result<(), BankerError> {
        crate::release::release(self, process, units)
    }
}

/// Borrowed view of one process row.
#[derive(Clone, Copy, Debug)]
pub struct ProcessView<'a> {
    id: ProcessId,
    cells: &'a [Cell],
}

impl<'a> ProcessView<'a> {
    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn max_claim(&self) -> Vec<Units> {
        self.cells.iter().map(|c| c.max_claim).collect()
    }

    pub fn allocated(&self) -> Vec<Units> {
        self.cells.iter().map(|c| c.allocated).collect()
    }

    pub fn need(&self) -> Vec<Units> {
        self.cells.iter().map(|c| c.need).collect()
    }

    /// Holds no units of any resource.
    pub fn is_idle(&self) -> bool {
        self.cells.iter().all(|c| c.allocated == 0)
    }

    /// Whether the remaining need fits inside `work` on every resource.
    pub fn can_finish_with(&self, work: &[Units]) -> bool {
        self.cells.iter().zip(work).all(|(c, &w)| c.need <= w)
    }

    pub(crate) fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::configure;

    fn small() -> Ledger {
        configure(2, 2, &[4, 3], &[vec![3, 2], vec![2, 3]], &[vec![1, 1], vec![1, 0]]).unwrap()
    }

    #[test]
    fn snapshot_reflects_configuration() {
        let snap = small().snapshot();
        assert_eq!(snap.totals, vec![4, 3]);
        assert_eq!(snap.available, vec![2, 2]);
        assert_eq!(snap.max_claim, vec![vec![3, 2], vec![2, 3]]);
        assert_eq!(snap.allocated, vec![vec![1, 1], vec![1, 0]]);
        assert_eq!(snap.need, vec![vec![2, 1], vec![1, 3]]);
        assert_eq!(snap.process_count(), 2);
        assert_eq!(snap.resource_count(), 2);
    }

    #[test]
    fn process_view() {
        let ledger = small();
        let p1 = ledger.process(ProcessId(1)).unwrap();
        assert_eq!(p1.id(), ProcessId(1));
        assert_eq!(p1.need(), vec![1, 3]);
        assert!(!p1.is_idle());
        assert!(p1.can_finish_with(&[1, 3]));
        assert!(!p1.can_finish_with(&[1, 2]));
        assert!(ledger.process(ProcessId(2)).is_none());
        assert_eq!(ledger.processes().count(), 2);
    }

    #[test]
    fn grant_then_release_is_exact() {
        let mut ledger = small();
        let before = ledger.clone();

        ledger.apply_grant(ProcessId(0), &[1, 1]).unwrap();
        assert_eq!(ledger.available(), &[1, 1]);
        assert_eq!(ledger.process(ProcessId(0)).unwrap().need(), vec![1, 0]);
        ledger.verify_invariants().unwrap();

        ledger.apply_release(ProcessId(0), &[1, 1]).unwrap();
        assert_eq!(ledger, before);
    }

    #[test]
    fn grant_past_need_underflows_without_writing() {
        let mut ledger = small();
        let before = ledger.clone();

        // need[0][1] is 1; the first column would succeed on its own
        let err = ledger.apply_grant(ProcessId(0), &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            BankerError::ArithmeticUnderflow {
                quantity: Quantity::Need,
                process: Some(ProcessId(0)),
                resource: ResourceId(1),
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn release_past_allocation_underflows() {
        let mut ledger = small();
        let before = ledger.clone();

        let err = ledger.apply_release(ProcessId(1), &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            BankerError::ArithmeticUnderflow {
                quantity: Quantity::Allocated,
                ..
            }
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn checkpoint_restores_exactly() {
        let mut ledger = small();
        let before = ledger.clone();

        let checkpoint = ledger.checkpoint(ProcessId(1));
        ledger.apply_grant(ProcessId(1), &[1, 2]).unwrap();
        assert_ne!(ledger, before);
        ledger.restore(checkpoint);
        assert_eq!(ledger, before);
    }

    #[test]
    fn operand_checks() {
        let ledger = small();
        assert!(matches!(
            ledger.check_operands(ProcessId(5), &[0, 0]),
            Err(BankerError::UnknownProcess { process_count: 2, .. })
        ));
        assert_eq!(
            ledger.check_operands(ProcessId(0), &[0]),
            Err(BankerError::VectorLength {
                expected: 2,
                actual: 1
            })
        );
        assert!(ledger.check_operands(ProcessId(1), &[0, 0]).is_ok());
    }

    #[test]
    fn audit_catches_corruption() {
        let mut ledger = small();
        ledger.verify_invariants().unwrap();

        ledger.available[0] += 1;
        assert!(matches!(
            ledger.verify_invariants(),
            Err(BankerError::InvariantViolation { .. })
        ));

        let mut ledger = small();
        ledger.cells[0].need = 0;
        let err = ledger.verify_invariants().unwrap_err();
        assert!(err.to_string().contains("need"));
    }
}
