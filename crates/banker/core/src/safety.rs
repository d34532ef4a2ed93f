//! Safety check: can every process still finish from this state?

use tracing::debug;

use crate::ledger::Ledger;
use crate::types::{ProcessId, SafeSequence, SafetyVerdict, Units};

/// Decide whether `ledger` is in a safe state.
///
/// Classical work/finish scan. Each pass walks processes from index 0 and
/// picks the first unfinished one whose whole remaining need fits in `work`;
/// that process is assumed to run to completion and hand back everything it
/// holds. The scan then restarts from index 0. When a full pass finds no
/// candidate the scan stops: all finished means safe, anything left is the
/// blocked set.
///
/// Pure over the ledger; the sequence is deterministic for a given state.
pub fn find_safe_sequence(ledger: &Ledger) -> SafetyVerdict {
    let mut work: Vec<Units> = ledger.available().to_vec();
    let mut finished = vec![false; ledger.process_count()];
    let mut sequence = Vec::with_capacity(ledger.process_count());

    while let Some(view) = ledger
        .processes()
        .find(|p| !finished[p.id().index()] && p.can_finish_with(&work))
    {
        // work never exceeds the resource totals, so this cannot saturate
        for (w, cell) in work.iter_mut().zip(view.cells()) {
            *w = w.saturating_add(cell.allocated);
        }
        finished[view.id().index()] = true;
        sequence.push(view.id());
        debug!(process = %view.id(), work = ?work, "Process can finish");
    }

    if sequence.len() == ledger.process_count() {
        SafetyVerdict::Safe {
            sequence: SafeSequence(sequence),
        }
    } else {
        let blocked: Vec<ProcessId> = finished
            .iter()
            .enumerate()
            .filter(|(_, done)| !**done)
            .map(|(p, _)| ProcessId(p))
            .collect();
        debug!(blocked = ?blocked, "State is unsafe");
        SafetyVerdict::Unsafe { blocked }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::configure;

    #[test]
    fn restarts_scan_from_lowest_index() {
        let ledger = configure(
            3,
            1,
            &[4],
            &[vec![3], vec![2], vec![1]],
            &[vec![1], vec![1], vec![0]],
        )
        .unwrap();
        // available 2: P0 needs 2 -> eligible immediately
        assert_eq!(
            ledger.find_safe_sequence().sequence().unwrap().indices(),
            vec![0, 1, 2]
        );

        let ledger = configure(
            3,
            1,
            &[4],
            &[vec![4], vec![2], vec![1]],
            &[vec![1], vec![1], vec![0]],
        )
        .unwrap();
        // available 2: P0 needs 3, P1 needs 1. Once P1 returns its unit the
        // next pass starts over at P0, ahead of the also-eligible P2.
        assert_eq!(
            ledger.find_safe_sequence().sequence().unwrap().indices(),
            vec![1, 0, 2]
        );
    }

    #[test]
    fn zero_need_processes_finish_immediately() {
        let ledger = configure(2, 1, &[2], &[vec![0], vec![2]], &[]).unwrap();
        assert_eq!(
            find_safe_sequence(&ledger).sequence().unwrap().indices(),
            vec![0, 1]
        );
    }

    #[test]
    fn reports_blocked_processes() {
        // P0 can finish on its own; P1 and P2 each wait for the other's unit.
        let ledger = configure(
            3,
            2,
            &[1, 2],
            &[vec![1, 0], vec![0, 2], vec![0, 2]],
            &[vec![0, 0], vec![0, 1], vec![0, 1]],
        )
        .unwrap();
        let verdict = find_safe_sequence(&ledger);
        assert_eq!(verdict.blocked(), &[ProcessId(1), ProcessId(2)]);
    }

    #[test]
    fn does_not_mutate_ledger() {
        let ledger = configure(2, 1, &[3], &[vec![2], vec![3]], &[vec![1], vec![1]]).unwrap();
        let before = ledger.clone();
        let _ = find_safe_sequence(&ledger);
        assert_eq!(ledger, before);
    }
}
