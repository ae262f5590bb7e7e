//! Soundness, completeness and termination of the safety evaluator.

use banker_core::{
    evaluate, replay, BankerError, EvaluatorConfig, ProcessId, ResourceState, SafetyEvaluator,
    ScanOrder, Snapshot, Verdict,
};
use proptest::prelude::*;

use crate::strategies::{arb_snapshot, arb_state, brute_force_is_safe};

proptest! {
    /// Need is Max - Allocation and never negative.
    #[test]
    fn need_is_never_negative(state in arb_state(6)) {
        for i in 0..state.process_count() {
            for j in 0..state.resource_count() {
                prop_assert_eq!(state.need()[i][j], state.max()[i][j] - state.allocation()[i][j]);
            }
        }
    }

    /// Pushing any allocation cell above its max is rejected.
    #[test]
    fn over_allocation_is_rejected(
        snapshot in arb_snapshot(6).prop_filter("needs a process", |s| !s.max.is_empty()),
        row in any::<prop::sample::Index>(),
        column in any::<prop::sample::Index>(),
        excess in 1i64..5,
    ) {
        let mut snapshot: Snapshot = snapshot;
        let i = row.index(snapshot.max.len());
        let j = column.index(snapshot.available.len());
        snapshot.allocation[i][j] = snapshot.max[i][j] + excess;

        let err = ResourceState::try_from(snapshot).unwrap_err();
        let is_over_allocation = matches!(err, BankerError::OverAllocation { .. });
        prop_assert!(is_over_allocation);
    }

    /// A SAFE sequence replays step by step against the original snapshot.
    #[test]
    fn safe_sequences_replay(state in arb_state(6)) {
        let report = evaluate(&state);
        if report.is_safe() {
            prop_assert!(replay(&state, &report.sequence).is_ok());
            let mut ids = report.sequence.clone();
            ids.sort();
            let expected: Vec<ProcessId> = state.processes().collect();
            prop_assert_eq!(ids, expected);
        }
        prop_assert!(report.verify(&state).is_ok());
    }

    /// The verdict agrees with exhaustive search.
    #[test]
    fn verdict_matches_brute_force(state in arb_state(6)) {
        let report = evaluate(&state);
        prop_assert_eq!(report.is_safe(), brute_force_is_safe(&state));
    }

    /// Scan order changes the sequence at most, never the verdict.
    #[test]
    fn verdict_independent_of_scan_order(state in arb_state(6)) {
        let descending = SafetyEvaluator::new(EvaluatorConfig {
            scan_order: ScanOrder::Descending,
            record_trace: false,
        });
        prop_assert_eq!(evaluate(&state).verdict, descending.evaluate(&state).verdict);
    }

    /// At most n(n+1)/2 checks to finish everything plus one stalled pass.
    #[test]
    fn evaluation_is_bounded(state in arb_state(8)) {
        let n = state.process_count();
        let report = evaluate(&state);
        prop_assert!(report.checks <= n * (n + 1) / 2 + n);
    }

    /// Validation is a pure function of its input.
    #[test]
    fn construction_is_deterministic(snapshot in arb_snapshot(6)) {
        let a = ResourceState::try_from(&snapshot).unwrap();
        let b = ResourceState::try_from(&snapshot).unwrap();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn adversarial_stall_reports_unsafe() {
    // P0..P3 each need one more of everything than will ever be free; only
    // P4 can finish and it holds nothing.
    let mut max = vec![vec![5, 5, 5]; 4];
    max.push(vec![1, 1, 1]);
    let mut allocation = vec![vec![1, 1, 1]; 4];
    allocation.push(vec![0, 0, 0]);
    let state = ResourceState::new(vec![1, 1, 1], max, allocation).unwrap();

    let report = evaluate(&state);
    assert_eq!(report.verdict, Verdict::Unsafe);
    assert_eq!(report.sequence, vec![ProcessId(4)]);
    assert_eq!(
        report.blocked,
        vec![ProcessId(0), ProcessId(1), ProcessId(2), ProcessId(3)]
    );
    assert!(report.checks <= 5 * 6 / 2 + 5);
}
