//! Resources are neither created nor destroyed.

use banker_core::{Banker, ProcessId, RequestOutcome, ResourceState};
use proptest::prelude::*;

use crate::strategies::arb_state;

fn committed_excluding(state: &ResourceState, released: &[bool]) -> Vec<u64> {
    let mut sums = state.available().to_vec();
    for (i, row) in state.allocation().iter().enumerate() {
        if released[i] {
            continue;
        }
        for (sum, held) in sums.iter_mut().zip(row) {
            *sum += held;
        }
    }
    sums
}

proptest! {
    /// Available plus what unreleased processes hold stays constant.
    #[test]
    fn release_conserves_resources(
        (state, released) in arb_state(6).prop_flat_map(|s| {
            let n = s.process_count();
            (Just(s), prop::collection::vec(any::<bool>(), n))
        })
    ) {
        let before = state.committed();
        let mut work = state.clone();
        for (i, &release) in released.iter().enumerate() {
            if release {
                work.release(ProcessId(i)).unwrap();
            }
        }
        prop_assert_eq!(committed_excluding(&work, &released), before);
    }

    /// A granted request keeps the state safe; a denied one changes nothing.
    #[test]
    fn requests_commit_safely_or_roll_back(
        (state, pid, request) in arb_state(5)
            .prop_filter("needs a process", |s| s.process_count() > 0)
            .prop_flat_map(|s| {
                let n = s.process_count();
                let m = s.resource_count();
                (Just(s), 0..n, prop::collection::vec(0i64..=3, m))
            })
    ) {
        let was_safe = banker_core::evaluate(&state).is_safe();
        let mut banker = Banker::new(state.clone());

        let granted = match banker.request(ProcessId(pid), &request).unwrap() {
            RequestOutcome::Granted { sequence } => {
                prop_assert!(banker_core::replay(banker.state(), &sequence).is_ok());
                prop_assert!(banker.evaluate().is_safe());
                true
            }
            RequestOutcome::Denied(_) => {
                prop_assert_eq!(banker.state(), &state);
                false
            }
        };
        prop_assert_eq!(banker.state().committed(), state.committed());
        // Granting only shrinks Available, so an unsafe state stays unsafe.
        if !was_safe {
            prop_assert!(!granted);
        }
    }
}
