use banker_core::{ResourceState, Snapshot};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A valid snapshot with up to `max_processes` processes and 1..=4 resource
/// types. Allocation is drawn cellwise from `0..=Max`.
pub fn arb_snapshot(max_processes: usize) -> impl Strategy<Value = Snapshot> {
    (0usize..=max_processes, 1usize..=4)
        .prop_flat_map(|(n, m)| {
            (
                prop::collection::vec(0i64..=6, m),
                prop::collection::vec(prop::collection::vec(0i64..=6, m), n),
            )
        })
        .prop_flat_map(|(available, max)| {
            let allocation: Vec<Vec<_>> = max
                .iter()
                .map(|row| row.iter().map(|&cap| 0i64..=cap).collect())
                .collect();
            (Just(available), Just(max), allocation)
        })
        .prop_map(|(available, max, allocation)| Snapshot::new(available, max, allocation))
}

pub fn arb_state(max_processes: usize) -> impl Strategy<Value = ResourceState> {
    arb_snapshot(max_processes)
        .prop_map(|s| ResourceState::try_from(s).expect("generated snapshot is valid"))
}

// ---------------------------------------------------------------------------
// Oracle
// ---------------------------------------------------------------------------

/// Exhaustive search over finish orders, memoised on the finished set.
pub fn brute_force_is_safe(state: &ResourceState) -> bool {
    let n = state.process_count();
    let mut dead = vec![false; 1usize << n];
    search(state, 0, &mut dead)
}

fn search(state: &ResourceState, finished: usize, dead: &mut [bool]) -> bool {
    let n = state.process_count();
    if finished == (1usize << n) - 1 {
        return true;
    }
    if dead[finished] {
        return false;
    }

    let mut work = state.available().to_vec();
    for i in (0..n).filter(|i| finished & (1 << i) != 0) {
        for (w, a) in work.iter_mut().zip(&state.allocation()[i]) {
            *w += a;
        }
    }

    for i in (0..n).filter(|i| finished & (1 << i) == 0) {
        let fits = state.need()[i].iter().zip(&work).all(|(need, w)| need <= w);
        if fits && search(state, finished | (1 << i), dead) {
            return true;
        }
    }
    dead[finished] = true;
    false
}
