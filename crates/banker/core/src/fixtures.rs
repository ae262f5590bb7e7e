//! Shared test snapshots.

use crate::types::Snapshot;

pub const TEXTBOOK_AVAILABLE: [i64; 3] = [3, 3, 2];

pub const TEXTBOOK_MAX: [[i64; 3]; 5] = [[7, 5, 3], [3, 2, 2], [9, 0, 2], [2, 2, 2], [4, 3, 3]];

pub const TEXTBOOK_ALLOCATION: [[i64; 3]; 5] =
    [[0, 1, 0], [2, 0, 0], [3, 0, 2], [2, 1, 1], [0, 0, 2]];

/// Five processes, three resource types; safe, with P1 and P3 able to
/// finish first.
pub fn textbook_snapshot() -> Snapshot {
    textbook_with_available(TEXTBOOK_AVAILABLE.to_vec())
}

pub fn textbook_with_available(available: Vec<i64>) -> Snapshot {
    Snapshot::new(
        available,
        TEXTBOOK_MAX.iter().map(|r| r.to_vec()).collect(),
        TEXTBOOK_ALLOCATION.iter().map(|r| r.to_vec()).collect(),
    )
}
