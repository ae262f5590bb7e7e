//! # banker-core
//!
//! Deadlock avoidance with Banker's Algorithm.
//!
//! Given a snapshot of free resources (Available), each process's declared
//! maximum demand (Max) and what it currently holds (Allocation), decide
//! whether some order lets every process finish, and produce that order.
//!
//! ## Invariants
//!
//! - Every matrix is `n × m`; Available has `m` entries; nothing is negative.
//! - `Allocation <= Max` cellwise, so `Need = Max - Allocation >= 0`.
//! - `Available + sum(Allocation)` never exceeds system capacity.
//! - Evaluation always terminates, in `O(n² · m)`; UNSAFE is a result, not
//!   an error.
//!
//! ## Components
//!
//! - **ResourceState** — validated snapshot plus derived Need
//! - **SafetyEvaluator** — cyclic scan for a safe sequence
//! - **Banker** — grant/deny requests with rollback
//! - **SharedBanker** — `Banker` behind a mutex for concurrent callers
//! - **SnapshotGenerator** — seeded random valid snapshots

pub mod banker;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod shared;
pub mod state;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use banker::{Banker, Denial, RequestOutcome};
pub use error::{BankerError, BankerResult};
pub use evaluator::{
    evaluate, replay, replay_prefix, EvaluatorConfig, ReplayError, SafetyEvaluator, SafetyReport,
    ScanOrder, ScanStep, StepOutcome, Verdict,
};
pub use generator::{GeneratorConfig, SnapshotGenerator};
pub use shared::SharedBanker;
pub use state::{Deficit, ResourceState};
pub use types::{ProcessId, ResourceId, Snapshot};
