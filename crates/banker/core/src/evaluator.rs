//! Safe-sequence search.
//!
//! The evaluator runs the classical cyclic scan over a private copy of the
//! state: pending processes sit in a FIFO retry list, a process whose Need
//! fits in the working Available vector finishes and releases its
//! allocation, and a process that does not fit goes to the back of the list.
//!
//! The scan stops as soon as a full pass over the pending processes makes no
//! progress. Available only grows when some process finishes, so such a
//! pass proves that nothing left can ever finish. This bounds the run at
//! `O(n² · m)` and turns an unsafe snapshot into an UNSAFE verdict rather
//! than an endless requeue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::state::{Deficit, ResourceState};
use crate::types::ProcessId;

/// Initial order of the retry list.
///
/// Affects only which safe sequence is reported, never the verdict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Initial order of pending process ids
    #[serde(default)]
    pub scan_order: ScanOrder,
    /// Record every scan step in the report
    #[serde(default)]
    pub record_trace: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Safe,
    Unsafe,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Safe => write!(f, "SAFE"),
            Verdict::Unsafe => write!(f, "UNSAFE"),
        }
    }
}

/// What happened to one dequeued process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Need fit; the allocation went back into Available.
    Finished { available_after: Vec<u64> },
    /// Need did not fit; requeued.
    Blocked { deficit: Deficit },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStep {
    pub process: ProcessId,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Result of one evaluation. UNSAFE is an ordinary result, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub verdict: Verdict,
    /// Processes in the order they finished; a full permutation when SAFE
    pub sequence: Vec<ProcessId>,
    /// Processes still pending when the scan stalled, ascending
    pub blocked: Vec<ProcessId>,
    /// Number of Need/Available comparisons made
    pub checks: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<ScanStep>,
}

impl SafetyReport {
    pub fn is_safe(&self) -> bool {
        self.verdict == Verdict::Safe
    }

    pub fn is_unsafe(&self) -> bool {
        self.verdict == Verdict::Unsafe
    }

    /// Check this report against the snapshot it came from.
    ///
    /// A SAFE report must replay completely. An UNSAFE report must replay
    /// its finished prefix, after which none of the blocked processes may
    /// fit, and finished plus blocked must cover every process.
    pub fn verify(&self, state: &ResourceState) -> Result<(), ReplayError> {
        match self.verdict {
            Verdict::Safe => replay(state, &self.sequence),
            Verdict::Unsafe => {
                let after = replay_prefix(state, &self.sequence)?;
                let mut seen = vec![false; state.process_count()];
                for &pid in &self.sequence {
                    seen[pid.index()] = true;
                }
                for &pid in &self.blocked {
                    if !state.contains(pid) {
                        return Err(ReplayError::UnknownProcess(pid));
                    }
                    if std::mem::replace(&mut seen[pid.index()], true) {
                        return Err(ReplayError::Duplicate(pid));
                    }
                    if after.can_satisfy(pid) {
                        return Err(ReplayError::NotBlocked(pid));
                    }
                }
                let covered = self.sequence.len() + self.blocked.len();
                if covered != state.process_count() {
                    return Err(ReplayError::Incomplete {
                        finished: covered,
                        expected: state.process_count(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Why a claimed sequence does not replay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("unknown process {0} in sequence")]
    UnknownProcess(ProcessId),

    #[error("{0} appears more than once")]
    Duplicate(ProcessId),

    #[error("{process} cannot finish at step {step}: {deficit}")]
    Blocked {
        step: usize,
        process: ProcessId,
        deficit: Deficit,
    },

    #[error("sequence covers {finished} of {expected} processes")]
    Incomplete { finished: usize, expected: usize },

    #[error("{0} is reported blocked but can finish")]
    NotBlocked(ProcessId),
}

/// Replay `sequence` step by step: each process must fit, then releases.
///
/// Returns the state after the last release.
pub fn replay_prefix(
    state: &ResourceState,
    sequence: &[ProcessId],
) -> Result<ResourceState, ReplayError> {
    let mut work = state.clone();
    let mut seen = vec![false; state.process_count()];
    for (step, &pid) in sequence.iter().enumerate() {
        if !work.contains(pid) {
            return Err(ReplayError::UnknownProcess(pid));
        }
        if std::mem::replace(&mut seen[pid.index()], true) {
            return Err(ReplayError::Duplicate(pid));
        }
        if let Some(deficit) = work.deficit_at(pid.index()) {
            return Err(ReplayError::Blocked {
                step,
                process: pid,
                deficit,
            });
        }
        work.release_at(pid.index());
    }
    Ok(work)
}

/// Replay a complete safe sequence.
pub fn replay(state: &ResourceState, sequence: &[ProcessId]) -> Result<(), ReplayError> {
    replay_prefix(state, sequence)?;
    if sequence.len() != state.process_count() {
        return Err(ReplayError::Incomplete {
            finished: sequence.len(),
            expected: state.process_count(),
        });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Pending,
    Finished,
}

/// Runs the safe-sequence search.
#[derive(Clone, Debug, Default)]
pub struct SafetyEvaluator {
    config: EvaluatorConfig,
}

impl SafetyEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Search for a safe sequence. `state` is not modified.
    pub fn evaluate(&self, state: &ResourceState) -> SafetyReport {
        let mut work = state.clone();
        let mut status = vec![Status::Pending; state.process_count()];
        let mut queue: VecDeque<ProcessId> = match self.config.scan_order {
            ScanOrder::Ascending => state.processes().collect(),
            ScanOrder::Descending => state.processes().rev().collect(),
        };

        let mut sequence = Vec::with_capacity(queue.len());
        let mut trace = Vec::new();
        let mut checks = 0usize;
        // Consecutive requeues since the last process finished.
        let mut misses = 0usize;

        while let Some(pid) = queue.pop_front() {
            let i = pid.index();
            if status[i] == Status::Finished {
                continue;
            }

            checks += 1;
            match work.deficit_at(i) {
                None => {
                    status[i] = Status::Finished;
                    sequence.push(pid);
                    work.release_at(i);
                    misses = 0;
                    debug!(
                        process = %pid,
                        available = ?work.available(),
                        remaining = queue.len(),
                        "Process can finish"
                    );
                    if self.config.record_trace {
                        trace.push(ScanStep {
                            process: pid,
                            outcome: StepOutcome::Finished {
                                available_after: work.available().to_vec(),
                            },
                        });
                    }
                }
                Some(deficit) => {
                    debug!(
                        process = %pid,
                        resource = %deficit.resource,
                        shortfall = deficit.shortfall(),
                        "Process blocked"
                    );
                    if self.config.record_trace {
                        trace.push(ScanStep {
                            process: pid,
                            outcome: StepOutcome::Blocked { deficit },
                        });
                    }
                    queue.push_back(pid);
                    misses += 1;
                    if misses >= queue.len() {
                        break;
                    }
                }
            }
        }

        let mut blocked: Vec<ProcessId> = queue
            .into_iter()
            .filter(|pid| status[pid.index()] == Status::Pending)
            .collect();
        blocked.sort_unstable();
        blocked.dedup();

        let verdict = if blocked.is_empty() {
            Verdict::Safe
        } else {
            Verdict::Unsafe
        };

        info!(
            verdict = %verdict,
            finished = sequence.len(),
            blocked = blocked.len(),
            checks,
            "Safety evaluation complete"
        );

        SafetyReport {
            verdict,
            sequence,
            blocked,
            checks,
            trace,
        }
    }
}

/// Evaluate with the default configuration.
pub fn evaluate(state: &ResourceState) -> SafetyReport {
    SafetyEvaluator::default().evaluate(state)
}
