//! Request protocol: grant a request only if the resulting state is safe.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BankerError, BankerResult};
use crate::evaluator::{SafetyEvaluator, SafetyReport};
use crate::state::ResourceState;
use crate::types::{ProcessId, ResourceId};

/// Why a request was refused. The state is unchanged after a denial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Denial {
    /// The process asked for more than its declared maximum allows.
    ExceedsNeed {
        resource: ResourceId,
        requested: u64,
        need: u64,
    },
    /// Not enough free instances right now; the process must wait.
    ExceedsAvailable {
        resource: ResourceId,
        requested: u64,
        available: u64,
    },
    /// Granting would leave no safe sequence.
    Unsafe { blocked: Vec<ProcessId> },
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Denial::ExceedsNeed {
                resource,
                requested,
                need,
            } => write!(
                f,
                "request of {} {} exceeds remaining need {}",
                requested, resource, need
            ),
            Denial::ExceedsAvailable {
                resource,
                requested,
                available,
            } => write!(
                f,
                "request of {} {} exceeds {} available",
                requested, resource, available
            ),
            Denial::Unsafe { blocked } => {
                write!(f, "grant would be unsafe; {} processes could not finish", blocked.len())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Committed; `sequence` is a safe order for the new state.
    Granted { sequence: Vec<ProcessId> },
    /// Refused and rolled back.
    Denied(Denial),
}

impl RequestOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, RequestOutcome::Granted { .. })
    }
}

/// Owns one resource state and arbitrates requests against it.
#[derive(Clone, Debug)]
pub struct Banker {
    state: ResourceState,
    evaluator: SafetyEvaluator,
}

impl Banker {
    pub fn new(state: ResourceState) -> Self {
        Self::with_evaluator(state, SafetyEvaluator::default())
    }

    pub fn with_evaluator(state: ResourceState, evaluator: SafetyEvaluator) -> Self {
        Self { state, evaluator }
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// Is the current state safe?
    pub fn evaluate(&self) -> SafetyReport {
        self.evaluator.evaluate(&self.state)
    }

    /// Ask for `request` more instances on behalf of `pid`.
    ///
    /// Malformed requests (unknown process, wrong length, negative entries)
    /// are errors. A well-formed request that cannot be granted comes back
    /// as [`RequestOutcome::Denied`] with the state rolled back.
    pub fn request(&mut self, pid: ProcessId, request: &[i64]) -> BankerResult<RequestOutcome> {
        let amounts = self.validate_vector("request", pid, request)?;
        let need_row = self.state.need_row(pid)?;

        for (j, (&requested, &need)) in amounts.iter().zip(need_row).enumerate() {
            if requested > need {
                let denial = Denial::ExceedsNeed {
                    resource: ResourceId(j),
                    requested,
                    need,
                };
                warn!(process = %pid, %denial, "Request denied");
                return Ok(RequestOutcome::Denied(denial));
            }
        }
        for (j, (&requested, &available)) in
            amounts.iter().zip(self.state.available()).enumerate()
        {
            if requested > available {
                let denial = Denial::ExceedsAvailable {
                    resource: ResourceId(j),
                    requested,
                    available,
                };
                warn!(process = %pid, %denial, "Request denied");
                return Ok(RequestOutcome::Denied(denial));
            }
        }

        self.state.grant(pid, &amounts);
        let report = self.evaluator.evaluate(&self.state);
        if report.is_safe() {
            info!(process = %pid, request = ?amounts, "Request granted");
            return Ok(RequestOutcome::Granted {
                sequence: report.sequence,
            });
        }

        self.state.reclaim(pid, &amounts);
        let denial = Denial::Unsafe {
            blocked: report.blocked,
        };
        warn!(process = %pid, %denial, "Request denied, rolled back");
        Ok(RequestOutcome::Denied(denial))
    }

    /// Give back part of what `pid` holds.
    pub fn release(&mut self, pid: ProcessId, amounts: &[i64]) -> BankerResult<()> {
        let amounts = self.validate_vector("release", pid, amounts)?;
        let held = self.state.allocation_row(pid)?;
        for (j, (&requested, &allocated)) in amounts.iter().zip(held).enumerate() {
            if requested > allocated {
                return Err(BankerError::ReleaseExceedsAllocation {
                    process: pid,
                    resource: ResourceId(j),
                    requested,
                    allocated,
                });
            }
        }
        self.state.reclaim(pid, &amounts);
        debug!(process = %pid, released = ?amounts, "Resources released");
        Ok(())
    }

    /// The process terminated: return everything it holds.
    ///
    /// Returns the released amounts.
    pub fn finish(&mut self, pid: ProcessId) -> BankerResult<Vec<u64>> {
        let held = self.state.allocation_row(pid)?.to_vec();
        self.state.reclaim(pid, &held);
        info!(process = %pid, released = ?held, "Process finished");
        Ok(held)
    }

    fn validate_vector(
        &self,
        what: &'static str,
        pid: ProcessId,
        values: &[i64],
    ) -> BankerResult<Vec<u64>> {
        if !self.state.contains(pid) {
            return Err(BankerError::UnknownProcess(pid));
        }
        if values.len() != self.state.resource_count() {
            return Err(BankerError::shape(
                what,
                self.state.resource_count(),
                values.len(),
            ));
        }
        values
            .iter()
            .enumerate()
            .map(|(column, &value)| {
                u64::try_from(value).map_err(|_| BankerError::NegativeValue {
                    what,
                    row: pid.index(),
                    column,
                    value,
                })
            })
            .collect()
    }
}
