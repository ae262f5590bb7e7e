//! Validated resource state: Available, Max, Allocation and Need.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{BankerError, BankerResult};
use crate::types::{ProcessId, ResourceId, Snapshot};

/// One validated snapshot of the system.
///
/// Holds the Available vector, the Max and Allocation matrices, and the
/// derived Need matrix (`Need = Max - Allocation`). Shape is fixed at
/// construction: every matrix has `n` rows of `m` columns and Available has
/// `m` entries. Need is never negative.
///
/// There is no `Deserialize` impl: the only way in is through validation
/// ([`ResourceState::new`] or `TryFrom<Snapshot>`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceState {
    available: Vec<u64>,
    max: Vec<Vec<u64>>,
    allocation: Vec<Vec<u64>>,
    need: Vec<Vec<u64>>,
    total: Vec<u64>,
}

/// The first resource that keeps a process from finishing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deficit {
    pub resource: ResourceId,
    pub needed: u64,
    pub available: u64,
}

impl Deficit {
    /// How many more instances would have to be free.
    pub fn shortfall(&self) -> u64 {
        self.needed - self.available
    }
}

impl std::fmt::Display for Deficit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "needs {} of {}, {} available",
            self.needed, self.resource, self.available
        )
    }
}

impl ResourceState {
    /// Validate and build a state from raw vectors.
    pub fn new(
        available: Vec<i64>,
        max: Vec<Vec<i64>>,
        allocation: Vec<Vec<i64>>,
    ) -> BankerResult<Self> {
        Self::from_snapshot(&Snapshot::new(available, max, allocation))
    }

    /// Validate a snapshot.
    ///
    /// Checks run in a fixed order: shape, then sign, then
    /// `Allocation <= Max`, then the committed range, then capacity (only
    /// when `total` is given).
    ///
    /// Every later sum of Available and allocations is bounded by the
    /// committed total, so no entry ever exceeds `i64::MAX`.
    pub fn from_snapshot(snapshot: &Snapshot) -> BankerResult<Self> {
        let m = snapshot.available.len();
        let n = snapshot.max.len();

        if snapshot.allocation.len() != n {
            return Err(BankerError::shape("allocation rows", n, snapshot.allocation.len()));
        }
        for (i, row) in snapshot.max.iter().enumerate() {
            if row.len() != m {
                return Err(BankerError::shape(format!("max row {}", i), m, row.len()));
            }
        }
        for (i, row) in snapshot.allocation.iter().enumerate() {
            if row.len() != m {
                return Err(BankerError::shape(format!("allocation row {}", i), m, row.len()));
            }
        }
        if let Some(total) = &snapshot.total {
            if total.len() != m {
                return Err(BankerError::shape("total", m, total.len()));
            }
        }

        let available = unsigned_row("available", 0, &snapshot.available)?;
        let max = unsigned_matrix("max", &snapshot.max)?;
        let allocation = unsigned_matrix("allocation", &snapshot.allocation)?;
        let declared_total = match &snapshot.total {
            Some(total) => Some(unsigned_row("total", 0, total)?),
            None => None,
        };

        let mut need = Vec::with_capacity(n);
        for (i, (max_row, alloc_row)) in max.iter().zip(&allocation).enumerate() {
            let mut need_row = Vec::with_capacity(m);
            for (j, (&max_v, &alloc_v)) in max_row.iter().zip(alloc_row).enumerate() {
                if alloc_v > max_v {
                    return Err(BankerError::OverAllocation {
                        process: ProcessId(i),
                        resource: ResourceId(j),
                        allocated: alloc_v,
                        max: max_v,
                    });
                }
                need_row.push(max_v - alloc_v);
            }
            need.push(need_row);
        }

        let committed = checked_committed(&available, &allocation)?;
        let total = match declared_total {
            Some(total) => {
                for (j, (&used, &cap)) in committed.iter().zip(&total).enumerate() {
                    if used > cap {
                        return Err(BankerError::CapacityExceeded {
                            resource: ResourceId(j),
                            committed: used,
                            total: cap,
                        });
                    }
                }
                for (i, row) in max.iter().enumerate() {
                    for (j, (&max_v, &cap)) in row.iter().zip(&total).enumerate() {
                        if max_v > cap {
                            return Err(BankerError::DemandExceedsCapacity {
                                process: ProcessId(i),
                                resource: ResourceId(j),
                                max: max_v,
                                total: cap,
                            });
                        }
                    }
                }
                total
            }
            None => committed,
        };

        debug!(processes = n, resources = m, "Resource state validated");

        Ok(Self {
            available,
            max,
            allocation,
            need,
            total,
        })
    }

    /// Number of processes (`n`).
    pub fn process_count(&self) -> usize {
        self.max.len()
    }

    /// Number of resource types (`m`).
    pub fn resource_count(&self) -> usize {
        self.available.len()
    }

    pub fn available(&self) -> &[u64] {
        &self.available
    }

    pub fn max(&self) -> &[Vec<u64>] {
        &self.max
    }

    pub fn allocation(&self) -> &[Vec<u64>] {
        &self.allocation
    }

    pub fn need(&self) -> &[Vec<u64>] {
        &self.need
    }

    /// System capacity per resource type, either declared or derived as
    /// `Available + sum(Allocation)` at construction.
    pub fn total(&self) -> &[u64] {
        &self.total
    }

    /// Process ids in ascending order.
    pub fn processes(&self) -> impl DoubleEndedIterator<Item = ProcessId> + ExactSizeIterator {
        (0..self.process_count()).map(ProcessId)
    }

    pub fn contains(&self, pid: ProcessId) -> bool {
        pid.0 < self.process_count()
    }

    pub fn need_row(&self, pid: ProcessId) -> BankerResult<&[u64]> {
        self.need
            .get(pid.0)
            .map(Vec::as_slice)
            .ok_or(BankerError::UnknownProcess(pid))
    }

    pub fn allocation_row(&self, pid: ProcessId) -> BankerResult<&[u64]> {
        self.allocation
            .get(pid.0)
            .map(Vec::as_slice)
            .ok_or(BankerError::UnknownProcess(pid))
    }

    /// True iff every `Need[pid][j] <= Available[j]`.
    ///
    /// An unknown process is never satisfiable.
    pub fn can_satisfy(&self, pid: ProcessId) -> bool {
        matches!(self.first_deficit(pid), Ok(None))
    }

    /// The first resource whose need exceeds what is available, if any.
    pub fn first_deficit(&self, pid: ProcessId) -> BankerResult<Option<Deficit>> {
        if !self.contains(pid) {
            return Err(BankerError::UnknownProcess(pid));
        }
        Ok(self.deficit_at(pid.0))
    }

    pub(crate) fn deficit_at(&self, i: usize) -> Option<Deficit> {
        self.need[i]
            .iter()
            .zip(&self.available)
            .enumerate()
            .find(|&(_, (&needed, &free))| needed > free)
            .map(|(j, (&needed, &free))| Deficit {
                resource: ResourceId(j),
                needed,
                available: free,
            })
    }

    /// Return the whole allocation of `pid` to Available.
    ///
    /// Allocation itself is left untouched; the caller must invoke this at
    /// most once per process per evaluation or resources are double counted.
    pub fn release(&mut self, pid: ProcessId) -> BankerResult<()> {
        if !self.contains(pid) {
            return Err(BankerError::UnknownProcess(pid));
        }
        self.release_at(pid.0);
        Ok(())
    }

    pub(crate) fn release_at(&mut self, i: usize) {
        for (free, &held) in self.available.iter_mut().zip(&self.allocation[i]) {
            *free += held;
        }
        trace!(process = i, available = ?self.available, "Allocation released");
    }

    /// `Available[j] + sum_i Allocation[i][j]` per resource type.
    pub fn committed(&self) -> Vec<u64> {
        let mut committed = self.available.clone();
        for row in &self.allocation {
            for (sum, &held) in committed.iter_mut().zip(row) {
                *sum += held;
            }
        }
        committed
    }

    /// Whether committed instances stay within the system capacity.
    pub fn within_capacity(&self) -> bool {
        self.committed()
            .iter()
            .zip(&self.total)
            .all(|(used, cap)| used <= cap)
    }

    /// Move `amounts` from Available to the process's allocation.
    ///
    /// Callers check `amounts <= Need[pid]` and `amounts <= Available`.
    pub(crate) fn grant(&mut self, pid: ProcessId, amounts: &[u64]) {
        let i = pid.0;
        for (j, &amount) in amounts.iter().enumerate() {
            self.available[j] -= amount;
            self.allocation[i][j] += amount;
            self.need[i][j] -= amount;
        }
    }

    /// Inverse of [`grant`](Self::grant).
    ///
    /// Callers check `amounts <= Allocation[pid]`.
    pub(crate) fn reclaim(&mut self, pid: ProcessId, amounts: &[u64]) {
        let i = pid.0;
        for (j, &amount) in amounts.iter().enumerate() {
            self.available[j] += amount;
            self.allocation[i][j] -= amount;
            self.need[i][j] += amount;
        }
    }

    /// Convert back to the raw input form, with `total` made explicit.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            available: signed_row(&self.available),
            max: self.max.iter().map(|r| signed_row(r)).collect(),
            allocation: self.allocation.iter().map(|r| signed_row(r)).collect(),
            total: Some(signed_row(&self.total)),
        }
    }
}

impl TryFrom<Snapshot> for ResourceState {
    type Error = BankerError;

    fn try_from(snapshot: Snapshot) -> BankerResult<Self> {
        Self::from_snapshot(&snapshot)
    }
}

impl TryFrom<&Snapshot> for ResourceState {
    type Error = BankerError;

    fn try_from(snapshot: &Snapshot) -> BankerResult<Self> {
        Self::from_snapshot(snapshot)
    }
}

fn unsigned_row(what: &'static str, row: usize, values: &[i64]) -> BankerResult<Vec<u64>> {
    values
        .iter()
        .enumerate()
        .map(|(column, &value)| {
            u64::try_from(value).map_err(|_| BankerError::NegativeValue {
                what,
                row,
                column,
                value,
            })
        })
        .collect()
}

fn unsigned_matrix(what: &'static str, rows: &[Vec<i64>]) -> BankerResult<Vec<Vec<u64>>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| unsigned_row(what, i, row))
        .collect()
}

// Entries never exceed `i64::MAX` once construction has succeeded.
fn signed_row(values: &[u64]) -> Vec<i64> {
    values
        .iter()
        .map(|&v| {
            debug_assert!(v <= i64::MAX as u64, "entry {} out of range", v);
            v as i64
        })
        .collect()
}

fn checked_committed(available: &[u64], allocation: &[Vec<u64>]) -> BankerResult<Vec<u64>> {
    let limit = i64::MAX as u64;
    let mut committed = available.to_vec();
    for row in allocation {
        for (j, (sum, &held)) in committed.iter_mut().zip(row).enumerate() {
            *sum = sum
                .checked_add(held)
                .filter(|&v| v <= limit)
                .ok_or(BankerError::ValueOutOfRange {
                    resource: ResourceId(j),
                    limit: i64::MAX,
                })?;
        }
    }
    Ok(committed)
}
