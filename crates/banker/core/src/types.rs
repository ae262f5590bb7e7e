//! Identifiers and the raw snapshot input.

use serde::{Deserialize, Serialize};

/// Index of a process row in the Max/Allocation/Need matrices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub usize);

impl ProcessId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Index of a resource type (a column).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub usize);

impl ResourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Unvalidated resource snapshot, as loaded from a file or produced by the
/// generator.
///
/// Entries are signed so that a negative value surfaces as
/// [`BankerError::NegativeValue`](crate::BankerError::NegativeValue) instead
/// of a deserialization failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Free instances per resource type
    pub available: Vec<i64>,
    /// Declared maximum demand, one row per process
    pub max: Vec<Vec<i64>>,
    /// Current allocation, one row per process
    pub allocation: Vec<Vec<i64>>,
    /// Fixed system capacity per resource type, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Vec<i64>>,
}

impl Snapshot {
    pub fn new(available: Vec<i64>, max: Vec<Vec<i64>>, allocation: Vec<Vec<i64>>) -> Self {
        Self {
            available,
            max,
            allocation,
            total: None,
        }
    }

    pub fn with_total(mut self, total: Vec<i64>) -> Self {
        self.total = Some(total);
        self
    }
}
