use thiserror::Error;

use crate::types::{ProcessId, ResourceId};

/// Errors from snapshot validation and the request protocol.
///
/// Construction errors are fatal: no partially validated state is ever
/// returned. An UNSAFE verdict or a denied request is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankerError {
    #[error("shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("negative value {value} in {what} at row {row}, column {column}")]
    NegativeValue {
        what: &'static str,
        row: usize,
        column: usize,
        value: i64,
    },

    #[error("{process} holds {allocated} of {resource} but declares a maximum of {max}")]
    OverAllocation {
        process: ProcessId,
        resource: ResourceId,
        allocated: u64,
        max: u64,
    },

    #[error("{resource}: {committed} instances committed but system capacity is {total}")]
    CapacityExceeded {
        resource: ResourceId,
        committed: u64,
        total: u64,
    },

    #[error("{process} declares {max} of {resource} but system capacity is {total}")]
    DemandExceedsCapacity {
        process: ProcessId,
        resource: ResourceId,
        max: u64,
        total: u64,
    },

    #[error("{resource}: available plus allocated instances exceed {limit}")]
    ValueOutOfRange { resource: ResourceId, limit: i64 },

    #[error("unknown process {0}")]
    UnknownProcess(ProcessId),

    #[error("{process} releases {requested} of {resource} but holds only {allocated}")]
    ReleaseExceedsAllocation {
        process: ProcessId,
        resource: ResourceId,
        requested: u64,
        allocated: u64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BankerError {
    pub(crate) fn shape(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        BankerError::ShapeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

pub type BankerResult<T> = Result<T, BankerError>;
