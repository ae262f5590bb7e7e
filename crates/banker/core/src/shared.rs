//! Thread-safe wrapper around [`Banker`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::banker::{Banker, RequestOutcome};
use crate::error::BankerResult;
use crate::evaluator::SafetyReport;
use crate::state::ResourceState;
use crate::types::ProcessId;

/// A [`Banker`] that can be shared between threads.
///
/// Each call holds the lock for its whole apply/evaluate/commit-or-rollback
/// cycle, so no caller ever sees a tentatively granted state.
#[derive(Clone, Debug)]
pub struct SharedBanker {
    inner: Arc<Mutex<Banker>>,
}

impl SharedBanker {
    pub fn new(banker: Banker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(banker)),
        }
    }

    pub fn request(&self, pid: ProcessId, request: &[i64]) -> BankerResult<RequestOutcome> {
        self.inner.lock().request(pid, request)
    }

    pub fn release(&self, pid: ProcessId, amounts: &[i64]) -> BankerResult<()> {
        self.inner.lock().release(pid, amounts)
    }

    pub fn finish(&self, pid: ProcessId) -> BankerResult<Vec<u64>> {
        self.inner.lock().finish(pid)
    }

    pub fn evaluate(&self) -> SafetyReport {
        self.inner.lock().evaluate()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ResourceState {
        self.inner.lock().state().clone()
    }
}

impl From<Banker> for SharedBanker {
    fn from(banker: Banker) -> Self {
        Self::new(banker)
    }
}
