//! In-memory repository
//!
//! A single coarse lock guards the map: writers are serialized, so
//! concurrent updates of one id cannot lose each other's changes. Reads take
//! the shared lock and return snapshots.

use crate::repository::{StoreResult, VmMutator, VmRepository};
use indexmap::IndexMap;
use parking_lot::RwLock;
use vmf_core::{StoreError, VirtualMachine, VmId};

/// Lock-guarded, insertion-ordered VM store
#[derive(Debug, Default)]
pub struct InMemoryVmRepository {
    inner: RwLock<IndexMap<VmId, VirtualMachine>>,
}

impl InMemoryVmRepository {
    /// Create new empty repository
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait::async_trait]
impl VmRepository for InMemoryVmRepository {
    async fn save(&self, vm: VirtualMachine) -> StoreResult<()> {
        let mut guard = self.inner.write();
        if guard.insert(vm.id.clone(), vm).is_some() {
            tracing::debug!("overwrote existing entry");
        }
        Ok(())
    }

    async fn get(&self, id: &VmId) -> StoreResult<VirtualMachine> {
        self.inner
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update(&self, id: &VmId, mutator: VmMutator) -> StoreResult<VirtualMachine> {
        let mut guard = self.inner.write();
        let vm = guard
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        mutator(vm);
        // The id is the map key and must not drift.
        vm.id = id.clone();
        Ok(vm.clone())
    }

    async fn delete(&self, id: &VmId) -> StoreResult<()> {
        self.inner
            .write()
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn list(&self) -> StoreResult<Vec<VirtualMachine>> {
        Ok(self.inner.read().values().cloned().collect())
    }
}
