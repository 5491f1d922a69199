//! Repository port
//!
//! The service depends on [`VmRepository`] only. Implementations own the
//! canonical copy of every entity and hand out clones; all mutation goes
//! through [`VmRepository::update`], which must apply the mutator atomically
//! with respect to other mutations of the same id.

use vmf_core::{StoreError, VirtualMachine, VmId};

/// In-place edit applied to the stored entity
pub type VmMutator = Box<dyn FnOnce(&mut VirtualMachine) + Send>;

/// Result alias for repository operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage capability for VM entities
#[async_trait::async_trait]
pub trait VmRepository: Send + Sync {
    /// Insert or overwrite by id
    async fn save(&self, vm: VirtualMachine) -> StoreResult<()>;

    /// Fetch a copy
    ///
    /// # Errors
    /// `StoreError::NotFound` for unknown ids.
    async fn get(&self, id: &VmId) -> StoreResult<VirtualMachine>;

    /// Apply `mutator` to the stored entity and return the result
    ///
    /// # Errors
    /// `StoreError::NotFound` for unknown ids; the mutator is not called.
    async fn update(&self, id: &VmId, mutator: VmMutator) -> StoreResult<VirtualMachine>;

    /// Remove by id
    ///
    /// # Errors
    /// `StoreError::NotFound` for unknown ids.
    async fn delete(&self, id: &VmId) -> StoreResult<()>;

    /// All entities, in insertion order
    async fn list(&self) -> StoreResult<Vec<VirtualMachine>>;
}
