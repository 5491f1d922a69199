//! Factory capability contract
//!
//! Every provider implements [`VmFactory`]. Factories are substitutable: given
//! a params shape of their own provider they produce a fresh
//! [`VirtualMachine`], given any other shape they fail with a
//! [`ValidationError`]. Factories perform no I/O and never touch storage.

use vmf_core::{Provider, ProviderParams, Status, ValidationError, VirtualMachine, VmId};

/// Construction strategy for one provider
pub trait VmFactory: Send + Sync + std::fmt::Debug {
    /// Provider this factory builds for
    fn provider(&self) -> Provider;

    /// Prefix of generated ids
    fn id_prefix(&self) -> &'static str;

    /// Status of a freshly built VM
    fn initial_status(&self) -> Status {
        Status::Stopped
    }

    /// Build a VM from validated params
    ///
    /// # Errors
    /// `ValidationError` if `params` belongs to another provider or a value
    /// breaks its constraint.
    fn build(&self, name: &str, params: ProviderParams) -> Result<VirtualMachine, ValidationError>;
}

/// Shared tail of every factory's `build`
///
/// Assumes the caller has already checked the variant.
pub(crate) fn assemble<F: VmFactory + ?Sized>(
    factory: &F,
    name: &str,
    params: ProviderParams,
) -> Result<VirtualMachine, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "must not be empty"));
    }
    params.validate().map_err(|e| e.nested_in("params"))?;

    let vm = VirtualMachine::new(
        VmId::generate(factory.id_prefix()),
        name,
        params,
        factory.initial_status(),
    );
    tracing::debug!("{} factory built {}", factory.provider(), vm.id);
    Ok(vm)
}

/// Error for a params shape handed to the wrong factory
pub(crate) fn shape_mismatch(expected: Provider, got: &ProviderParams) -> ValidationError {
    ValidationError::new(
        "params",
        format!(
            "expected {expected} parameters, got {} parameters",
            got.provider()
        ),
    )
}
