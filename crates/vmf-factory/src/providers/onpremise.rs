//! On-premise factory

use crate::factory::{assemble, shape_mismatch, VmFactory};
use vmf_core::{Provider, ProviderParams, ValidationError, VirtualMachine};

/// Builds On-premise VMs (ids prefixed `onprem-`)
#[derive(Debug, Clone, Copy, Default)]
pub struct OnPremiseFactory;

impl OnPremiseFactory {
    /// Create new factory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl VmFactory for OnPremiseFactory {
    fn provider(&self) -> Provider {
        Provider::OnPremise
    }

    fn id_prefix(&self) -> &'static str {
        "onprem"
    }

    fn build(&self, name: &str, params: ProviderParams) -> Result<VirtualMachine, ValidationError> {
        match params {
            ProviderParams::OnPremise(_) => assemble(self, name, params),
            other => Err(shape_mismatch(Provider::OnPremise, &other)),
        }
    }
}
