//! Azure factory

use crate::factory::{assemble, shape_mismatch, VmFactory};
use vmf_core::{Provider, ProviderParams, ValidationError, VirtualMachine};

/// Builds Azure VMs (ids prefixed `azure-`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureFactory;

impl AzureFactory {
    /// Create new factory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl VmFactory for AzureFactory {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    fn id_prefix(&self) -> &'static str {
        "azure"
    }

    fn build(&self, name: &str, params: ProviderParams) -> Result<VirtualMachine, ValidationError> {
        match params {
            ProviderParams::Azure(_) => assemble(self, name, params),
            other => Err(shape_mismatch(Provider::Azure, &other)),
        }
    }
}
