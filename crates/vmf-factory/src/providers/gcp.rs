//! GCP factory

use crate::factory::{assemble, shape_mismatch, VmFactory};
use vmf_core::{Provider, ProviderParams, ValidationError, VirtualMachine};

/// Builds GCP VMs (ids prefixed `gcp-`)
#[derive(Debug, Clone, Copy, Default)]
pub struct GcpFactory;

impl GcpFactory {
    /// Create new factory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl VmFactory for GcpFactory {
    fn provider(&self) -> Provider {
        Provider::Gcp
    }

    fn id_prefix(&self) -> &'static str {
        "gcp"
    }

    fn build(&self, name: &str, params: ProviderParams) -> Result<VirtualMachine, ValidationError> {
        match params {
            ProviderParams::Gcp(_) => assemble(self, name, params),
            other => Err(shape_mismatch(Provider::Gcp, &other)),
        }
    }
}
