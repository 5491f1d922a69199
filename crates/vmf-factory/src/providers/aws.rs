//! AWS factory

use crate::factory::{assemble, shape_mismatch, VmFactory};
use vmf_core::{Provider, ProviderParams, ValidationError, VirtualMachine};

/// Builds AWS VMs (ids prefixed `aws-`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsFactory;

impl AwsFactory {
    /// Create new factory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl VmFactory for AwsFactory {
    fn provider(&self) -> Provider {
        Provider::Aws
    }

    fn id_prefix(&self) -> &'static str {
        "aws"
    }

    fn build(&self, name: &str, params: ProviderParams) -> Result<VirtualMachine, ValidationError> {
        match params {
            ProviderParams::Aws(_) => assemble(self, name, params),
            other => Err(shape_mismatch(Provider::Aws, &other)),
        }
    }
}
