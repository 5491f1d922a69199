//! Factory registry
//!
//! Provides [`FactoryRegistry`] for mapping a [`Provider`] to its factory.
//! Resolution is a map lookup; adding a provider means registering one more
//! factory, not editing the resolver.

use crate::factory::VmFactory;
use crate::providers::{AwsFactory, AzureFactory, GcpFactory, OnPremiseFactory};
use std::collections::HashMap;
use std::sync::Arc;
use vmf_core::{Provider, ProvisioningError};

/// Registry of construction strategies, keyed by provider
#[derive(Debug, Default, Clone)]
pub struct FactoryRegistry {
    factories: HashMap<Provider, Arc<dyn VmFactory>>,
}

impl FactoryRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create registry with the built-in factories
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AwsFactory::new()));
        registry.register(Arc::new(AzureFactory::new()));
        registry.register(Arc::new(GcpFactory::new()));
        registry.register(Arc::new(OnPremiseFactory::new()));
        registry
    }

    /// Register a factory under its own provider
    ///
    /// Returns the factory previously registered for that provider, if any.
    pub fn register(&mut self, factory: Arc<dyn VmFactory>) -> Option<Arc<dyn VmFactory>> {
        let provider = factory.provider();
        tracing::debug!("registering factory for {provider}");
        self.factories.insert(provider, factory)
    }

    /// Look up the factory for `provider`
    ///
    /// # Errors
    /// `ProvisioningError::UnsupportedProvider` if nothing is registered.
    pub fn resolve(&self, provider: Provider) -> Result<Arc<dyn VmFactory>, ProvisioningError> {
        self.factories
            .get(&provider)
            .cloned()
            .ok_or_else(|| ProvisioningError::UnsupportedProvider(provider.to_string()))
    }

    /// Check if a factory is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, provider: Provider) -> bool {
        self.factories.contains_key(&provider)
    }

    /// Remove a factory
    #[inline]
    pub fn remove(&mut self, provider: Provider) -> bool {
        self.factories.remove(&provider).is_some()
    }

    /// Registered providers, sorted
    #[must_use]
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers: Vec<_> = self.factories.keys().copied().collect();
        providers.sort();
        providers
    }

    /// Get number of registered factories
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmf_core::{OnPremiseParams, ProviderParams, Status, ValidationError, VirtualMachine};

    #[test]
    fn registry_new_empty() {
        let registry = FactoryRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_with_defaults_covers_every_provider() {
        let registry = FactoryRegistry::with_defaults();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.providers(), Provider::ALL.to_vec());
        for provider in Provider::ALL {
            assert_eq!(registry.resolve(provider).unwrap().provider(), provider);
        }
    }

    #[test]
    fn resolve_unregistered_fails() {
        let mut registry = FactoryRegistry::with_defaults();
        assert!(registry.remove(Provider::Azure));
        assert!(!registry.contains(Provider::Azure));

        let err = registry.resolve(Provider::Azure).unwrap_err();
        assert_eq!(err, ProvisioningError::UnsupportedProvider("azure".into()));
    }

    #[derive(Debug)]
    struct PreparingOnPremise;

    impl VmFactory for PreparingOnPremise {
        fn provider(&self) -> Provider {
            Provider::OnPremise
        }

        fn id_prefix(&self) -> &'static str {
            "lab"
        }

        fn initial_status(&self) -> Status {
            Status::Provisioning
        }

        fn build(
            &self,
            name: &str,
            params: ProviderParams,
        ) -> Result<VirtualMachine, ValidationError> {
            crate::factory::assemble(self, name, params)
        }
    }

    #[test]
    fn register_replaces_existing_factory() {
        let mut registry = FactoryRegistry::with_defaults();
        let previous = registry.register(Arc::new(PreparingOnPremise));
        assert!(previous.is_some());
        assert_eq!(registry.len(), 4);

        let factory = registry.resolve(Provider::OnPremise).unwrap();
        let vm = factory
            .build(
                "lab-vm",
                ProviderParams::OnPremise(OnPremiseParams {
                    cpu: 1,
                    ram_gb: 1,
                    disk_gb: 10,
                    nic: "br0".into(),
                }),
            )
            .unwrap();
        assert_eq!(vm.status, Status::Provisioning);
        assert!(vm.id.as_str().starts_with("lab-"));
    }
}
