//! Testing utilities for VMF workspace
//!
//! Shared fixtures, counting doubles, and a ready-wired service.

#![allow(missing_docs)]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vmf_audit::MemoryAuditSink;
use vmf_core::{
    AwsParams, AzureParams, GcpParams, OnPremiseParams, Provider, ProviderParams, Status,
    ValidationError, VirtualMachine, VmId,
};
use vmf_factory::{FactoryRegistry, VmFactory};
use vmf_service::ProvisioningService;
use vmf_store::{InMemoryVmRepository, StoreResult, VmMutator, VmRepository};

pub fn aws_params() -> ProviderParams {
    ProviderParams::Aws(AwsParams {
        instance_type: "t2.micro".into(),
        region: "us-east-1".into(),
        vpc: "vpc-123".into(),
        ami: "ami-abc".into(),
    })
}

pub fn azure_params() -> ProviderParams {
    ProviderParams::Azure(AzureParams {
        size: "Standard_B1s".into(),
        resource_group: "rg-demo".into(),
        image: "UbuntuLTS".into(),
        vnet: "vnet-1".into(),
    })
}

pub fn gcp_params() -> ProviderParams {
    ProviderParams::Gcp(GcpParams {
        machine_type: "e2-micro".into(),
        zone: "us-central1-a".into(),
        base_disk: "debian-12".into(),
        project: "demo-project".into(),
    })
}

pub fn onpremise_params() -> ProviderParams {
    ProviderParams::OnPremise(OnPremiseParams {
        cpu: 2,
        ram_gb: 4,
        disk_gb: 50,
        nic: "eth0".into(),
    })
}

pub fn params_for(provider: Provider) -> ProviderParams {
    match provider {
        Provider::Aws => aws_params(),
        Provider::Azure => azure_params(),
        Provider::Gcp => gcp_params(),
        Provider::OnPremise => onpremise_params(),
    }
}

/// Raw JSON creation request with `params` serialized from `params`
pub fn raw_request(provider: &str, name: &str, params: &ProviderParams, actor: Option<&str>) -> Value {
    let mut raw = json!({
        "provider": provider,
        "name": name,
        "params": serde_json::to_value(params).unwrap(),
    });
    if let Some(actor) = actor {
        raw["requested_by"] = Value::String(actor.to_string());
    }
    raw
}

/// Repository that counts writes before delegating to the in-memory store
#[derive(Debug, Default)]
pub struct CountingRepository {
    inner: InMemoryVmRepository,
    saves: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

impl CountingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.saves() + self.updates() + self.deletes()
    }
}

#[async_trait::async_trait]
impl VmRepository for CountingRepository {
    async fn save(&self, vm: VirtualMachine) -> StoreResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(vm).await
    }

    async fn get(&self, id: &VmId) -> StoreResult<VirtualMachine> {
        self.inner.get(id).await
    }

    async fn update(&self, id: &VmId, mutator: VmMutator) -> StoreResult<VirtualMachine> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(id, mutator).await
    }

    async fn delete(&self, id: &VmId) -> StoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id).await
    }

    async fn list(&self) -> StoreResult<Vec<VirtualMachine>> {
        self.inner.list().await
    }
}

/// Factory decorator that counts `build` calls
#[derive(Debug)]
pub struct CountingFactory {
    inner: Arc<dyn VmFactory>,
    builds: Arc<AtomicUsize>,
    initial: Option<Status>,
}

impl CountingFactory {
    pub fn new(inner: Arc<dyn VmFactory>, builds: Arc<AtomicUsize>) -> Self {
        Self {
            inner,
            builds,
            initial: None,
        }
    }

    /// Override the status new VMs are created in
    #[must_use]
    pub fn starting_in(mut self, status: Status) -> Self {
        self.initial = Some(status);
        self
    }
}

impl VmFactory for CountingFactory {
    fn provider(&self) -> Provider {
        self.inner.provider()
    }

    fn id_prefix(&self) -> &'static str {
        self.inner.id_prefix()
    }

    fn initial_status(&self) -> Status {
        self.initial.unwrap_or_else(|| self.inner.initial_status())
    }

    fn build(&self, name: &str, params: ProviderParams) -> Result<VirtualMachine, ValidationError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let mut vm = self.inner.build(name, params)?;
        if let Some(status) = self.initial {
            vm.status = status;
        }
        Ok(vm)
    }
}

/// Service wired to inspectable doubles
pub struct TestContext {
    pub service: ProvisioningService,
    pub audit: Arc<MemoryAuditSink>,
    pub repository: Arc<CountingRepository>,
    pub builds: Arc<AtomicUsize>,
}

impl TestContext {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

/// Service over the default factories, each wrapped in a [`CountingFactory`]
pub fn setup_service() -> TestContext {
    wire(|_| None)
}

/// Like [`setup_service`], but `provider` creates VMs in `status`
pub fn setup_service_starting_in(provider: Provider, status: Status) -> TestContext {
    wire(|p| (p == provider).then_some(status))
}

fn wire(initial: impl Fn(Provider) -> Option<Status>) -> TestContext {
    let builds = Arc::new(AtomicUsize::new(0));
    let defaults = FactoryRegistry::with_defaults();
    let mut registry = FactoryRegistry::new();
    for provider in defaults.providers() {
        let inner = defaults.resolve(provider).unwrap();
        let mut factory = CountingFactory::new(inner, Arc::clone(&builds));
        if let Some(status) = initial(provider) {
            factory = factory.starting_in(status);
        }
        registry.register(Arc::new(factory));
    }

    let audit = Arc::new(MemoryAuditSink::new());
    let repository = Arc::new(CountingRepository::new());
    let service = ProvisioningService::new(
        registry,
        Arc::clone(&repository) as Arc<dyn VmRepository>,
        Arc::clone(&audit) as Arc<dyn vmf_audit::AuditSink>,
    );

    TestContext {
        service,
        audit,
        repository,
        builds,
    }
}
