//! Provisioning service
//!
//! The orchestrator behind every use case:
//! - Create: parse, resolve factory, build, persist
//! - Update: patch params within the VM's own provider shape
//! - Delete and power actions against stored VMs
//! - Read-only queries
//!
//! Every mutating use case writes exactly one audit record, success or
//! failure. Audit failures degrade to a warning and never change the outcome.

use crate::config::{AuditSinkKind, ConfigError, ServiceConfig};
use crate::state_machine::{self, Transition};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use vmf_audit::{
    AuditAction, AuditRecord, AuditSink, JsonLinesAuditSink, MemoryAuditSink, TracingAuditSink,
};
use vmf_core::{
    CreationRequest, Provider, ProviderParams, ProvisioningError, ProvisioningResult,
    ValidationError, VirtualMachine, VmAction, VmId,
};
use vmf_factory::FactoryRegistry;
use vmf_store::{InMemoryVmRepository, VmRepository};

/// Liveness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Always `"ok"` while the service can answer
    pub status: &'static str,
}

/// Orchestrates request validation, construction, persistence and audit
pub struct ProvisioningService {
    registry: FactoryRegistry,
    repository: Arc<dyn VmRepository>,
    audit: Arc<dyn AuditSink>,
    default_actor: String,
}

impl std::fmt::Debug for ProvisioningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningService")
            .field("registry", &self.registry)
            .field("default_actor", &self.default_actor)
            .finish_non_exhaustive()
    }
}

impl ProvisioningService {
    /// Create new service over the given collaborators
    #[must_use]
    pub fn new(
        registry: FactoryRegistry,
        repository: Arc<dyn VmRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            registry,
            repository,
            audit,
            default_actor: vmf_core::DEFAULT_ACTOR.to_string(),
        }
    }

    /// With actor used when a caller names none
    #[inline]
    #[must_use]
    pub fn with_default_actor(mut self, actor: impl Into<String>) -> Self {
        self.default_actor = actor.into();
        self
    }

    /// Build a service with the built-in factories, an in-memory repository
    /// and the audit sink named by `config`
    ///
    /// # Errors
    /// `ConfigError::Invalid` for an inconsistent config, `ConfigError::Audit`
    /// if the audit file cannot be opened.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let audit: Arc<dyn AuditSink> = match config.audit.sink {
            AuditSinkKind::Memory => Arc::new(MemoryAuditSink::new()),
            AuditSinkKind::Tracing => Arc::new(TracingAuditSink::new()),
            AuditSinkKind::Jsonl => {
                let path = config.audit.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path is required for the jsonl sink".into())
                })?;
                Arc::new(JsonLinesAuditSink::open(path).await?)
            }
        };

        Ok(Self::new(
            FactoryRegistry::with_defaults(),
            Arc::new(InMemoryVmRepository::new()),
            audit,
        )
        .with_default_actor(config.default_actor.clone()))
    }

    /// Factory registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    /// Actor used when a caller names none
    #[inline]
    #[must_use]
    pub fn default_actor(&self) -> &str {
        &self.default_actor
    }

    /// Create a VM from a typed request
    ///
    /// # Errors
    /// - `ProvisioningError::Validation` if the name is empty, the params
    ///   shape belongs to another provider, or a value breaks its constraint
    /// - `ProvisioningError::UnsupportedProvider` if no factory is registered
    /// - `ProvisioningError::Storage` if the repository write fails
    pub async fn create_vm(&self, request: CreationRequest) -> ProvisioningResult<VirtualMachine> {
        let actor = request.actor_or(&self.default_actor).to_string();
        let provider = request.provider;
        let name = request.name.clone();

        let result = self.provision(request).await;
        let record = match &result {
            Ok(vm) => {
                tracing::info!("created {} ({}) for {actor}", vm.id, vm.provider);
                AuditRecord::success(actor, AuditAction::Create)
                    .with_vm(vm)
                    .with_params_redacted(&vm.params)
            }
            Err(e) => {
                tracing::warn!("create for {provider} failed: {e}");
                AuditRecord::failure(actor, AuditAction::Create, e)
                    .with_provider(provider)
                    .with_detail("name", name)
            }
        };
        self.audit(record).await;
        result
    }

    async fn provision(&self, request: CreationRequest) -> ProvisioningResult<VirtualMachine> {
        // Shape binding is checked before any factory is consulted.
        request.validate()?;
        let factory = self.registry.resolve(request.provider)?;
        let vm = factory.build(&request.name, request.params)?;
        self.repository.save(vm.clone()).await?;
        Ok(vm)
    }

    /// Parse a raw JSON request and create the VM it describes
    ///
    /// Requests that fail to parse are still audited, attributed to their
    /// `requested_by` when it can be read.
    ///
    /// # Errors
    /// As [`Self::create_vm`], plus parse failures.
    pub async fn create_from_json(&self, raw: &Value) -> ProvisioningResult<VirtualMachine> {
        match CreationRequest::parse_with_actor(raw, &self.default_actor) {
            Ok(request) => self.create_vm(request).await,
            Err(e) => {
                let err = ProvisioningError::from(e);
                tracing::warn!("rejected creation request: {err}");
                let actor = CreationRequest::actor_of(raw, &self.default_actor);
                let mut record = AuditRecord::failure(actor, AuditAction::Create, &err);
                if let Some(provider) = raw
                    .get("provider")
                    .and_then(Value::as_str)
                    .and_then(|tag| tag.parse::<Provider>().ok())
                {
                    record = record.with_provider(provider);
                }
                self.audit(record).await;
                Err(err)
            }
        }
    }

    /// Patch the params of a stored VM from raw JSON
    ///
    /// `patch` holds any subset of the VM's own provider fields; absent
    /// fields keep their stored value.
    ///
    /// # Errors
    /// - `ProvisioningError::NotFound` if `id` is unknown
    /// - `ProvisioningError::Validation` if `patch` names a foreign field or
    ///   the merged params break a constraint
    pub async fn update_vm(
        &self,
        id: &VmId,
        patch: &Value,
        actor: Option<&str>,
    ) -> ProvisioningResult<VirtualMachine> {
        let actor = self.actor(actor);
        let patch = patch.clone();
        let result = self.replace_params(id, move |existing| {
            existing.params.merge_patch(&patch).map_err(|e| e.nested_in("params"))
        });
        self.finish_update(id, &actor, result.await).await
    }

    /// Replace the params of a stored VM
    ///
    /// # Errors
    /// - `ProvisioningError::NotFound` if `id` is unknown
    /// - `ProvisioningError::Validation` if `params` belongs to another
    ///   provider or a value breaks its constraint
    pub async fn update_vm_params(
        &self,
        id: &VmId,
        params: ProviderParams,
        actor: Option<&str>,
    ) -> ProvisioningResult<VirtualMachine> {
        let actor = self.actor(actor);
        let result = self.replace_params(id, move |existing| {
            if params.provider() != existing.provider {
                return Err(ValidationError::new(
                    "params",
                    format!(
                        "cannot change provider from {} to {}",
                        existing.provider,
                        params.provider()
                    ),
                ));
            }
            params.validate().map_err(|e| e.nested_in("params"))?;
            Ok(params.clone())
        });
        self.finish_update(id, &actor, result.await).await
    }

    async fn replace_params<F>(&self, id: &VmId, derive: F) -> ProvisioningResult<VirtualMachine>
    where
        F: Fn(&VirtualMachine) -> Result<ProviderParams, ValidationError> + Send + 'static,
    {
        let existing = self.repository.get(id).await?;
        derive(&existing)?;
        // Re-derived under the repository lock so concurrent patches compose.
        let vm = self
            .repository
            .update(
                id,
                Box::new(move |vm: &mut VirtualMachine| {
                    if let Ok(params) = derive(vm) {
                        vm.params = params;
                        vm.touch();
                    }
                }),
            )
            .await?;
        Ok(vm)
    }

    async fn finish_update(
        &self,
        id: &VmId,
        actor: &str,
        result: ProvisioningResult<VirtualMachine>,
    ) -> ProvisioningResult<VirtualMachine> {
        let record = match &result {
            Ok(vm) => {
                tracing::info!("updated params of {id}");
                AuditRecord::success(actor, AuditAction::Update)
                    .with_vm(vm)
                    .with_params_redacted(&vm.params)
            }
            Err(e) => {
                tracing::warn!("update of {id} failed: {e}");
                AuditRecord::failure(actor, AuditAction::Update, e).with_vm_id(id.clone())
            }
        };
        self.audit(record).await;
        result
    }

    /// Delete a stored VM
    ///
    /// # Errors
    /// `ProvisioningError::NotFound` if `id` is unknown.
    pub async fn delete_vm(&self, id: &VmId, actor: Option<&str>) -> ProvisioningResult<()> {
        let actor = self.actor(actor);
        let result = self.remove(id).await;
        let record = match &result {
            Ok(vm) => {
                tracing::info!("deleted {id}");
                AuditRecord::success(actor, AuditAction::Delete).with_vm(vm)
            }
            Err(e) => {
                tracing::warn!("delete of {id} failed: {e}");
                AuditRecord::failure(actor, AuditAction::Delete, e).with_vm_id(id.clone())
            }
        };
        self.audit(record).await;
        result.map(|_| ())
    }

    async fn remove(&self, id: &VmId) -> ProvisioningResult<VirtualMachine> {
        let vm = self.repository.get(id).await?;
        self.repository.delete(id).await?;
        Ok(vm)
    }

    /// Apply a power action to a stored VM
    ///
    /// Actions are idempotent: starting a running VM succeeds and leaves it
    /// running.
    ///
    /// # Errors
    /// `ProvisioningError::NotFound` if `id` is unknown.
    pub async fn perform_action(
        &self,
        id: &VmId,
        action: VmAction,
        actor: Option<&str>,
    ) -> ProvisioningResult<VirtualMachine> {
        let actor = self.actor(actor);
        let result = self.transition(id, action).await;
        let record = match &result {
            Ok((vm, transition)) => {
                if transition.is_noop() {
                    tracing::debug!("{action} on {id} left it {}", transition.to);
                } else {
                    tracing::info!("{action} on {id}: {} -> {}", transition.from, transition.to);
                }
                AuditRecord::success(actor, action.into())
                    .with_vm(vm)
                    .with_detail("from", transition.from.as_str())
                    .with_detail("to", transition.to.as_str())
            }
            Err(e) => {
                tracing::warn!("{action} on {id} failed: {e}");
                AuditRecord::failure(actor, action.into(), e).with_vm_id(id.clone())
            }
        };
        self.audit(record).await;
        result.map(|(vm, _)| vm)
    }

    async fn transition(
        &self,
        id: &VmId,
        action: VmAction,
    ) -> ProvisioningResult<(VirtualMachine, Transition)> {
        // The transition is computed under the repository lock so that
        // concurrent actions on one id see each other's results.
        let applied: Arc<Mutex<Option<Transition>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&applied);
        let vm = self
            .repository
            .update(
                id,
                Box::new(move |vm: &mut VirtualMachine| {
                    let transition = state_machine::apply(action, vm.status);
                    if !transition.is_noop() {
                        vm.status = transition.to;
                        vm.touch();
                    }
                    *slot.lock() = Some(transition);
                }),
            )
            .await?;

        let transition = applied.lock().take().ok_or_else(|| {
            ProvisioningError::Storage(format!("repository skipped the {action} mutation"))
        })?;
        Ok((vm, transition))
    }

    /// Apply a power action given as a raw token
    ///
    /// # Errors
    /// `ProvisioningError::InvalidAction` if `token` is not a known action,
    /// otherwise as [`Self::perform_action`].
    pub async fn perform_action_str(
        &self,
        id: &VmId,
        token: &str,
        actor: Option<&str>,
    ) -> ProvisioningResult<VirtualMachine> {
        match token.parse::<VmAction>() {
            Ok(action) => self.perform_action(id, action, actor).await,
            Err(err) => {
                tracing::warn!("rejected action on {id}: {err}");
                let record = AuditRecord::failure(self.actor(actor), AuditAction::Action, &err)
                    .with_vm_id(id.clone());
                self.audit(record).await;
                Err(err)
            }
        }
    }

    /// Fetch one VM
    ///
    /// # Errors
    /// `ProvisioningError::NotFound` if `id` is unknown.
    pub async fn get_vm(&self, id: &VmId) -> ProvisioningResult<VirtualMachine> {
        tracing::trace!("get {id}");
        Ok(self.repository.get(id).await?)
    }

    /// All VMs in creation order
    ///
    /// # Errors
    /// `ProvisioningError::Storage` if the repository read fails.
    pub async fn list_vms(&self) -> ProvisioningResult<Vec<VirtualMachine>> {
        Ok(self.repository.list().await?)
    }

    /// Liveness probe
    #[must_use]
    pub fn health_check(&self) -> HealthStatus {
        HealthStatus { status: "ok" }
    }

    fn actor(&self, actor: Option<&str>) -> String {
        actor.unwrap_or(&self.default_actor).to_string()
    }

    async fn audit(&self, record: AuditRecord) {
        if let Err(e) = self.audit.record(&record).await {
            tracing::warn!("audit sink failed for {:?}: {e}", record.action);
        }
    }
}
