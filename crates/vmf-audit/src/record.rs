//! Audit record model
//!
//! One [`AuditRecord`] per completed or failed mutating use case. The
//! serialized field order is fixed:
//! `timestamp, actor, action, vm_id, provider, success, details`.
//!
//! `details` carries identifying fields only. Provider params are treated as
//! sensitive: records list which fields a shape has, never their values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vmf_core::{ProviderParams, Provider, ProvisioningError, VirtualMachine, VmAction, VmId};

/// Audited operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// VM creation
    Create,
    /// Params replacement
    Update,
    /// VM removal
    Delete,
    /// Power on
    Start,
    /// Power off
    Stop,
    /// Power cycle
    Restart,
    /// Power action whose token did not parse
    Action,
}

impl From<VmAction> for AuditAction {
    fn from(action: VmAction) -> Self {
        match action {
            VmAction::Start => Self::Start,
            VmAction::Stop => Self::Stop,
            VmAction::Restart => Self::Restart,
        }
    }
}

/// Immutable audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// When the use case finished
    pub timestamp: DateTime<Utc>,
    /// Who requested it
    pub actor: String,
    /// What was requested
    pub action: AuditAction,
    /// Target VM, when known
    pub vm_id: Option<VmId>,
    /// Target provider, when known
    pub provider: Option<Provider>,
    /// Outcome of the use case
    pub success: bool,
    /// Non-sensitive context
    pub details: Value,
}

impl AuditRecord {
    fn new(actor: impl Into<String>, action: AuditAction, success: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            actor: actor.into(),
            action,
            vm_id: None,
            provider: None,
            success,
            details: Value::Object(Map::new()),
        }
    }

    /// Record of a successful use case
    #[must_use]
    pub fn success(actor: impl Into<String>, action: AuditAction) -> Self {
        Self::new(actor, action, true)
    }

    /// Record of a failed use case; the error kind and reason go into details
    #[must_use]
    pub fn failure(actor: impl Into<String>, action: AuditAction, error: &ProvisioningError) -> Self {
        let mut record = Self::new(actor, action, false);
        record = record
            .with_detail("error", error.kind().as_str())
            .with_detail("reason", error.to_string());
        if let ProvisioningError::Validation(e) = error {
            record = record.with_detail("field", e.field.clone());
        }
        record
    }

    /// Attach target id and provider, plus name and status
    #[must_use]
    pub fn with_vm(self, vm: &VirtualMachine) -> Self {
        self.with_vm_id(vm.id.clone())
            .with_provider(vm.provider)
            .with_detail("name", vm.name.clone())
            .with_detail("status", vm.status.as_str())
    }

    /// Attach target id
    #[inline]
    #[must_use]
    pub fn with_vm_id(mut self, id: VmId) -> Self {
        self.vm_id = Some(id);
        self
    }

    /// Attach provider
    #[inline]
    #[must_use]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Describe a params shape without its values
    #[must_use]
    pub fn with_params_redacted(self, params: &ProviderParams) -> Self {
        let fields: Vec<Value> = params
            .field_names()
            .iter()
            .map(|f| Value::String((*f).to_string()))
            .collect();
        self.with_detail("params_fields", Value::Array(fields))
    }

    /// Add one detail entry
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.details {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// Encode as a single JSON line (no trailing newline)
    ///
    /// # Errors
    /// `serde_json::Error` if encoding fails.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmf_core::{AwsParams, Status, ValidationError};

    fn aws_vm() -> VirtualMachine {
        VirtualMachine::new(
            VmId::from("aws-1"),
            "mi-vm-aws",
            ProviderParams::Aws(AwsParams {
                instance_type: "t2.micro".into(),
                region: "us-east-1".into(),
                vpc: "vpc-secret-123".into(),
                ami: "ami-abc".into(),
            }),
            Status::Stopped,
        )
    }

    #[test]
    fn field_order_is_stable() {
        let line = AuditRecord::success("alumno", AuditAction::Create)
            .with_vm(&aws_vm())
            .to_json_line()
            .unwrap();

        let keys = ["timestamp", "actor", "action", "vm_id", "provider", "success", "details"];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| line.find(&format!("\"{k}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{line}");
    }

    #[test]
    fn params_are_redacted() {
        let vm = aws_vm();
        let line = AuditRecord::success("alumno", AuditAction::Create)
            .with_vm(&vm)
            .with_params_redacted(&vm.params)
            .to_json_line()
            .unwrap();

        assert!(line.contains("\"params_fields\":[\"instance_type\",\"region\",\"vpc\",\"ami\"]"));
        assert!(!line.contains("vpc-secret-123"));
        assert!(!line.contains("t2.micro"));
    }

    #[test]
    fn failure_carries_kind_and_field() {
        let err = ProvisioningError::Validation(ValidationError::missing("params.machine_type"));
        let record = AuditRecord::failure("alumno", AuditAction::Create, &err)
            .with_provider(Provider::Gcp);

        assert!(!record.success);
        assert_eq!(record.vm_id, None);
        assert_eq!(record.details["error"], "validation_error");
        assert_eq!(record.details["field"], "params.machine_type");
    }

    #[test]
    fn absent_target_serializes_as_null() {
        let json = serde_json::to_value(AuditRecord::success("a", AuditAction::Delete)).unwrap();
        assert!(json["vm_id"].is_null());
        assert!(json["provider"].is_null());
        assert_eq!(json["action"], "delete");
    }

    #[test]
    fn vm_action_maps_to_audit_action() {
        assert_eq!(AuditAction::from(VmAction::Restart), AuditAction::Restart);
    }
}
