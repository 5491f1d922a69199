//! Virtual machine entity
//!
//! The repository owns the canonical copy of every [`VirtualMachine`]; callers
//! only ever receive clones.

use crate::params::ProviderParams;
use crate::provider::Provider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique VM identifier (`<provider prefix>-<uuid>`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VmId(String);

impl VmId {
    /// Generate a fresh id under `prefix`
    #[inline]
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4()))
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VmId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VmId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for VmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Power status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Being brought up by the provider
    Provisioning,
    /// Powered on
    Running,
    /// Powered off
    Stopped,
}

impl Status {
    /// Wire label
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provisioned virtual machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachine {
    /// Unique id, assigned by the factory
    pub id: VmId,
    /// Provider tag; always equals `params.provider()`
    pub provider: Provider,
    /// Display name
    pub name: String,
    /// Provider-specific parameters
    pub params: ProviderParams,
    /// Current power status
    pub status: Status,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl VirtualMachine {
    /// Create new VM entity stamped with the current time
    #[must_use]
    pub fn new(id: VmId, name: impl Into<String>, params: ProviderParams, status: Status) -> Self {
        let now = Utc::now();
        Self {
            id,
            provider: params.provider(),
            name: name.into(),
            params,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at`
    #[inline]
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Equality ignoring mutable bookkeeping (`updated_at`)
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id
            && self.provider == other.provider
            && self.name == other.name
            && self.params == other.params
            && self.status == other.status
            && self.created_at == other.created_at
    }
}
