//! VMF Service - provisioning use cases
//!
//! [`ProvisioningService`] wires the factory registry, a [`VmRepository`]
//! and an [`AuditSink`] together behind create, update, delete, power-action
//! and query operations.
//!
//! # Example
//!
//! ```rust,ignore
//! use vmf_service::{ProvisioningService, ServiceConfig};
//! use vmf_core::VmAction;
//!
//! let service = ProvisioningService::from_config(&ServiceConfig::default()).await?;
//! let vm = service.create_from_json(&raw).await?;
//! let vm = service.perform_action(&vm.id, VmAction::Start, Some("alumno")).await?;
//! ```
//!
//! [`VmRepository`]: vmf_store::VmRepository
//! [`AuditSink`]: vmf_audit::AuditSink

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
mod service;
pub mod state_machine;

// Re-exports
pub use config::{AuditConfig, AuditSinkKind, ConfigError, LogFormat, LoggingConfig, ServiceConfig};
pub use service::{HealthStatus, ProvisioningService};
pub use state_machine::Transition;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
