//! VMF Core - request model and VM entity
//!
//! Shared types for the provisioning pipeline:
//! - [`Provider`]: closed set of target platforms
//! - [`ProviderParams`]: one parameter shape per provider
//! - [`CreationRequest`]: typed request, parsed from raw JSON
//! - [`VirtualMachine`]: the persisted entity and its [`Status`]
//! - [`ProvisioningError`]: the error taxonomy every layer reports through
//!
//! # Example
//!
//! ```rust
//! use vmf_core::{CreationRequest, Provider};
//! use serde_json::json;
//!
//! let raw = json!({
//!     "provider": "aws",
//!     "name": "mi-vm-aws",
//!     "params": {"instance_type": "t2.micro", "region": "us-east-1", "vpc": "vpc-123", "ami": "ami-abc"},
//!     "requested_by": "alumno"
//! });
//! let request = CreationRequest::parse(&raw).unwrap();
//! assert_eq!(request.provider, Provider::Aws);
//! ```

#![warn(unreachable_pub)]

pub mod action;
pub mod error;
pub mod params;
pub mod provider;
pub mod request;
pub mod vm;

// Re-exports for convenience
pub use action::VmAction;
pub use error::{
    ErrorBody, ErrorKind, ProvisioningError, ProvisioningResult, RequestError, StoreError,
    ValidationError,
};
pub use params::{AwsParams, AzureParams, GcpParams, OnPremiseParams, ProviderParams};
pub use provider::Provider;
pub use request::{CreationRequest, DEFAULT_ACTOR};
pub use vm::{Status, VirtualMachine, VmId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
