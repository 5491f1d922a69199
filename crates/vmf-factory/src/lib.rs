//! VMF Factory - provider construction strategies
//!
//! # Core Concepts
//!
//! - [`VmFactory`]: capability every provider's constructor implements
//! - [`AwsFactory`], [`AzureFactory`], [`GcpFactory`], [`OnPremiseFactory`]: built-in strategies
//! - [`FactoryRegistry`]: provider tag to factory lookup
//!
//! # Example
//!
//! ```rust,ignore
//! use vmf_factory::FactoryRegistry;
//! use vmf_core::Provider;
//!
//! let registry = FactoryRegistry::with_defaults();
//! let factory = registry.resolve(Provider::Aws)?;
//! let vm = factory.build("web-1", params)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod factory;
mod providers;
mod registry;

// Re-exports
pub use factory::VmFactory;
pub use providers::{AwsFactory, AzureFactory, GcpFactory, OnPremiseFactory};
pub use registry::FactoryRegistry;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
