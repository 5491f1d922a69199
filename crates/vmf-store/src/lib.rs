//! VMF Store - repository port and in-memory backend
//!
//! - [`VmRepository`]: the storage contract the provisioning service depends on
//! - [`InMemoryVmRepository`]: lock-guarded, insertion-ordered implementation
//!
//! A durable backend replaces the in-memory one by implementing the same trait
//! and reporting I/O failures as [`vmf_core::StoreError::Backend`].

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod memory;
mod repository;

pub use memory::InMemoryVmRepository;
pub use repository::{StoreResult, VmMutator, VmRepository};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
