//! VMF Audit - append-only audit trail
//!
//! - [`AuditRecord`]: structured outcome of one mutating use case
//! - [`AuditSink`]: append-only recorder port
//! - [`MemoryAuditSink`], [`JsonLinesAuditSink`], [`TracingAuditSink`]: built-in sinks
//!
//! Audit is observability, not a transactional participant: callers treat a
//! failing sink as a warning.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod record;
mod sink;

pub use record::{AuditAction, AuditRecord};
pub use sink::{AuditError, AuditSink, JsonLinesAuditSink, MemoryAuditSink, TracingAuditSink};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
