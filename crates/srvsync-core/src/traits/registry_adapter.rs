// # Registry Adapter Trait
//
// Defines the interface a service registry backend implements so the bridge
// can publish discovered services into it.
//
// ## Implementations
//
// - Route 53 SRV records: `srvsync-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use srvsync_core::{RegistryAdapter, Service};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let adapter = /* RegistryAdapter implementation */;
//     let service = Service::new("host:web:80", "web", "10.0.0.1".parse()?, 80);
//
//     adapter.register(&service).await?;
//     adapter.deregister(&service).await?;
//
//     Ok(())
// }
// ```

use crate::config::AdapterConfig;
use crate::service::Service;
use async_trait::async_trait;

/// Result of a register operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// No record set existed under the name; one was created
    Created {
        /// Fully qualified record name
        record_name: String,
    },
    /// The service value was appended to an existing record set
    Merged {
        /// Fully qualified record name
        record_name: String,
        /// Number of values in the record set after the merge
        records: usize,
    },
    /// The record set already contained the service value (no-op)
    Unchanged {
        /// Fully qualified record name
        record_name: String,
    },
}

/// Result of a deregister operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeregisterOutcome {
    /// The service value was the last one; the whole record set was deleted
    Deleted {
        /// Fully qualified record name
        record_name: String,
    },
    /// The service value was removed; other values remain
    Pruned {
        /// Fully qualified record name
        record_name: String,
        /// Number of values left in the record set
        remaining: usize,
    },
    /// Nothing to remove (no record set, or value not present)
    NotFound {
        /// Fully qualified record name
        record_name: String,
    },
}

/// Trait for service registry backends
///
/// Adapters are stateless between calls. Each operation talks to the remote
/// registry directly and reports failures to the caller; retry policy, if
/// any, belongs to whoever drives the adapter.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Check that the registry is reachable
    async fn ping(&self) -> Result<(), crate::Error>;

    /// Publish a service
    ///
    /// Existing entries under the same name are preserved; the service is
    /// merged into them. Registering the same service twice is a no-op.
    async fn register(&self, service: &Service) -> Result<RegisterOutcome, crate::Error>;

    /// Withdraw a service
    ///
    /// Only the entry for this service is removed. Deregistering a service
    /// that is not published is a no-op.
    async fn deregister(&self, service: &Service) -> Result<DeregisterOutcome, crate::Error>;

    /// Refresh a service's registration (TTL-based registries)
    async fn refresh(&self, service: &Service) -> Result<(), crate::Error>;

    /// List the services the registry knows about
    async fn services(&self) -> Result<Vec<Service>, crate::Error>;

    /// Get the adapter name (for logging/debugging)
    fn adapter_name(&self) -> &'static str;
}

/// Helper trait for constructing registry adapters from configuration
///
/// Construction is async because adapters may need to load SDK
/// configuration or credentials before the first call.
#[async_trait]
pub trait RegistryAdapterFactory: Send + Sync {
    /// Create a RegistryAdapter instance from configuration
    async fn create(
        &self,
        config: &AdapterConfig,
    ) -> Result<Box<dyn RegistryAdapter>, crate::Error>;
}
