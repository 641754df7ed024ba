//! Plugin-based adapter registry
//!
//! The registry maps registry URI schemes to adapter factories, so the
//! daemon never hard-codes which backends exist.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use srvsync_core::AdapterRegistry;
//!
//! let registry = AdapterRegistry::new();
//! srvsync_route53::register(&registry);
//!
//! let adapter = registry
//!     .create_from_uri("route53://Z0123456789/example.com")
//!     .await?;
//! ```
//!
//! ## Registration
//!
//! Adapter crates expose a `register()` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &AdapterRegistry) {
//!     registry.register_factory("route53", Box::new(Route53Factory));
//! }
//! ```

use crate::config::AdapterConfig;
use crate::error::{Error, Result};
use crate::traits::{RegistryAdapter, RegistryAdapterFactory};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Adapter registry keyed by URI scheme
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct AdapterRegistry {
    factories: RwLock<HashMap<String, Arc<dyn RegistryAdapterFactory>>>,
}

impl AdapterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter factory under a URI scheme
    ///
    /// Registering the same scheme twice replaces the earlier factory.
    pub fn register_factory(
        &self,
        scheme: impl Into<String>,
        factory: Box<dyn RegistryAdapterFactory>,
    ) {
        let scheme = scheme.into();
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        factories.insert(scheme, Arc::from(factory));
    }

    /// Create an adapter from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RegistryAdapter>)`: Created adapter instance
    /// - `Err(Error)`: If the scheme is not registered, the config is invalid,
    ///   or creation fails
    pub async fn create_adapter(&self, config: &AdapterConfig) -> Result<Box<dyn RegistryAdapter>> {
        config.validate()?;

        let adapter_type = config.type_name();
        let factory = {
            let factories = self
                .factories
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            factories
                .get(adapter_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown adapter type: {}", adapter_type)))?
        };

        // Lock is released before the async create
        factory.create(config).await
    }

    /// Parse a registry URI and create the matching adapter
    pub async fn create_from_uri(&self, uri: &str) -> Result<Box<dyn RegistryAdapter>> {
        let config = AdapterConfig::parse(uri)?;
        self.create_adapter(&config).await
    }

    /// List all registered adapter schemes
    pub fn list_adapters(&self) -> Vec<String> {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut schemes: Vec<String> = factories.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Check if an adapter scheme is registered
    pub fn has_adapter(&self, scheme: &str) -> bool {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        factories.contains_key(scheme)
    }
}
