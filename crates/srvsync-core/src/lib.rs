// # srvsync-core
//
// Core library for publishing discovered services into DNS-backed registries.
//
// ## Architecture Overview
//
// - **Service**: A discovered endpoint (name, IP, port, TTL)
// - **RegistryAdapter**: Trait for registry backends (register/deregister/refresh/services/ping)
// - **AdapterRegistry**: Plugin-based registry mapping URI schemes to adapter factories
// - **Bridge**: Event loop that feeds service events into one adapter
// - **srv**: SRV record naming and value formatting shared by adapters
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Backends live in their own crates
// 2. **Plugin-Based**: Adapters are selected by URI scheme, no hard-coded if-else
// 3. **Library-First**: Everything the daemon does is available as a library
// 4. **Stateless Adapters**: Remote state is re-read on every call

pub mod bridge;
pub mod config;
pub mod error;
pub mod registry;
pub mod service;
pub mod srv;
pub mod traits;

// Re-export core types for convenience
pub use bridge::{Bridge, BridgeEvent, ServiceEvent};
pub use config::{AdapterConfig, BridgeConfig, load_services};
pub use error::{Error, Result};
pub use registry::AdapterRegistry;
pub use service::Service;
pub use traits::{DeregisterOutcome, RegisterOutcome, RegistryAdapter, RegistryAdapterFactory};
