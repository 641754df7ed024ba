//! Core traits for srvsync
//!
//! This module defines the abstract interfaces that all registry backends follow.
//!
//! - [`RegistryAdapter`]: Publish and withdraw services in a registry
//! - [`RegistryAdapterFactory`]: Build adapters from configuration

pub mod registry_adapter;

pub use registry_adapter::{
    DeregisterOutcome, RegisterOutcome, RegistryAdapter, RegistryAdapterFactory,
};
