//! Test doubles and common utilities for bridge contract tests
//!
//! The mock adapter records every call so tests can assert exactly what
//! reached the registry, and can be told to fail for specific services.

#![allow(dead_code)]

use srvsync_core::error::{Error, Result};
use srvsync_core::srv::record_name;
use srvsync_core::{
    BridgeConfig, DeregisterOutcome, RegisterOutcome, RegistryAdapter, Service,
};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// A recorded adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register(String),
    Deregister(String),
    Refresh(String),
}

/// A mock RegistryAdapter that tracks calls
pub struct MockAdapter {
    /// Calls in the order they were made
    calls: Arc<Mutex<Vec<Call>>>,
    /// Service IDs whose calls fail
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Create a new MockAdapter that shares state with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            calls: Arc::clone(&other.calls),
            failing: Arc::clone(&other.failing),
        }
    }

    /// Make every call for this service ID fail
    pub fn fail_for(&self, service_id: &str) {
        self.failing.lock().unwrap().insert(service_id.to_string());
    }

    /// Let calls for this service ID succeed again
    pub fn recover(&self, service_id: &str) {
        self.failing.lock().unwrap().remove(service_id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: Call, service_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(service_id) {
            return Err(Error::provider("mock", "registry unavailable"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RegistryAdapter for MockAdapter {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn register(&self, service: &Service) -> Result<RegisterOutcome> {
        self.record(Call::Register(service.id.clone()), &service.id)?;
        Ok(RegisterOutcome::Created {
            record_name: record_name(&service.name, "example.com"),
        })
    }

    async fn deregister(&self, service: &Service) -> Result<DeregisterOutcome> {
        self.record(Call::Deregister(service.id.clone()), &service.id)?;
        Ok(DeregisterOutcome::Deleted {
            record_name: record_name(&service.name, "example.com"),
        })
    }

    async fn refresh(&self, service: &Service) -> Result<()> {
        self.record(Call::Refresh(service.id.clone()), &service.id)
    }

    async fn services(&self) -> Result<Vec<Service>> {
        Ok(Vec::new())
    }

    fn adapter_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to build a service on 10.0.0.<host>
pub fn service(id: &str, name: &str, host: u8, port: u16) -> Service {
    Service::new(id, name, IpAddr::from([10, 0, 0, host]), port)
}

/// Helper to create a BridgeConfig for testing
pub fn minimal_config(deregister_on_shutdown: bool) -> BridgeConfig {
    BridgeConfig {
        deregister_on_shutdown,
        event_channel_capacity: 100,
    }
}
