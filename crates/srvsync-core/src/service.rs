//! Service model
//!
//! A [`Service`] is one discovered network endpoint that a registry adapter
//! publishes. Only `name`, `ip`, `port` and `ttl` reach the SRV record; the
//! remaining fields identify and describe the service for the bridge.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// A discovered service to publish in a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Unique service instance ID (e.g., "host:container:port")
    pub id: String,

    /// Service name, used as the leftmost label(s) of the record name
    pub name: String,

    /// Address the service listens on
    pub ip: IpAddr,

    /// Port the service listens on
    pub port: u16,

    /// Record TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Free-form attributes
    #[serde(default)]
    pub attrs: HashMap<String, String>,
}

impl Service {
    /// Create a new service with the default TTL
    pub fn new(id: impl Into<String>, name: impl Into<String>, ip: IpAddr, port: u16) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ip,
            port,
            ttl: default_ttl(),
            tags: Vec::new(),
            attrs: HashMap::new(),
        }
    }

    /// Set the record TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Validate the service definition
    ///
    /// The name must be usable as the left part of a DNS name: dot-separated
    /// labels of 1-63 alphanumeric, hyphen or underscore characters, with no
    /// label starting or ending in a hyphen.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::service("service id cannot be empty"));
        }

        if self.name.is_empty() {
            return Err(Error::service(format!("service {} has an empty name", self.id)));
        }

        for label in self.name.split('.') {
            if label.is_empty() || label.len() > 63 {
                return Err(Error::service(format!(
                    "service name '{}' has a label of invalid length",
                    self.name
                )));
            }
            if !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(Error::service(format!(
                    "service name '{}' contains invalid characters",
                    self.name
                )));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(Error::service(format!(
                    "service name '{}' has a label starting or ending with hyphen",
                    self.name
                )));
            }
        }

        if self.port == 0 {
            return Err(Error::service(format!("service {} has port 0", self.id)));
        }

        if self.ttl == 0 {
            return Err(Error::service(format!("service {} has TTL 0", self.id)));
        }

        Ok(())
    }
}

fn default_ttl() -> u32 {
    60
}
