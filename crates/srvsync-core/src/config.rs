//! Configuration types for srvsync
//!
//! Registry backends are selected by URI, e.g. `route53://Z0123456789/example.com`.
//! The URI scheme names the adapter; the rest is adapter-specific.

use crate::error::{Error, Result};
use crate::service::Service;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

const ROUTE53_USAGE: &str = "route53: dns domain required e.g.: route53://<host>/<domain>";

/// Registry adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdapterConfig {
    /// AWS Route 53 SRV records
    Route53 {
        /// Hosted zone ID (URI host)
        hosted_zone_id: String,
        /// DNS domain that record names are placed under (first path segment)
        dns_name: String,
    },

    /// Adapter registered by a third-party crate
    Custom {
        /// URI scheme, used as the factory name
        scheme: String,
        /// The full registry URI
        uri: String,
    },
}

impl AdapterConfig {
    /// Parse a registry URI into an adapter configuration
    ///
    /// # Example
    ///
    /// ```
    /// use srvsync_core::AdapterConfig;
    ///
    /// let config = AdapterConfig::parse("route53://Z0123456789/example.com").unwrap();
    /// assert_eq!(
    ///     config,
    ///     AdapterConfig::Route53 {
    ///         hosted_zone_id: "Z0123456789".to_string(),
    ///         dns_name: "example.com".to_string(),
    ///     }
    /// );
    /// ```
    pub fn parse(uri: &str) -> Result<Self> {
        let parsed = Url::parse(uri)?;

        match parsed.scheme() {
            "route53" => {
                if parsed.path().len() < 2 {
                    return Err(Error::config(ROUTE53_USAGE));
                }

                let hosted_zone_id = parsed
                    .host_str()
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| {
                        Error::config("route53: hosted zone id required e.g.: route53://<host>/<domain>")
                    })?;

                let dns_name = parsed
                    .path()
                    .split('/')
                    .nth(1)
                    .filter(|d| !d.is_empty())
                    .ok_or_else(|| Error::config(ROUTE53_USAGE))?;

                Ok(AdapterConfig::Route53 {
                    hosted_zone_id: hosted_zone_id.to_string(),
                    dns_name: dns_name.to_string(),
                })
            }
            scheme => Ok(AdapterConfig::Custom {
                scheme: scheme.to_string(),
                uri: uri.to_string(),
            }),
        }
    }

    /// Validate the adapter configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            AdapterConfig::Route53 {
                hosted_zone_id,
                dns_name,
            } => {
                if hosted_zone_id.is_empty() {
                    return Err(Error::config("Route 53 hosted zone id cannot be empty"));
                }
                if dns_name.is_empty() {
                    return Err(Error::config(ROUTE53_USAGE));
                }
                Ok(())
            }
            AdapterConfig::Custom { scheme, uri } => {
                if scheme.is_empty() {
                    return Err(Error::config("Custom adapter scheme cannot be empty"));
                }
                if uri.is_empty() {
                    return Err(Error::config("Custom adapter URI cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the adapter type name (the URI scheme)
    pub fn type_name(&self) -> &str {
        match self {
            AdapterConfig::Route53 { .. } => "route53",
            AdapterConfig::Custom { scheme, .. } => scheme,
        }
    }
}

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Deregister every service still registered when the bridge stops
    #[serde(default = "default_deregister_on_shutdown")]
    pub deregister_on_shutdown: bool,

    /// Capacity of the bridge event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl BridgeConfig {
    /// Validate the bridge configuration
    pub fn validate(&self) -> Result<()> {
        if self.event_channel_capacity == 0 {
            return Err(Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            deregister_on_shutdown: default_deregister_on_shutdown(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_deregister_on_shutdown() -> bool {
    true
}

fn default_event_channel_capacity() -> usize {
    1000
}

/// Load a JSON array of services from a file
///
/// Every entry is validated and service IDs must be unique.
pub fn load_services(path: impl AsRef<Path>) -> Result<Vec<Service>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let services: Vec<Service> = serde_json::from_str(&content)?;

    let mut seen = HashSet::new();
    for service in &services {
        service.validate()?;
        if !seen.insert(service.id.as_str()) {
            return Err(Error::config(format!(
                "Duplicate service id '{}' in {}",
                service.id,
                path.display()
            )));
        }
    }

    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_route53_uri() {
        let config = AdapterConfig::parse("route53://Z1D633PJN98FT9/service.consul").unwrap();
        assert_eq!(config.type_name(), "route53");
        assert_eq!(
            config,
            AdapterConfig::Route53 {
                hosted_zone_id: "Z1D633PJN98FT9".to_string(),
                dns_name: "service.consul".to_string(),
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_route53_uses_first_path_segment() {
        let config = AdapterConfig::parse("route53://Z1/example.com/ignored").unwrap();
        assert!(matches!(
            config,
            AdapterConfig::Route53 { ref dns_name, .. } if dns_name == "example.com"
        ));
    }

    #[test]
    fn test_parse_route53_requires_domain() {
        for uri in ["route53://Z1", "route53://Z1/"] {
            let err = AdapterConfig::parse(uri).unwrap_err();
            assert!(
                err.to_string().contains("dns domain required"),
                "unexpected error for {}: {}",
                uri,
                err
            );
        }
    }

    #[test]
    fn test_parse_route53_requires_zone() {
        assert!(AdapterConfig::parse("route53:///example.com").is_err());
    }

    #[test]
    fn test_parse_custom_scheme() {
        let config = AdapterConfig::parse("consul://localhost:8500").unwrap();
        assert_eq!(config.type_name(), "consul");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_invalid_uri() {
        assert!(matches!(
            AdapterConfig::parse("not a uri"),
            Err(Error::Uri(_))
        ));
    }

    #[test]
    fn test_bridge_config_defaults() {
        let config: BridgeConfig = serde_json::from_str("{}").unwrap();
        assert!(config.deregister_on_shutdown);
        assert_eq!(config.event_channel_capacity, 1000);
        assert!(config.validate().is_ok());

        let config = BridgeConfig {
            event_channel_capacity: 0,
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_services() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "h1:web:80", "name": "web", "ip": "10.0.0.1", "port": 80, "ttl": 30}},
                {{"id": "h1:db:5432", "name": "db", "ip": "10.0.0.2", "port": 5432, "tags": ["primary"]}}
            ]"#
        )
        .unwrap();

        let services = load_services(file.path()).unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].ttl, 30);
        assert_eq!(services[1].tags, vec!["primary".to_string()]);
    }

    #[test]
    fn test_load_services_rejects_duplicates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "dup", "name": "web", "ip": "10.0.0.1", "port": 80}},
                {{"id": "dup", "name": "web", "ip": "10.0.0.2", "port": 80}}
            ]"#
        )
        .unwrap();

        let err = load_services(file.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate service id"));
    }

    #[test]
    fn test_load_services_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_services(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
