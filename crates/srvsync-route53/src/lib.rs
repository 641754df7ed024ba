// # Route 53 Registry Adapter
//
// Publishes services as SRV records in an AWS Route 53 hosted zone.
//
// ## Behavior
//
// - Record name: `<service>.<domain>.`, value: `1 1 <port> <ip>.`
// - Every operation is one list call followed by at most one change call
// - Existing values under the same name are kept; the service value is
//   merged in or pruned out
// - Removing the last value deletes the whole record set
// - `refresh` and `services` are no-ops; nothing is polled or cached
// - NO retry or backoff (errors go back to the caller)
// - NO credential handling (AWS SDK default provider chain)
//
// ## Registry URI
//
// `route53://<hosted-zone-id>/<domain>`, e.g. `route53://Z0123456789ABC/service.internal`
//
// ## Dry-Run Mode
//
// With `SRVSYNC_MODE=dry-run` the list call still runs, but the change batch
// is only logged.
//
// ## API Reference
//
// - ListResourceRecordSets: start name + start type, max 1000 items
// - ChangeResourceRecordSets: one UPSERT or DELETE per call

pub mod plan;
pub mod zone;

#[cfg(test)]
mod memory_zone;

use async_trait::async_trait;
use plan::{DeregisterPlan, RecordChange, RecordSet, RegisterPlan};
use srvsync_core::config::AdapterConfig;
use srvsync_core::srv::{SRV_TYPE, record_name, srv_value};
use srvsync_core::traits::{
    DeregisterOutcome, RegisterOutcome, RegistryAdapter, RegistryAdapterFactory,
};
use srvsync_core::{AdapterRegistry, Error, Result, Service};
use tracing::{debug, info};

pub use zone::{AwsZoneApi, ZoneApi};

/// Upper bound on record sets returned by one list call
pub const LIST_MAX_ITEMS: i32 = 1000;

/// Route 53 SRV registry adapter
///
/// Stateless: every call re-reads the live record set before changing it.
pub struct Route53Adapter<Z = AwsZoneApi> {
    /// Hosted zone ID
    hosted_zone_id: String,

    /// Domain that record names are placed under
    dns_name: String,

    /// Zone API client
    zone: Z,

    /// Dry-run mode: list, but only log changes
    dry_run: bool,
}

impl<Z> std::fmt::Debug for Route53Adapter<Z> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Adapter")
            .field("hosted_zone_id", &self.hosted_zone_id)
            .field("dns_name", &self.dns_name)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Adapter<AwsZoneApi> {
    /// Create an adapter using the AWS SDK default configuration chain
    pub async fn from_env(
        hosted_zone_id: impl Into<String>,
        dns_name: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self::new(hosted_zone_id, dns_name, AwsZoneApi::from_env().await, dry_run)
    }
}

impl<Z: ZoneApi> Route53Adapter<Z> {
    /// Create an adapter over any zone API implementation
    pub fn new(
        hosted_zone_id: impl Into<String>,
        dns_name: impl Into<String>,
        zone: Z,
        dry_run: bool,
    ) -> Self {
        Self {
            hosted_zone_id: hosted_zone_id.into(),
            dns_name: dns_name.into(),
            zone,
            dry_run,
        }
    }

    pub fn hosted_zone_id(&self) -> &str {
        &self.hosted_zone_id
    }

    pub fn dns_name(&self) -> &str {
        &self.dns_name
    }

    async fn list_from(&self, name: &str) -> Result<Vec<RecordSet>> {
        self.zone
            .list_record_sets(&self.hosted_zone_id, name, SRV_TYPE, LIST_MAX_ITEMS)
            .await
    }

    async fn submit(&self, change: &RecordChange) -> Result<()> {
        if self.dry_run {
            info!(
                "[DRY-RUN] Would submit change to zone {}: {}",
                self.hosted_zone_id,
                serde_json::json!({
                    "Action": change.action.as_str(),
                    "Name": change.name,
                    "Type": SRV_TYPE,
                    "TTL": change.ttl,
                    "ResourceRecords": change.values,
                })
            );
            return Ok(());
        }

        self.zone.change_record_set(&self.hosted_zone_id, change).await
    }
}

#[async_trait]
impl<Z: ZoneApi + 'static> RegistryAdapter for Route53Adapter<Z> {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn register(&self, service: &Service) -> Result<RegisterOutcome> {
        let name = record_name(&service.name, &self.dns_name);
        let value = srv_value(service.port, service.ip);

        let sets = self.list_from(&name).await?;

        match plan::plan_register(&sets, &name, &value, i64::from(service.ttl)) {
            RegisterPlan::AlreadyPresent => {
                info!("Record '{}' already present in {}", value, name);
                Ok(RegisterOutcome::Unchanged { record_name: name })
            }
            RegisterPlan::Upsert { change, created } => {
                debug!(
                    "Upserting {} with {} value(s) (ttl {})",
                    name,
                    change.values.len(),
                    change.ttl
                );
                self.submit(&change).await?;

                if created {
                    Ok(RegisterOutcome::Created { record_name: name })
                } else {
                    Ok(RegisterOutcome::Merged {
                        record_name: name,
                        records: change.values.len(),
                    })
                }
            }
        }
    }

    async fn deregister(&self, service: &Service) -> Result<DeregisterOutcome> {
        let name = record_name(&service.name, &self.dns_name);
        let value = srv_value(service.port, service.ip);

        let sets = self.list_from(&name).await?;

        match plan::plan_deregister(&sets, &name, &value, i64::from(service.ttl)) {
            DeregisterPlan::Absent => {
                debug!("Record '{}' not present in {}", value, name);
                Ok(DeregisterOutcome::NotFound { record_name: name })
            }
            DeregisterPlan::Delete(change) => {
                debug!("Deleting {}, '{}' was its last value", name, value);
                self.submit(&change).await?;
                Ok(DeregisterOutcome::Deleted { record_name: name })
            }
            DeregisterPlan::Upsert(change) => {
                debug!("Removing '{}' from {}", value, name);
                self.submit(&change).await?;
                Ok(DeregisterOutcome::Pruned {
                    record_name: name,
                    remaining: change.values.len(),
                })
            }
        }
    }

    async fn refresh(&self, _service: &Service) -> Result<()> {
        Ok(())
    }

    async fn services(&self) -> Result<Vec<Service>> {
        Ok(Vec::new())
    }

    fn adapter_name(&self) -> &'static str {
        "route53"
    }
}

/// Factory for creating Route 53 adapters
pub struct Route53Factory;

#[async_trait]
impl RegistryAdapterFactory for Route53Factory {
    async fn create(&self, config: &AdapterConfig) -> Result<Box<dyn RegistryAdapter>> {
        match config {
            AdapterConfig::Route53 {
                hosted_zone_id,
                dns_name,
            } => {
                config.validate()?;

                let dry_run = is_dry_run(std::env::var("SRVSYNC_MODE").ok().as_deref());

                if dry_run {
                    tracing::warn!("Route 53 adapter running in DRY-RUN mode - no changes will be made");
                }

                Ok(Box::new(
                    Route53Adapter::from_env(hosted_zone_id.clone(), dns_name.clone(), dry_run)
                        .await,
                ))
            }
            _ => Err(Error::config("Invalid config for Route 53 adapter")),
        }
    }
}

/// Whether an `SRVSYNC_MODE` value selects dry-run
fn is_dry_run(mode: Option<&str>) -> bool {
    mode.is_some_and(|m| m.trim().eq_ignore_ascii_case("dry-run"))
}

/// Register the Route 53 adapter with a registry
///
/// # Example
///
/// ```rust
/// use srvsync_core::AdapterRegistry;
///
/// let registry = AdapterRegistry::new();
/// srvsync_route53::register(&registry);
/// assert!(registry.has_adapter("route53"));
/// ```
pub fn register(registry: &AdapterRegistry) {
    registry.register_factory("route53", Box::new(Route53Factory));
}
