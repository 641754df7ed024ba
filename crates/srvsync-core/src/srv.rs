//! SRV record naming and value formatting
//!
//! Every adapter publishes a service as an SRV record named
//! `<service>.<domain>.` whose value is `priority weight port target`.
//! Priority and weight are fixed at 1; the target is the service IP
//! written as an absolute name.

use std::net::IpAddr;

/// Fixed SRV priority
pub const SRV_PRIORITY: u16 = 1;

/// Fixed SRV weight
pub const SRV_WEIGHT: u16 = 1;

/// Record type string used by remote zone APIs
pub const SRV_TYPE: &str = "SRV";

/// Fully qualified record name for a service in a domain
///
/// ```
/// use srvsync_core::srv::record_name;
///
/// assert_eq!(record_name("web", "example.com"), "web.example.com.");
/// assert_eq!(record_name("web", "example.com."), "web.example.com.");
/// ```
pub fn record_name(service_name: &str, dns_name: &str) -> String {
    format!("{}.{}.", service_name, strip_root(dns_name))
}

/// SRV record value for a service endpoint
///
/// ```
/// use srvsync_core::srv::srv_value;
/// use std::net::IpAddr;
///
/// assert_eq!(srv_value(8080, IpAddr::from([10, 0, 0, 7])), "1 1 8080 10.0.0.7.");
/// ```
pub fn srv_value(port: u16, ip: IpAddr) -> String {
    format!("{} {} {} {}.", SRV_PRIORITY, SRV_WEIGHT, port, ip)
}

/// Compare two DNS names, ignoring ASCII case and a trailing dot
pub fn names_match(a: &str, b: &str) -> bool {
    strip_root(a).eq_ignore_ascii_case(strip_root(b))
}

fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
