//! Record set merge planning
//!
//! Given the record sets listed from the zone, decide which single change
//! (if any) publishes or withdraws one SRV value. Planning is pure; the
//! adapter submits whatever change the plan produces.

use srvsync_core::srv::{SRV_TYPE, names_match};

/// A record set as listed from the hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Record name as returned by the zone (usually absolute)
    pub name: String,
    /// Record type, e.g. "SRV"
    pub record_type: String,
    /// TTL in seconds, if the set carries one
    pub ttl: Option<i64>,
    /// Record values in zone order
    pub values: Vec<String>,
}

/// Change action submitted to the zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Create or replace the record set
    Upsert,
    /// Delete the record set (must match the existing set exactly)
    Delete,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
            ChangeAction::Delete => "DELETE",
        }
    }
}

/// A single SRV record set change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub name: String,
    pub ttl: i64,
    pub values: Vec<String>,
}

/// What register has to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterPlan {
    /// The value is already published
    AlreadyPresent,
    /// Submit this upsert; `created` is true when no SRV set existed
    Upsert { change: RecordChange, created: bool },
}

/// What deregister has to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeregisterPlan {
    /// No SRV set, or the value is not in it
    Absent,
    /// The value was the last one; delete the whole set
    Delete(RecordChange),
    /// Rewrite the set without the value
    Upsert(RecordChange),
}

/// First listed SRV set whose name matches `name`
///
/// Listing starts at `name`, so later sets belong to other names or types
/// and are ignored.
pub fn find_srv_set<'a>(sets: &'a [RecordSet], name: &str) -> Option<&'a RecordSet> {
    sets.iter()
        .find(|set| names_match(&set.name, name) && set.record_type.eq_ignore_ascii_case(SRV_TYPE))
}

/// Plan publishing `value` under `name`
pub fn plan_register(sets: &[RecordSet], name: &str, value: &str, ttl: i64) -> RegisterPlan {
    let existing = find_srv_set(sets, name);

    let mut values = match existing {
        Some(set) if set.values.iter().any(|v| v == value) => {
            return RegisterPlan::AlreadyPresent;
        }
        Some(set) => dedup(&set.values),
        None => Vec::new(),
    };
    values.push(value.to_string());

    RegisterPlan::Upsert {
        change: RecordChange {
            action: ChangeAction::Upsert,
            name: name.to_string(),
            ttl,
            values,
        },
        created: existing.is_none(),
    }
}

/// Plan withdrawing `value` from `name`
///
/// A delete has to match the live set, so it carries the listed name, TTL
/// and values rather than the caller's.
pub fn plan_deregister(sets: &[RecordSet], name: &str, value: &str, ttl: i64) -> DeregisterPlan {
    let Some(set) = find_srv_set(sets, name) else {
        return DeregisterPlan::Absent;
    };

    if !set.values.iter().any(|v| v == value) {
        return DeregisterPlan::Absent;
    }

    let remaining: Vec<String> = dedup(&set.values)
        .into_iter()
        .filter(|v| v != value)
        .collect();

    if remaining.is_empty() {
        return DeregisterPlan::Delete(RecordChange {
            action: ChangeAction::Delete,
            name: set.name.clone(),
            ttl: set.ttl.unwrap_or(ttl),
            values: set.values.clone(),
        });
    }

    DeregisterPlan::Upsert(RecordChange {
        action: ChangeAction::Upsert,
        name: name.to_string(),
        ttl,
        values: remaining,
    })
}

/// Drop exact duplicates, keeping first occurrences in order
fn dedup(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}
