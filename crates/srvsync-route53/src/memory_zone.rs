//! In-memory hosted zone for adapter tests
//!
//! Mirrors the Route 53 behaviors the adapter depends on: names are stored
//! lowercase and absolute, listing is ordered by (name, type) and starts at
//! the given point, and a DELETE must match the live set exactly.

use crate::plan::{ChangeAction, RecordChange, RecordSet};
use crate::zone::ZoneApi;
use async_trait::async_trait;
use srvsync_core::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct MemoryZone {
    sets: Mutex<Vec<RecordSet>>,
    changes: Mutex<Vec<RecordChange>>,
    list_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_change: AtomicBool,
}

impl MemoryZone {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_sets(sets: Vec<RecordSet>) -> Arc<Self> {
        let zone = Self::default();
        for set in sets {
            zone.put(set);
        }
        Arc::new(zone)
    }

    pub fn get(&self, name: &str, record_type: &str) -> Option<RecordSet> {
        let name = normalize(name);
        self.sets
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.name == name && s.record_type == record_type)
            .cloned()
    }

    pub fn changes(&self) -> Vec<RecordChange> {
        self.changes.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fail_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_change(&self) {
        self.fail_change.store(true, Ordering::SeqCst);
    }

    fn put(&self, mut set: RecordSet) {
        set.name = normalize(&set.name);
        let mut sets = self.sets.lock().unwrap();
        sets.retain(|s| !(s.name == set.name && s.record_type == set.record_type));
        sets.push(set);
        sets.sort_by(|a, b| (&a.name, &a.record_type).cmp(&(&b.name, &b.record_type)));
    }
}

fn normalize(name: &str) -> String {
    let name = name.strip_suffix('.').unwrap_or(name);
    format!("{}.", name.to_ascii_lowercase())
}

#[async_trait]
impl ZoneApi for Arc<MemoryZone> {
    async fn list_record_sets(
        &self,
        _hosted_zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: i32,
    ) -> Result<Vec<RecordSet>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::rate_limited("ListResourceRecordSets failed: Throttling"));
        }

        let start = (normalize(start_name), start_type.to_string());
        Ok(self
            .sets
            .lock()
            .unwrap()
            .iter()
            .filter(|s| (s.name.clone(), s.record_type.clone()) >= start)
            .take(max_items as usize)
            .cloned()
            .collect())
    }

    async fn change_record_set(&self, _hosted_zone_id: &str, change: &RecordChange) -> Result<()> {
        if self.fail_change.load(Ordering::SeqCst) {
            return Err(Error::invalid_input("ChangeResourceRecordSets failed: InvalidChangeBatch"));
        }
        self.changes.lock().unwrap().push(change.clone());

        match change.action {
            ChangeAction::Upsert => self.put(RecordSet {
                name: change.name.clone(),
                record_type: "SRV".to_string(),
                ttl: Some(change.ttl),
                values: change.values.clone(),
            }),
            ChangeAction::Delete => {
                let live = self.get(&change.name, "SRV");
                let matches = live.as_ref().is_some_and(|s| {
                    s.ttl == Some(change.ttl) && s.values == change.values
                });
                if !matches {
                    return Err(Error::invalid_input(
                        "ChangeResourceRecordSets failed: record set not found or values do not match",
                    ));
                }
                let name = normalize(&change.name);
                self.sets
                    .lock()
                    .unwrap()
                    .retain(|s| !(s.name == name && s.record_type == "SRV"));
            }
        }

        Ok(())
    }
}
