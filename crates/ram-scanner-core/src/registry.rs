//! Permanent version numbers and per-variant aggregates.
//!
//! A variant is every scan sharing one canonical barcode. Each distinct
//! barcode is bound to a version the first time it is recorded or mapped:
//! `max(existing) + 1`, never changed and never reused, even after the scan
//! history is cleared. The ledger persists only `(id, timestamp, barcode,
//! version)`; classifications are recomputed from the current mappings
//! whenever the ledger is loaded.

use crate::classify::{ClassificationEngine, ClassificationResult};
use crate::error::Result;
use crate::mapping::MappingStore;
use crate::storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Minimal persisted record of one successful scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: u64,
    pub timestamp: String,
    pub barcode: String,
    pub version: u32,
}

/// A scan event together with its (derived) classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub event: ScanEvent,
    pub classification: ClassificationResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantAggregate {
    pub count: usize,
    /// Classification of the most recent scan of this variant.
    pub latest: ClassificationResult,
}

#[derive(Debug, Default)]
pub struct VariantRegistry {
    path: Option<PathBuf>,
    entries: Vec<ScanEntry>,
    aggregates: BTreeMap<String, VariantAggregate>,
    last_id: u64,
}

impl VariantRegistry {
    /// Load the ledger at `path` and rebuild against `store`.
    pub fn load(path: impl AsRef<Path>, store: &mut MappingStore) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let events = storage::load_ledger(&path);
        let mut registry = Self {
            path: Some(path),
            ..Default::default()
        };
        registry.rebuild(events, store)?;
        Ok(registry)
    }

    /// A registry that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Replay `events` in id order: register unseen barcodes in that order,
    /// reclassify every event and recompute the aggregates.
    pub fn rebuild(&mut self, mut events: Vec<ScanEvent>, store: &mut MappingStore) -> Result<()> {
        events.sort_by_key(|e| e.id);

        let mut issued = 0usize;
        for event in events.iter_mut() {
            let (version, is_new) = register(store, &event.barcode);
            if is_new {
                issued += 1;
            }
            event.version = version;
        }
        if issued > 0 {
            info!("Assigned {} new versions while rebuilding", issued);
            store.save()?;
        }

        let engine = ClassificationEngine::new(store);
        self.entries = events
            .into_iter()
            .map(|event| ScanEntry {
                classification: engine.classify(&event.barcode),
                event,
            })
            .collect();

        let max_id = self.entries.iter().map(|e| e.event.id).max().unwrap_or(0);
        self.last_id = self.last_id.max(max_id);
        self.recompute_aggregates();
        debug!(
            "Rebuilt {} scans across {} variants",
            self.entries.len(),
            self.aggregates.len()
        );
        Ok(())
    }

    /// The permanent version for `key`, issuing (and persisting) a new one if needed.
    pub fn assign_version(&self, store: &mut MappingStore, key: &str) -> Result<u32> {
        let (version, is_new) = register(store, key);
        if is_new {
            info!("Assigned version v{} to {}", version, key);
            store.save()?;
        }
        Ok(version)
    }

    /// Append a scan of `key` with the given classification and persist the ledger.
    pub fn record(
        &mut self,
        store: &mut MappingStore,
        key: &str,
        classification: ClassificationResult,
    ) -> Result<ScanEntry> {
        let version = self.assign_version(store, key)?;
        self.last_id += 1;

        let entry = ScanEntry {
            event: ScanEvent {
                id: self.last_id,
                timestamp: storage::now_timestamp(),
                barcode: key.to_string(),
                version,
            },
            classification,
        };
        self.entries.push(entry.clone());
        self.recompute_aggregates();
        self.save()?;
        info!("Recorded scan #{} of {} (v{})", entry.event.id, key, version);
        Ok(entry)
    }

    /// Delete the scan with `id`. Returns `false` if there was none.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.event.id != id);
        if self.entries.len() == before {
            debug!("No scan with id {}", id);
            return Ok(false);
        }
        self.recompute_aggregates();
        self.save()?;
        info!("Removed scan #{}", id);
        Ok(true)
    }

    pub fn remove_latest(&mut self) -> Result<bool> {
        match self.latest().map(|e| e.event.id) {
            Some(id) => self.remove(id),
            None => Ok(false),
        }
    }

    /// Drop all scans. Versions stay bound and ids keep counting up.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.aggregates.clear();
        self.save()?;
        info!("Scan history cleared");
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let events: Vec<&ScanEvent> = self.entries.iter().map(|e| &e.event).collect();
        storage::save_ledger(path, &events)
    }

    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.entries.iter().map(|e| e.event.clone()).collect()
    }

    /// The most recent `limit` scans, oldest first.
    pub fn history(&self, limit: usize) -> &[ScanEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    pub fn latest(&self) -> Option<&ScanEntry> {
        self.entries.last()
    }

    pub fn aggregates(&self) -> &BTreeMap<String, VariantAggregate> {
        &self.aggregates
    }

    pub fn aggregate(&self, key: &str) -> Option<&VariantAggregate> {
        self.aggregates.get(key)
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    fn recompute_aggregates(&mut self) {
        self.aggregates.clear();
        for entry in &self.entries {
            let aggregate = self
                .aggregates
                .entry(entry.event.barcode.clone())
                .or_default();
            aggregate.count += 1;
            aggregate.latest = entry.classification.clone();
        }
    }
}

fn register(store: &mut MappingStore, key: &str) -> (u32, bool) {
    if let Some(version) = store.version_of(key) {
        return (version, false);
    }
    let version = store.max_version() + 1;
    store.insert_version(key, version);
    (version, true)
}
