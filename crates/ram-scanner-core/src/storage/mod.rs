//! On-disk shapes of the two persisted resources and their (tolerant) loaders.
//!
//! Both resources are rewritten whole on every change. A file that is missing,
//! unreadable or of the wrong shape loads as "no prior state".

pub mod json;
pub mod models;

use crate::error::Result;
use crate::mapping::Mapping;
use crate::registry::ScanEvent;
use chrono::{SecondsFormat, Utc};
use models::{MappingDocument, RawScanRecord};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Decode the mapping file entry by entry. A mapping that cannot be read is
/// skipped on its own, and so is a version that is not a positive integer, so
/// one bad record never costs the rest of the document.
pub fn load_mapping_document(path: &Path) -> MappingDocument {
    let Some(value) = json::read_value(path) else {
        return MappingDocument::default();
    };
    let (items, versions) = match value {
        Value::Array(items) => {
            debug!("{} uses the legacy mapping list layout", path.display());
            (items, Map::new())
        }
        Value::Object(mut object) => {
            let items = match object.remove("mappings") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    warn!("Ignoring 'mappings' in {}: not a list", path.display());
                    Vec::new()
                }
                None => Vec::new(),
            };
            let versions = match object.remove("versions") {
                Some(Value::Object(versions)) => versions,
                Some(_) => {
                    warn!("Ignoring 'versions' in {}: not an object", path.display());
                    Map::new()
                }
                None => Map::new(),
            };
            (items, versions)
        }
        _ => {
            warn!("Ignoring malformed mapping file {}", path.display());
            return MappingDocument::default();
        }
    };

    MappingDocument {
        mappings: decode_mappings(items),
        versions: decode_versions(versions),
    }
}

fn decode_mappings(items: Vec<Value>) -> Vec<Mapping> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Mapping>(item) {
            Ok(mapping) => Some(mapping),
            Err(e) => {
                warn!("Skipping unreadable mapping: {}", e);
                None
            }
        })
        .collect()
}

fn decode_versions(versions: Map<String, Value>) -> BTreeMap<String, u32> {
    versions
        .into_iter()
        .filter_map(|(key, value)| {
            let version = value
                .as_u64()
                .filter(|v| *v >= 1)
                .and_then(|v| u32::try_from(v).ok());
            if version.is_none() {
                warn!("Skipping version entry '{}': {} is not a version", key, value);
            }
            version.map(|v| (key, v))
        })
        .collect()
}

pub fn save_mapping_document(
    path: &Path,
    mappings: &[Mapping],
    versions: &BTreeMap<String, u32>,
) -> Result<()> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        mappings: &'a [Mapping],
        versions: &'a BTreeMap<String, u32>,
    }
    json::write_atomic(path, &Borrowed { mappings, versions })
}

/// Decode the scan ledger record by record, skipping entries that cannot be used.
pub fn load_ledger(path: &Path) -> Vec<ScanEvent> {
    let Some(value) = json::read_value(path) else {
        return Vec::new();
    };
    let Value::Array(items) = value else {
        warn!("Ignoring scan ledger {}: not a list", path.display());
        return Vec::new();
    };

    let mut events: Vec<ScanEvent> = Vec::with_capacity(items.len());
    for item in items {
        let raw = match serde_json::from_value::<RawScanRecord>(item) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Skipping unreadable ledger record: {}", e);
                continue;
            }
        };
        let barcode = raw.barcode.unwrap_or_default().trim().to_string();
        if barcode.is_empty() {
            continue;
        }
        events.push(ScanEvent {
            id: raw.id.unwrap_or(events.len() as u64 + 1),
            timestamp: raw.timestamp.unwrap_or_else(now_timestamp),
            barcode,
            version: raw.version.unwrap_or(0),
        });
    }
    reseed_repeated_ids(&mut events);
    events
}

/// A hand-edited ledger can repeat an id. The first record keeps it and every
/// repeat gets a fresh id past the current maximum.
fn reseed_repeated_ids(events: &mut [ScanEvent]) {
    let mut next = events.iter().map(|e| e.id).max().unwrap_or(0);
    let mut seen = HashSet::with_capacity(events.len());
    for event in events.iter_mut() {
        if seen.insert(event.id) {
            continue;
        }
        next += 1;
        debug!(
            "Ledger id {} repeats, scan of {} becomes #{}",
            event.id, event.barcode, next
        );
        event.id = next;
        seen.insert(next);
    }
}

pub fn save_ledger(path: &Path, events: &[&ScanEvent]) -> Result<()> {
    json::write_atomic(path, &events)
}

/// Current UTC time as ISO-8601 with second precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}
