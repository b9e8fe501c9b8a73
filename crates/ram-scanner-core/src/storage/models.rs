use crate::mapping::Mapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{"mappings": [...], "versions": {"<barcode>": <version>}}`. Older files
/// are a bare list of mappings.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MappingDocument {
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default)]
    pub versions: BTreeMap<String, u32>,
}

/// One ledger entry as found on disk, before defaults are applied.
#[derive(Debug, Deserialize)]
pub struct RawScanRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
}
