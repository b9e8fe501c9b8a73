pub mod heuristic;
pub mod module_class;

use crate::mapping::MappingStore;
use module_class::DecodedClass;
use tracing::debug;

/// What is known about a module after classification. Recomputed on every
/// call and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    pub size_gb: Option<u32>,
    pub speed_mts: Option<u32>,
    pub mem_type: Option<String>,
    pub manufacturer: Option<String>,
    pub module_class: Option<String>,
    pub ecc: Option<bool>,
}

impl ClassificationResult {
    /// Size, speed, type and manufacturer are all known. Class and ECC are optional.
    pub fn is_complete(&self) -> bool {
        self.size().is_some()
            && self.speed().is_some()
            && self.mem_type().is_some()
            && self.manufacturer().is_some()
    }

    pub fn size(&self) -> Option<u32> {
        self.size_gb.filter(|v| *v > 0)
    }

    pub fn speed(&self) -> Option<u32> {
        self.speed_mts.filter(|v| *v > 0)
    }

    pub fn mem_type(&self) -> Option<&str> {
        non_empty(self.mem_type.as_deref())
    }

    pub fn manufacturer(&self) -> Option<&str> {
        non_empty(self.manufacturer.as_deref())
    }

    pub fn module_class(&self) -> Option<&str> {
        non_empty(self.module_class.as_deref())
    }

    /// Fill type, speed and ECC from a decoded module class where still unknown.
    pub(crate) fn backfill(&mut self, decoded: &DecodedClass) {
        if self.mem_type().is_none() && decoded.mem_type.is_some() {
            self.mem_type = decoded.mem_type.clone();
        }
        if self.speed().is_none() && decoded.speed_mts.is_some() {
            self.speed_mts = decoded.speed_mts;
        }
        if self.ecc.is_none() && decoded.ecc_hint.is_some() {
            self.ecc = decoded.ecc_hint;
        }
    }

    /// `"8 GB 1600 MT/s DDR3"`, skipping unknown parts.
    pub fn spec_summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(size) = self.size_gb {
            parts.push(format!("{} GB", size));
        }
        if let Some(speed) = self.speed_mts {
            parts.push(format!("{} MT/s", speed));
        }
        if let Some(mem_type) = self.mem_type() {
            parts.push(mem_type.to_string());
        }
        parts.join(" ")
    }

    pub fn ecc_label(&self) -> &'static str {
        ecc_label(self.ecc)
    }
}

pub fn ecc_label(ecc: Option<bool>) -> &'static str {
    match ecc {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "?",
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Stored mappings first, heuristics second.
pub struct ClassificationEngine<'a> {
    store: &'a MappingStore,
}

impl<'a> ClassificationEngine<'a> {
    pub fn new(store: &'a MappingStore) -> Self {
        Self { store }
    }

    pub fn classify(&self, canonical_key: &str) -> ClassificationResult {
        let key = canonical_key.trim();

        let Some(mapping) = self.store.find(key) else {
            debug!("No mapping for '{}', using heuristics", key);
            return heuristic::classify(key);
        };

        debug!("Mapping '{}' matched '{}'", mapping.pattern, key);
        let mut result = ClassificationResult {
            size_gb: mapping.size_gb,
            speed_mts: mapping.speed_mts,
            mem_type: mapping.mem_type.clone(),
            manufacturer: mapping.manufacturer.clone(),
            module_class: mapping.module_class.clone(),
            ecc: mapping.ecc,
        };

        if let Some(class_str) = result.module_class().map(str::to_string) {
            if result.mem_type().is_none() || result.speed().is_none() || result.ecc.is_none() {
                result.backfill(&module_class::decode(&class_str));
            }
        }

        result
    }
}
