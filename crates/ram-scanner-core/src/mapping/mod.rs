mod draft;

pub use draft::{DraftField, MappingDraft};

use crate::classify::ecc_label;
use crate::error::Result;
use crate::storage::{self, models::MappingDocument};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A user rule binding a barcode (or a regex over barcodes) to a partial spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub pattern: String,
    #[serde(default)]
    pub size_gb: Option<u32>,
    #[serde(default)]
    pub speed_mts: Option<u32>,
    #[serde(default)]
    pub mem_type: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub module_class: Option<String>,
    #[serde(default)]
    pub ecc: Option<bool>,
    #[serde(default, rename = "regex")]
    pub is_regex: bool,
}

impl Mapping {
    pub fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex: true,
            ..Default::default()
        }
    }

    /// Exact comparison, or an unanchored regex search. A pattern that does not
    /// compile never matches.
    pub fn matches(&self, code: &str) -> bool {
        if !self.is_regex {
            return self.pattern == code;
        }
        self.compile().is_some_and(|re| re.is_match(code))
    }

    fn compile(&self) -> Option<Regex> {
        if !self.is_regex {
            return None;
        }
        match Regex::new(&self.pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!("Ignoring invalid mapping regex '{}': {}", self.pattern, e);
                None
            }
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_unknown<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
        }

        let pattern = if self.is_regex {
            format!("/{}/", self.pattern)
        } else {
            self.pattern.clone()
        };
        write!(
            f,
            "Pattern: {} | Size: {} GB | Speed: {} MT/s | Type: {} | Class: {} | ECC: {} | Mfr: {}",
            pattern,
            or_unknown(self.size_gb),
            or_unknown(self.speed_mts),
            or_unknown(self.mem_type.as_deref()),
            or_unknown(self.module_class.as_deref()),
            ecc_label(self.ecc),
            or_unknown(self.manufacturer.as_deref()),
        )
    }
}

/// User mappings plus the permanent barcode -> version table, persisted
/// together as one JSON document.
#[derive(Debug, Default)]
pub struct MappingStore {
    path: Option<PathBuf>,
    mappings: Vec<Mapping>,
    /// Compiled form of each regex mapping, index-aligned with `mappings`.
    compiled: Vec<Option<Regex>>,
    versions: BTreeMap<String, u32>,
}

impl MappingStore {
    /// Load from `path`. A missing or unreadable file starts an empty store.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let MappingDocument { mappings, versions } = storage::load_mapping_document(&path);
        debug!(
            "Loaded {} mappings and {} versions from {}",
            mappings.len(),
            versions.len(),
            path.display()
        );
        let compiled = mappings.iter().map(Mapping::compile).collect();
        Self {
            path: Some(path),
            mappings,
            compiled,
            versions,
        }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        storage::save_mapping_document(path, &self.mappings, &self.versions)
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Exact patterns first, then regex patterns, each pass in list order.
    pub fn find(&self, code: &str) -> Option<&Mapping> {
        self.mappings
            .iter()
            .filter(|m| !m.is_regex)
            .find(|m| m.pattern == code)
            .or_else(|| {
                self.mappings
                    .iter()
                    .zip(&self.compiled)
                    .find(|(_, re)| matches!(re, Some(re) if re.is_match(code)))
                    .map(|(m, _)| m)
            })
    }

    /// Append and persist. Returns the index of the new mapping.
    pub fn add(&mut self, mapping: Mapping) -> Result<usize> {
        info!("Adding mapping: {}", mapping);
        self.compiled.push(mapping.compile());
        self.mappings.push(mapping);
        self.save()?;
        Ok(self.mappings.len() - 1)
    }

    /// Delete and persist. An out-of-range index is ignored and returns `false`.
    pub fn remove_at(&mut self, index: usize) -> Result<bool> {
        if index >= self.mappings.len() {
            debug!("Mapping index {} out of range, nothing removed", index);
            return Ok(false);
        }
        self.compiled.remove(index);
        let removed = self.mappings.remove(index);
        info!("Removed mapping: {}", removed);
        self.save()?;
        Ok(true)
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.mappings.iter().map(|m| m.to_string()).collect()
    }

    pub fn versions(&self) -> &BTreeMap<String, u32> {
        &self.versions
    }

    pub fn version_of(&self, key: &str) -> Option<u32> {
        self.versions.get(key).copied()
    }

    pub fn max_version(&self) -> u32 {
        self.versions.values().copied().max().unwrap_or(0)
    }

    /// Bind a key that has no version yet. Callers go through the registry,
    /// which decides the number and persists.
    pub(crate) fn insert_version(&mut self, key: &str, version: u32) {
        self.versions.entry(key.to_string()).or_insert(version);
    }
}
