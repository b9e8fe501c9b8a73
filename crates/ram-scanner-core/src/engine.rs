use crate::canonical::canonicalize;
use crate::classify::{ClassificationEngine, ClassificationResult};
use crate::config::AppConfig;
use crate::error::Result;
use crate::export::{self, VariantRow};
use crate::mapping::{Mapping, MappingDraft, MappingStore};
use crate::notify::{ScanNotifier, SilentNotifier};
use crate::registry::{ScanEntry, VariantRegistry};
use std::path::Path;
use tracing::{debug, info};

/// Everything a workstation front-end needs: scanning, mapping edits,
/// history and export over one mapping store and one scan ledger.
pub struct ScanEngine {
    store: MappingStore,
    registry: VariantRegistry,
    notifier: Box<dyn ScanNotifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Nothing left after canonicalization.
    Empty,
    /// Fully classified and appended to the ledger.
    Recorded(ScanEntry),
    /// Not enough is known; `draft` is the pre-filled mapping form.
    Unknown {
        key: String,
        partial: ClassificationResult,
        draft: MappingDraft,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub index: usize,
    pub mapping: Mapping,
    /// Version bound to the pattern; regex mappings get none.
    pub version: Option<u32>,
    /// Scan recorded because the new mapping made the barcode classifiable.
    pub recorded: Option<ScanEntry>,
}

impl ScanEngine {
    pub fn open(config: &AppConfig) -> Result<Self> {
        Self::open_paths(&config.mappings_path, &config.results_path)
    }

    pub fn open_paths(mappings_path: &Path, results_path: &Path) -> Result<Self> {
        let mut store = MappingStore::load(mappings_path);
        let registry = VariantRegistry::load(results_path, &mut store)?;
        info!(
            "Loaded {} mappings, {} versions, {} scans",
            store.mappings().len(),
            store.versions().len(),
            registry.entries().len()
        );
        Ok(Self {
            store,
            registry,
            notifier: Box::new(SilentNotifier),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: MappingStore::in_memory(),
            registry: VariantRegistry::in_memory(),
            notifier: Box::new(SilentNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn ScanNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    pub fn classify(&self, canonical_key: &str) -> ClassificationResult {
        ClassificationEngine::new(&self.store).classify(canonical_key)
    }

    /// Handle one scanner payload.
    pub fn scan(&mut self, raw: &str) -> Result<ScanOutcome> {
        let key = canonicalize(raw);
        if key.is_empty() {
            return Ok(ScanOutcome::Empty);
        }
        debug!("Scanned '{}' -> '{}'", raw.trim(), key);

        let classification = self.classify(&key);
        if !classification.is_complete() {
            self.notifier.on_unknown(&key, &classification);
            let draft = MappingDraft::prefill(&key, &classification);
            return Ok(ScanOutcome::Unknown {
                key,
                partial: classification,
                draft,
            });
        }

        let entry = self.registry.record(&mut self.store, &key, classification)?;
        self.notifier.on_recorded(&entry);
        Ok(ScanOutcome::Recorded(entry))
    }

    /// Store a mapping from an operator draft. Exact mappings also get their
    /// version bound right away and are scanned once if now classifiable.
    pub fn save_mapping(&mut self, draft: &MappingDraft) -> Result<Option<SaveOutcome>> {
        let Some(mapping) = draft.to_mapping() else {
            debug!("Mapping draft has no pattern, ignoring");
            return Ok(None);
        };
        let index = self.store.add(mapping.clone())?;

        if mapping.is_regex {
            return Ok(Some(SaveOutcome {
                index,
                mapping,
                version: None,
                recorded: None,
            }));
        }

        let key = mapping.pattern.clone();
        let version = self.registry.assign_version(&mut self.store, &key)?;

        let classification = self.classify(&key);
        let recorded = if classification.is_complete() {
            let entry = self.registry.record(&mut self.store, &key, classification)?;
            self.notifier.on_recorded(&entry);
            Some(entry)
        } else {
            None
        };

        Ok(Some(SaveOutcome {
            index,
            mapping,
            version: Some(version),
            recorded,
        }))
    }

    pub fn remove_mapping(&mut self, index: usize) -> Result<bool> {
        self.store.remove_at(index)
    }

    pub fn remove_scan(&mut self, id: u64) -> Result<bool> {
        self.registry.remove(id)
    }

    pub fn remove_latest(&mut self) -> Result<bool> {
        self.registry.remove_latest()
    }

    /// Clear the scan history. Mappings and versions are kept.
    pub fn clear_history(&mut self) -> Result<()> {
        self.registry.clear()
    }

    /// Re-read the ledger with the current mappings applied.
    pub fn reclassify(&mut self) -> Result<()> {
        let events = self.registry.events();
        self.registry.rebuild(events, &mut self.store)
    }

    pub fn history(&self, limit: usize) -> &[ScanEntry] {
        self.registry.history(limit)
    }

    pub fn latest(&self) -> Option<&ScanEntry> {
        self.registry.latest()
    }

    pub fn variant_rows(&self) -> Vec<VariantRow> {
        export::variant_rows(&self.store, &self.registry)
    }

    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        let rows = self.variant_rows();
        export::export_csv(&rows, path)?;
        Ok(rows.len())
    }
}
