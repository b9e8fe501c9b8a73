pub mod canonical;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod mapping;
pub mod notify;
pub mod registry;
pub mod storage;

pub use canonical::canonicalize;
pub use classify::{ClassificationEngine, ClassificationResult};
pub use config::AppConfig;
pub use engine::{SaveOutcome, ScanEngine, ScanOutcome};
pub use error::{Error, Result};
pub use export::VariantRow;
pub use mapping::{Mapping, MappingDraft, MappingStore};
pub use notify::{ScanNotifier, SilentNotifier};
pub use registry::{ScanEntry, ScanEvent, VariantAggregate, VariantRegistry};
