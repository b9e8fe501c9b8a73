use crate::classify::{ecc_label, ClassificationResult};
use crate::error::Result;
use crate::mapping::MappingStore;
use crate::registry::VariantRegistry;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const EXPORT_HEADERS: [&str; 7] = [
    "Version",
    "Spec",
    "Class",
    "ECC",
    "Manufacturer",
    "Count",
    "Barcode",
];

/// One exported line per versioned barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRow {
    pub version: u32,
    pub spec: String,
    pub module_class: String,
    pub ecc: String,
    pub manufacturer: String,
    pub count: usize,
    pub barcode: String,
}

impl VariantRow {
    pub fn version_label(&self) -> String {
        format!("v{}", self.version)
    }
}

/// Every barcode in the version table, sorted by version. Barcodes whose scans
/// were all removed are still listed, with a zero count and no spec.
pub fn variant_rows(store: &MappingStore, registry: &VariantRegistry) -> Vec<VariantRow> {
    let unknown = ClassificationResult::default();
    let mut rows: Vec<VariantRow> = store
        .versions()
        .iter()
        .map(|(barcode, version)| {
            let aggregate = registry.aggregate(barcode);
            let latest = aggregate.map(|a| &a.latest).unwrap_or(&unknown);
            VariantRow {
                version: *version,
                spec: latest.spec_summary(),
                module_class: latest.module_class().unwrap_or_default().to_string(),
                ecc: ecc_label(latest.ecc).to_string(),
                manufacturer: latest.manufacturer().unwrap_or_default().to_string(),
                count: aggregate.map(|a| a.count).unwrap_or(0),
                barcode: barcode.clone(),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.barcode.cmp(&b.barcode)));
    rows
}

pub fn write_csv<W: Write>(rows: &[VariantRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;
    for row in rows {
        wtr.write_record([
            row.version_label(),
            row.spec.clone(),
            row.module_class.clone(),
            row.ecc.clone(),
            row.manufacturer.clone(),
            row.count.to_string(),
            row.barcode.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(rows: &[VariantRow], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(rows, file)?;
    info!("Exported {} variants to {}", rows.len(), path.display());
    Ok(())
}
