use colored::*;
use ram_scanner_core::mapping::DraftField;
use ram_scanner_core::{ClassificationResult, MappingDraft, ScanEntry, ScanNotifier};
use std::io::{self, Write};

/// Terminal feedback: a green line on success, a red line plus the bell on
/// an unknown module.
pub struct CliNotifier;

impl ScanNotifier for CliNotifier {
    fn on_recorded(&self, entry: &ScanEntry) {
        let c = &entry.classification;
        println!(
            "  {} {} {} {} {} ECC:{} {} {}",
            "✓".green(),
            format!("v{}", entry.event.version).bold(),
            c.spec_summary().cyan(),
            c.module_class().unwrap_or("-").yellow(),
            c.manufacturer().unwrap_or("-").magenta(),
            c.ecc_label(),
            entry.event.barcode.dimmed(),
            format!("#{}", entry.event.id).dimmed(),
        );
    }

    fn on_unknown(&self, key: &str, partial: &ClassificationResult) {
        print!("\x07");
        let _ = io::stdout().flush();
        let hint = match MappingDraft::prefill(key, partial).first_missing() {
            Some(DraftField::Size) => "--size",
            Some(DraftField::ModuleClass) => "--class (or --ddr/--speed)",
            Some(DraftField::Manufacturer) => "--mfr",
            None => "--ddr/--speed",
        };
        println!(
            "  {} unknown module {} (found: {}); add it with `ram-scanner add-mapping {} {}`",
            "✗".red(),
            key.bold(),
            describe_partial(partial),
            key,
            hint,
        );
    }
}

fn describe_partial(partial: &ClassificationResult) -> String {
    let mut parts = vec![partial.spec_summary()];
    if let Some(class_str) = partial.module_class() {
        parts.push(class_str.to_string());
    }
    if let Some(mfr) = partial.manufacturer() {
        parts.push(mfr.to_string());
    }
    let joined = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "nothing".to_string()
    } else {
        joined
    }
}
