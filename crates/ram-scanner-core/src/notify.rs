use crate::classify::ClassificationResult;
use crate::registry::ScanEntry;

/// Feedback hooks for the operator at the workstation.
///
/// The CLI rings the terminal bell and prints coloured status lines; a GUI
/// would play sounds. All methods default to no-ops.
pub trait ScanNotifier {
    fn on_recorded(&self, _entry: &ScanEntry) {}
    fn on_unknown(&self, _key: &str, _partial: &ClassificationResult) {}
}

/// No-op notifier for silent operation.
pub struct SilentNotifier;

impl ScanNotifier for SilentNotifier {}
