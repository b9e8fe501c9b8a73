use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "ram-scanner")]
#[command(about = "Identify and count RAM modules from scanned barcodes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify and record barcodes (reads one per line from stdin when none are given)
    Scan { codes: Vec<String> },
    /// Save a mapping for a barcode (or a regex with --regex)
    AddMapping(MappingArgs),
    /// List saved mappings with their indices
    Mappings,
    /// Delete the mapping at INDEX
    RemoveMapping { index: usize },
    /// Show recent scans
    History {
        /// Number of scans to show (defaults to max_visible_results)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show per-variant counts ordered by version
    Variants,
    /// Delete the scan with ID
    RemoveScan { id: u64 },
    /// Delete the most recent scan
    RemoveLatest,
    /// Clear all scans (mappings and versions are kept)
    Clear,
    /// Export variants to a CSV file
    Export { path: std::path::PathBuf },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, clap::Args)]
pub struct MappingArgs {
    /// Barcode as scanned, or a regex when --regex is set
    pub code: String,
    #[arg(long)]
    pub size: Option<u32>,
    /// Module class, e.g. PC3-12800E
    #[arg(long)]
    pub class: Option<String>,
    #[arg(long)]
    pub mfr: Option<String>,
    #[arg(long, value_enum)]
    pub ecc: Option<YesNo>,
    /// DDR type when no module class is known, e.g. DDR4
    #[arg(long)]
    pub ddr: Option<String>,
    /// Speed in MT/s when no module class is known
    #[arg(long)]
    pub speed: Option<u32>,
    /// Free-form kind (Registered, Unbuffered, ...)
    #[arg(long)]
    pub kind: Option<String>,
    #[arg(long)]
    pub regex: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        matches!(value, YesNo::Yes)
    }
}
