use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_MAPPINGS_PATH: &str = "user_mappings.json";
pub const DEFAULT_RESULTS_PATH: &str = "scan_results.json";
pub const DEFAULT_MAX_VISIBLE_RESULTS: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Mapping rules plus the permanent barcode -> version table.
    pub mappings_path: PathBuf,
    /// Minimal scan ledger (id, timestamp, barcode, version).
    pub results_path: PathBuf,
    /// How many recent scans a front-end shows; everything is still persisted.
    pub max_visible_results: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mappings_path: PathBuf::from(DEFAULT_MAPPINGS_PATH),
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            max_visible_results: DEFAULT_MAX_VISIBLE_RESULTS,
        }
    }
}

/// Load `Config.*` from the working directory (optional), then `RAM_SCANNER_*`
/// environment variables, on top of the built-in defaults.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("mappings_path", DEFAULT_MAPPINGS_PATH)?
        .set_default("results_path", DEFAULT_RESULTS_PATH)?
        .set_default("max_visible_results", DEFAULT_MAX_VISIBLE_RESULTS as u64)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("RAM_SCANNER"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = AppConfig::default();
        assert_eq!(config.mappings_path, PathBuf::from("user_mappings.json"));
        assert_eq!(config.results_path, PathBuf::from("scan_results.json"));
        assert_eq!(config.max_visible_results, 10);
    }

    #[test]
    fn test_load_configuration_falls_back_to_defaults() {
        let config = load_configuration().unwrap();
        assert!(config.max_visible_results > 0);
        assert!(!config.mappings_path.as_os_str().is_empty());
    }
}
