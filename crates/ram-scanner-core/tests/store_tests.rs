use ram_scanner_core::{Mapping, MappingStore, ScanEngine};
use std::fs;
use tempfile::tempdir;

fn samsung_mapping() -> Mapping {
    Mapping {
        pattern: "M391B2873FH0".to_string(),
        size_gb: Some(8),
        speed_mts: Some(1600),
        mem_type: Some("DDR3".to_string()),
        manufacturer: Some("Samsung".to_string()),
        module_class: Some("PC3-12800".to_string()),
        ecc: Some(true),
        is_regex: false,
    }
}

#[test]
fn test_missing_file_loads_empty() {
    let dir = tempdir().unwrap();
    let store = MappingStore::load(dir.path().join("nope.json"));
    assert!(store.mappings().is_empty());
    assert!(store.versions().is_empty());
}

#[test]
fn test_malformed_file_loads_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_mappings.json");

    fs::write(&path, "{ not json").unwrap();
    assert!(MappingStore::load(&path).mappings().is_empty());

    fs::write(&path, "\"just a string\"").unwrap();
    assert!(MappingStore::load(&path).mappings().is_empty());

    fs::write(&path, r#"{"mappings": 42}"#).unwrap();
    let store = MappingStore::load(&path);
    assert!(store.mappings().is_empty());
    assert!(store.versions().is_empty());
}

#[test]
fn test_legacy_list_layout_loads_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_mappings.json");
    fs::write(
        &path,
        r#"[
            {"pattern": "ABC123", "size_gb": 4, "speed_mts": 1333, "mem_type": "DDR3", "manufacturer": "Micron"},
            {"pattern": "^HMA", "size_gb": null, "speed_mts": null, "mem_type": null, "manufacturer": "SK Hynix", "regex": true}
        ]"#,
    )
    .unwrap();

    let store = MappingStore::load(&path);
    assert_eq!(store.mappings().len(), 2);
    assert!(store.versions().is_empty());

    let first = &store.mappings()[0];
    assert_eq!(first.size_gb, Some(4));
    assert_eq!(first.module_class, None);
    assert_eq!(first.ecc, None);
    assert!(!first.is_regex);
    assert!(store.mappings()[1].is_regex);
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_mappings.json");

    let mut store = MappingStore::load(&path);
    let index = store.add(samsung_mapping()).unwrap();
    assert_eq!(index, 0);

    let reloaded = MappingStore::load(&path);
    assert_eq!(reloaded.mappings(), &[samsung_mapping()]);

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["mappings"][0]["regex"], serde_json::Value::Bool(false));
    assert_eq!(raw["mappings"][0]["size_gb"], serde_json::json!(8));
    assert!(raw["versions"].is_object());
}

#[test]
fn test_versions_are_loaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_mappings.json");
    fs::write(&path, r#"{"mappings": [], "versions": {"A": 1, "B": 7}}"#).unwrap();

    let store = MappingStore::load(&path);
    assert_eq!(store.version_of("A"), Some(1));
    assert_eq!(store.version_of("B"), Some(7));
    assert_eq!(store.version_of("C"), None);
    assert_eq!(store.max_version(), 7);
}

#[test]
fn test_exact_match_wins_over_earlier_regex() {
    let mut store = MappingStore::in_memory();
    let mut regex = Mapping::regex("FH0$");
    regex.size_gb = Some(2);
    store.add(regex).unwrap();
    store.add(samsung_mapping()).unwrap();

    let found = store.find("M391B2873FH0").unwrap();
    assert!(!found.is_regex);
    assert_eq!(found.size_gb, Some(8));
}

#[test]
fn test_first_match_in_list_order() {
    let mut store = MappingStore::in_memory();
    let mut first = Mapping::regex("^M3");
    first.size_gb = Some(1);
    let mut second = Mapping::regex("^M391");
    second.size_gb = Some(2);
    store.add(first).unwrap();
    store.add(second).unwrap();

    assert_eq!(store.find("M391B2873FH0").unwrap().size_gb, Some(1));

    let mut dup_a = Mapping::exact("DUP");
    dup_a.size_gb = Some(3);
    let mut dup_b = Mapping::exact("DUP");
    dup_b.size_gb = Some(4);
    store.add(dup_a).unwrap();
    store.add(dup_b).unwrap();
    assert_eq!(store.find("DUP").unwrap().size_gb, Some(3));
}

#[test]
fn test_invalid_regex_never_matches() {
    let mut store = MappingStore::in_memory();
    store.add(Mapping::regex("([unclosed")).unwrap();
    let mut fallback = Mapping::regex(".*");
    fallback.size_gb = Some(16);
    store.add(fallback).unwrap();

    assert!(!Mapping::regex("([unclosed").matches("([unclosed"));
    assert_eq!(store.find("anything").unwrap().size_gb, Some(16));
}

#[test]
fn test_exact_match_is_case_sensitive_and_whole() {
    let mut store = MappingStore::in_memory();
    store.add(samsung_mapping()).unwrap();
    assert!(store.find("m391b2873fh0").is_none());
    assert!(store.find("M391B2873FH").is_none());
}

#[test]
fn test_remove_at_and_out_of_range() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_mappings.json");
    let mut store = MappingStore::load(&path);
    store.add(Mapping::exact("A")).unwrap();
    store.add(Mapping::exact("B")).unwrap();

    assert!(!store.remove_at(5).unwrap());
    assert_eq!(store.mappings().len(), 2);

    assert!(store.remove_at(0).unwrap());
    assert_eq!(store.mappings().len(), 1);
    assert_eq!(store.mappings()[0].pattern, "B");

    let reloaded = MappingStore::load(&path);
    assert_eq!(reloaded.mappings().len(), 1);
    assert_eq!(reloaded.mappings()[0].pattern, "B");
}

#[test]
fn test_descriptions() {
    let mut store = MappingStore::in_memory();
    store.add(samsung_mapping()).unwrap();
    store.add(Mapping::regex("^HMA")).unwrap();

    let descriptions = store.descriptions();
    assert_eq!(
        descriptions[0],
        "Pattern: M391B2873FH0 | Size: 8 GB | Speed: 1600 MT/s | Type: DDR3 | Class: PC3-12800 | ECC: Yes | Mfr: Samsung"
    );
    assert_eq!(
        descriptions[1],
        "Pattern: /^HMA/ | Size: ? GB | Speed: ? MT/s | Type: ? | Class: ? | ECC: ? | Mfr: ?"
    );
}

#[test]
fn test_unreadable_mapping_is_skipped_and_versions_survive() {
    let dir = tempdir().unwrap();
    let mappings_path = dir.path().join("user_mappings.json");
    let results_path = dir.path().join("scan_results.json");
    fs::write(
        &mappings_path,
        r#"{
            "mappings": [
                {"pattern": "GOOD", "size_gb": 8, "speed_mts": 1600, "mem_type": "DDR3", "manufacturer": "Samsung"},
                {"pattern": "ODD", "size_gb": -8, "manufacturer": "Kingston"}
            ],
            "versions": {"GOOD": 1, "B": 2, "ZERO": 0, "TEXT": "3"}
        }"#,
    )
    .unwrap();
    fs::write(&results_path, r#"[{"id": 1, "barcode": "B", "version": 2}]"#).unwrap();

    let engine = ScanEngine::open_paths(&mappings_path, &results_path).unwrap();

    let store = engine.store();
    assert_eq!(store.mappings().len(), 1);
    assert_eq!(store.mappings()[0].pattern, "GOOD");
    assert_eq!(store.versions().len(), 2);
    assert_eq!(store.version_of("GOOD"), Some(1));
    assert_eq!(store.version_of("B"), Some(2));
    assert_eq!(engine.registry().entries()[0].event.version, 2);

    // No version was issued, so the file keeps the record it could not read.
    let on_disk = fs::read_to_string(&mappings_path).unwrap();
    assert!(on_disk.contains("ODD"));
}

#[test]
fn test_regex_lookup_follows_add_and_remove() {
    let mut store = MappingStore::in_memory();
    let mut starts_a = Mapping::regex("^A");
    starts_a.size_gb = Some(1);
    let mut ends_b = Mapping::regex("B$");
    ends_b.size_gb = Some(2);
    store.add(starts_a).unwrap();
    store.add(Mapping::regex("([unclosed")).unwrap();
    store.add(ends_b).unwrap();

    assert_eq!(store.find("AB").unwrap().size_gb, Some(1));
    assert_eq!(store.find("XB").unwrap().size_gb, Some(2));
    assert!(store.find("([unclosed").is_none());

    assert!(store.remove_at(0).unwrap());
    assert_eq!(store.find("AB").unwrap().size_gb, Some(2));
    assert!(store.find("AX").is_none());

    assert!(store.remove_at(0).unwrap());
    assert_eq!(store.find("XB").unwrap().size_gb, Some(2));
}
