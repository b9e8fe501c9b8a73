//! Best-effort field extraction for barcodes without a stored mapping.
//!
//! Every field is extracted independently from the lower-cased key; within a
//! field the first matching rule wins.

use super::module_class;
use super::ClassificationResult;
use regex::Regex;

lazy_static::lazy_static! {
    static ref SIZE_PATTERNS: Vec<Regex> = compile(&[
        r"\b(\d+)\s*gb\b",
        r"\b(\d+)\s*g\b",
        r"\b(\d+)\s*x?\s*\d+gb\b",
    ]);

    static ref SPEED_PATTERNS: Vec<Regex> = compile(&[
        r"\b(\d{3,5})\s*mt/?s\b",
        r"\b(\d{3,5})\s*mhz\b",
    ]);

    static ref TYPE_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (r"ddr\s*5", "DDR5"),
        (r"ddr\s*4", "DDR4"),
        (r"ddr\s*3", "DDR3"),
        (r"ddr\s*2", "DDR2"),
        (r"pc5", "DDR5"),
        (r"pc4", "DDR4"),
        (r"pc3", "DDR3"),
        (r"pc2", "DDR2"),
    ]
    .into_iter()
    .map(|(pattern, name)| (Regex::new(pattern).expect("type pattern is valid"), name))
    .collect();
}

/// Substring hint -> canonical manufacturer name. Order matters.
pub const MANUFACTURER_HINTS: [(&str, &str); 15] = [
    ("samsung", "Samsung"),
    ("hynix", "SK Hynix"),
    ("skhynix", "SK Hynix"),
    ("micron", "Micron"),
    ("crucial", "Crucial"),
    ("kingston", "Kingston"),
    ("gskill", "G.SKILL"),
    ("g.skill", "G.SKILL"),
    ("adata", "ADATA"),
    ("corsair", "Corsair"),
    ("patriot", "Patriot"),
    ("teamgroup", "TeamGroup"),
    ("lexar", "Lexar"),
    ("ramaxel", "Ramaxel"),
    ("nanya", "Nanya"),
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("heuristic pattern is valid"))
        .collect()
}

pub fn classify(canonical_key: &str) -> ClassificationResult {
    let lower = canonical_key.to_lowercase();

    let mut result = ClassificationResult {
        size_gb: first_number(&SIZE_PATTERNS, &lower),
        speed_mts: first_number(&SPEED_PATTERNS, &lower),
        mem_type: detect_type(&lower),
        manufacturer: detect_manufacturer(&lower),
        ..Default::default()
    };

    if let Some(class_str) = module_class::extract(&lower) {
        result.backfill(&module_class::decode(&class_str));
        result.module_class = Some(class_str);
    }

    result
}

/// The number captured by the first pattern that matches. Later patterns are
/// not consulted even when that number does not fit.
fn first_number(patterns: &[Regex], text: &str) -> Option<u32> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
}

fn detect_type(text: &str) -> Option<String> {
    TYPE_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, name)| name.to_string())
}

pub fn detect_manufacturer(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    MANUFACTURER_HINTS
        .iter()
        .find(|(hint, _)| lower.contains(hint))
        .map(|(_, name)| name.to_string())
}
