//! Conversion between `PCx-NNNNN[suffix]` module class designators and a
//! DDR generation / transfer rate pair.

use regex::Regex;

lazy_static::lazy_static! {
    /// `PC<gen>[L][- ]<rating><suffix>`, e.g. `PC3L-12800R`, `pc4 19200`, `PC2-6400E`.
    pub static ref MODULE_CLASS_RE: Regex = Regex::new(
        r"(?i)pc(?P<gen>\d+)(?P<lv>l)?[- ]?(?P<rating>\d{3,6})(?P<suffix>[a-z]*)"
    )
    .expect("module class pattern is valid");
}

/// Bandwidth rating (MB/s) printed on the label -> transfer rate (MT/s).
pub const BANDWIDTH_TO_SPEED: [(u32, u32); 20] = [
    (6400, 800),
    (8500, 1066),
    (8533, 1066),
    (10600, 1333),
    (10660, 1333),
    (10700, 1333),
    (12800, 1600),
    (14900, 1866),
    (15000, 1866),
    (16000, 2000),
    (17000, 2133),
    (17900, 2250),
    (19200, 2400),
    (21300, 2666),
    (22400, 2800),
    (23000, 2888),
    (24000, 3000),
    (25600, 3200),
    (28800, 3600),
    (32000, 4000),
];

/// Ratings below this are taken to be the transfer rate itself (`PC3-1600`).
const RATING_IS_SPEED_BELOW: u32 = 4000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedClass {
    pub mem_type: Option<String>,
    pub speed_mts: Option<u32>,
    /// Only ever `Some(true)`: a missing `E`/`Q` suffix says nothing about ECC.
    pub ecc_hint: Option<bool>,
}

pub fn speed_for_bandwidth(rating: u32) -> Option<u32> {
    BANDWIDTH_TO_SPEED
        .iter()
        .find(|(bandwidth, _)| *bandwidth == rating)
        .map(|(_, speed)| *speed)
}

/// First (lowest) table bandwidth for a speed: 1066 -> 8500, 1333 -> 10600.
pub fn bandwidth_for_speed(speed_mts: u32) -> Option<u32> {
    BANDWIDTH_TO_SPEED
        .iter()
        .find(|(_, speed)| *speed == speed_mts)
        .map(|(bandwidth, _)| *bandwidth)
}

/// Decode a module class string. Unknown generations leave `mem_type` empty,
/// text without a `PCx` designator decodes to nothing at all.
pub fn decode(class_str: &str) -> DecodedClass {
    let upper = class_str.trim().to_uppercase();
    let Some(caps) = MODULE_CLASS_RE.captures(&upper) else {
        return DecodedClass::default();
    };

    let mem_type = match &caps["gen"] {
        "2" => Some("DDR2"),
        "3" => Some("DDR3"),
        "4" => Some("DDR4"),
        "5" => Some("DDR5"),
        _ => None,
    }
    .map(str::to_string);

    let speed_mts = caps["rating"].parse::<u32>().ok().map(rating_to_speed);

    let suffix = caps
        .name("suffix")
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_default();
    let ecc_hint = (suffix.contains('E') || suffix.contains('Q')).then_some(true);

    DecodedClass {
        mem_type,
        speed_mts,
        ecc_hint,
    }
}

fn rating_to_speed(rating: u32) -> u32 {
    if let Some(speed) = speed_for_bandwidth(rating) {
        return speed;
    }
    if rating < RATING_IS_SPEED_BELOW {
        return rating;
    }
    div_round_half_even(rating, 8).max(1)
}

fn div_round_half_even(numerator: u32, denominator: u32) -> u32 {
    let quotient = numerator / denominator;
    let twice_remainder = (numerator % denominator) * 2;
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Build `PC<gen>-<bandwidth>` from a memory type such as `DDR3` and a speed.
///
/// Speeds missing from the table use `speed * 8` rounded to the nearest 100.
pub fn encode(mem_type: Option<&str>, speed_mts: Option<u32>) -> Option<String> {
    let mem_type = mem_type?;
    let speed = speed_mts.filter(|s| *s > 0)?;

    let normalized: String = mem_type
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let generation = normalized.strip_prefix("DDR")?.chars().next()?;
    if !generation.is_ascii_digit() {
        return None;
    }

    let bandwidth = bandwidth_for_speed(speed)
        .map(u64::from)
        .unwrap_or_else(|| (u64::from(speed) * 8 + 50) / 100 * 100);
    Some(format!("PC{}-{}", generation, bandwidth))
}

/// Find a module class anywhere in free text and normalize it to
/// `PC<gen>[L]-<rating><SUFFIX>`.
pub fn extract(text: &str) -> Option<String> {
    let caps = MODULE_CLASS_RE.captures(text)?;
    let lv = caps.name("lv").map(|m| m.as_str().to_uppercase()).unwrap_or_default();
    let suffix = caps
        .name("suffix")
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_default();
    Some(format!(
        "PC{}{}-{}{}",
        &caps["gen"], lv, &caps["rating"], suffix
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_even_rounding() {
        assert_eq!(div_round_half_even(4004, 8), 500);
        assert_eq!(div_round_half_even(4012, 8), 502);
        assert_eq!(div_round_half_even(4005, 8), 501);
    }

    #[test]
    fn test_inverse_table_prefers_first_bandwidth() {
        assert_eq!(bandwidth_for_speed(1066), Some(8500));
        assert_eq!(bandwidth_for_speed(1333), Some(10600));
        assert_eq!(bandwidth_for_speed(1866), Some(14900));
    }

    #[test]
    fn test_extract_normalizes_case_and_separator() {
        assert_eq!(extract("8gb pc3l 12800r x"), Some("PC3L-12800R".to_string()));
        assert_eq!(extract("no class here"), None);
    }
}
