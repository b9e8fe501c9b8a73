//! Reduce whatever the scanner delivered to the key used for mappings and versions.
//!
//! Module labels carry more than the part number: a leading country of origin
//! (`CN`, `KR`), serial number pairs, or a `+suffix` revision. The rules:
//!
//! 1. Trim; empty input gives an empty key.
//! 2. Drop a leading two-letter upper-case token when more tokens follow.
//! 3. If the last two tokens are both all digits, keep the last one,
//!    otherwise keep the first remaining token.
//! 4. Cut the candidate at the first `+`.

pub fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();

    if tokens.len() >= 2 && is_country_code(tokens[0]) {
        tokens.remove(0);
    }

    let candidate = match tokens.as_slice() {
        [.., second_last, last] if is_all_digits(second_last) && is_all_digits(last) => *last,
        [first, ..] => *first,
        [] => "",
    };

    match candidate.split_once('+') {
        Some((head, _)) => head.to_string(),
        None => candidate.to_string(),
    }
}

fn is_country_code(token: &str) -> bool {
    token.len() == 2 && token.bytes().all(|b| b.is_ascii_uppercase())
}

fn is_all_digits(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_only_dropped_when_followed() {
        assert_eq!(canonicalize("CN"), "CN");
        assert_eq!(canonicalize("CN M378A1K43CB2"), "M378A1K43CB2");
    }

    #[test]
    fn test_lowercase_prefix_is_not_a_country_code() {
        assert_eq!(canonicalize("cn M378A1K43CB2"), "cn");
    }

    #[test]
    fn test_digit_pair_after_part_number() {
        assert_eq!(canonicalize("M378A1K43CB2 1234 5678"), "5678");
        assert_eq!(canonicalize("M378A1K43CB2 1234X 5678"), "M378A1K43CB2");
    }

    #[test]
    fn test_plus_at_start_gives_empty_key() {
        assert_eq!(canonicalize("+ABC"), "");
    }
}
