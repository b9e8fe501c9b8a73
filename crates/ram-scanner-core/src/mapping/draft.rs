use super::Mapping;
use crate::canonical::canonicalize;
use crate::classify::module_class;
use crate::classify::ClassificationResult;

/// A mapping-edit request as entered by an operator.
///
/// Manual DDR type and speed (and a free-form kind such as `Registered`)
/// only exist on the draft; they are folded into the mapping's module class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingDraft {
    pub code: String,
    pub size_gb: Option<u32>,
    pub module_class: Option<String>,
    pub manufacturer: Option<String>,
    pub ecc: Option<bool>,
    pub mem_type: Option<String>,
    pub speed_mts: Option<u32>,
    pub kind: Option<String>,
    pub regex: bool,
}

/// Field the operator should fill in first after an unknown scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Size,
    ModuleClass,
    Manufacturer,
}

impl MappingDraft {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Pre-fill the form with whatever heuristics already found for `key`.
    pub fn prefill(key: &str, partial: &ClassificationResult) -> Self {
        Self {
            code: key.to_string(),
            size_gb: partial.size(),
            module_class: partial.module_class().map(str::to_string),
            manufacturer: partial.manufacturer().map(str::to_string),
            ecc: partial.ecc,
            ..Default::default()
        }
    }

    pub fn first_missing(&self) -> Option<DraftField> {
        if self.size_gb.filter(|v| *v > 0).is_none() {
            Some(DraftField::Size)
        } else if trimmed(self.module_class.as_deref()).is_none() {
            Some(DraftField::ModuleClass)
        } else if trimmed(self.manufacturer.as_deref()).is_none() {
            Some(DraftField::Manufacturer)
        } else {
            None
        }
    }

    /// The pattern this draft would be stored under.
    pub fn pattern(&self) -> String {
        if self.regex {
            self.code.trim().to_string()
        } else {
            canonicalize(&self.code)
        }
    }

    /// Normalize the draft into a storable mapping; `None` when there is no pattern.
    pub fn to_mapping(&self) -> Option<Mapping> {
        let pattern = self.pattern();
        if pattern.is_empty() {
            return None;
        }

        let mut module_class = trimmed(self.module_class.as_deref()).map(str::to_uppercase);
        let manufacturer = trimmed(self.manufacturer.as_deref()).map(title_case);
        let mut mem_type = trimmed(self.mem_type.as_deref()).map(str::to_uppercase);
        let mut speed_mts = self.speed_mts.filter(|v| *v > 0);
        let mut ecc = self.ecc;

        if mem_type.is_none() || speed_mts.is_none() {
            if let Some(class_str) = &module_class {
                let decoded = module_class::decode(class_str);
                mem_type = mem_type.or(decoded.mem_type);
                speed_mts = speed_mts.or(decoded.speed_mts);
                ecc = ecc.or(decoded.ecc_hint);
            }
        }

        if module_class.is_none() && (mem_type.is_some() || speed_mts.is_some()) {
            module_class = module_class::encode(mem_type.as_deref(), speed_mts)
                .or_else(|| self.readable_class(mem_type.as_deref(), speed_mts));
        }

        Some(Mapping {
            pattern,
            size_gb: self.size_gb,
            speed_mts,
            mem_type,
            manufacturer,
            module_class,
            ecc,
            is_regex: self.regex,
        })
    }

    /// `"DDR3 1333 Registered"` when no `PCx` designator can be built.
    fn readable_class(&self, mem_type: Option<&str>, speed_mts: Option<u32>) -> Option<String> {
        let parts: Vec<String> = [
            mem_type.map(str::to_string),
            speed_mts.map(|s| s.to_string()),
            trimmed(self.kind.as_deref()).map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("samsung"), "Samsung");
        assert_eq!(title_case("SK HYNIX"), "Sk Hynix");
        assert_eq!(title_case("g.skill"), "G.Skill");
    }

    #[test]
    fn test_manual_type_and_speed_synthesize_class() {
        let draft = MappingDraft {
            mem_type: Some("ddr3".to_string()),
            speed_mts: Some(1333),
            ..MappingDraft::new("HMT351R7CFR8C")
        };
        let mapping = draft.to_mapping().unwrap();
        assert_eq!(mapping.module_class.as_deref(), Some("PC3-10600"));
        assert_eq!(mapping.mem_type.as_deref(), Some("DDR3"));
    }

    #[test]
    fn test_readable_class_when_encoding_fails() {
        let draft = MappingDraft {
            mem_type: Some("SDRAM".to_string()),
            speed_mts: Some(133),
            kind: Some("Registered".to_string()),
            ..MappingDraft::new("X1")
        };
        let mapping = draft.to_mapping().unwrap();
        assert_eq!(mapping.module_class.as_deref(), Some("SDRAM 133 Registered"));
    }

    #[test]
    fn test_class_fills_type_speed_and_ecc() {
        let draft = MappingDraft {
            module_class: Some(" pc4-19200e ".to_string()),
            ..MappingDraft::new("KR M393A2K40BB1-CRC+01")
        };
        let mapping = draft.to_mapping().unwrap();
        assert_eq!(mapping.pattern, "M393A2K40BB1-CRC");
        assert_eq!(mapping.module_class.as_deref(), Some("PC4-19200E"));
        assert_eq!(mapping.mem_type.as_deref(), Some("DDR4"));
        assert_eq!(mapping.speed_mts, Some(2400));
        assert_eq!(mapping.ecc, Some(true));
    }

    #[test]
    fn test_regex_pattern_is_kept_verbatim() {
        let mut draft = MappingDraft::new("  ^M391.+FH0$ ");
        draft.regex = true;
        assert_eq!(draft.pattern(), "^M391.+FH0$");
    }

    #[test]
    fn test_first_missing_order() {
        let mut draft = MappingDraft::new("X");
        assert_eq!(draft.first_missing(), Some(DraftField::Size));
        draft.size_gb = Some(8);
        assert_eq!(draft.first_missing(), Some(DraftField::ModuleClass));
        draft.module_class = Some("PC3-12800".to_string());
        assert_eq!(draft.first_missing(), Some(DraftField::Manufacturer));
        draft.manufacturer = Some("Samsung".to_string());
        assert_eq!(draft.first_missing(), None);
    }
}
