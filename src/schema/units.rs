use serde::{Deserialize, Serialize};

/// SI prefixes applied to unit symbols (`ms`, `kHz`). Matched case-sensitively.
pub const SI_SYMBOL_PREFIXES: &[&str] = &[
    "Y", "Z", "E", "P", "T", "G", "M", "k", "h", "da", "d", "c", "m", "u", "\u{00b5}", "n", "p",
    "f", "a", "z", "y",
];

/// SI prefixes applied to unit names (`milliseconds`, `kilohertz`). Matched case-insensitively.
pub const SI_NAME_PREFIXES: &[&str] = &[
    "yotta", "zetta", "exa", "peta", "tera", "giga", "mega", "kilo", "hecto", "deca", "deci",
    "centi", "milli", "micro", "nano", "pico", "femto", "atto", "zepto", "yocto",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    /// Accepts SI prefixes.
    #[serde(default)]
    pub si_unit: bool,
    /// A symbol (`s`, `Hz`) rather than a name (`second`): case-sensitive, never pluralized.
    #[serde(default)]
    pub unit_symbol: bool,
    /// Written before the value (`$10`) instead of after it.
    #[serde(default)]
    pub unit_prefix: bool,
}

impl Unit {
    pub fn new(name: &str) -> Unit {
        Unit {
            name: name.to_string(),
            si_unit: false,
            unit_symbol: false,
            unit_prefix: false,
        }
    }

    pub fn si(mut self) -> Unit {
        self.si_unit = true;
        self
    }

    pub fn symbol(mut self) -> Unit {
        self.unit_symbol = true;
        self
    }

    pub fn prefix(mut self) -> Unit {
        self.unit_prefix = true;
        self
    }
}

/// A concrete unit spelling accepted in a value, after SI prefix and plural expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedUnit {
    pub text: String,
    pub case_sensitive: bool,
    pub is_prefix: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitClass {
    name: String,
    default_units: Option<String>,
    units: Vec<Unit>,
    // Longest spelling first so `ms` is tried before `s`.
    derived: Vec<DerivedUnit>,
}

fn plural(name: &str) -> Option<String> {
    if name.ends_with('s') || name.ends_with('z') {
        None
    } else {
        Some(format!("{name}s"))
    }
}

impl UnitClass {
    pub fn new<S: Into<String>>(name: S, default_units: Option<String>, units: Vec<Unit>) -> Self {
        let mut derived = Vec::<DerivedUnit>::new();
        let mut push = |text: String, case_sensitive: bool, is_prefix: bool| {
            if !derived.iter().any(|d| d.text == text) {
                derived.push(DerivedUnit {
                    text,
                    case_sensitive,
                    is_prefix,
                });
            }
        };
        for unit in units.iter() {
            if unit.unit_prefix {
                push(unit.name.clone(), true, true);
            } else if unit.unit_symbol {
                push(unit.name.clone(), true, false);
                if unit.si_unit {
                    for prefix in SI_SYMBOL_PREFIXES {
                        push(format!("{prefix}{}", unit.name), true, false);
                    }
                }
            } else {
                let mut spellings = vec![unit.name.clone()];
                spellings.extend(plural(&unit.name));
                for spelling in spellings {
                    if unit.si_unit {
                        for prefix in SI_NAME_PREFIXES {
                            push(format!("{prefix}{spelling}"), false, false);
                        }
                    }
                    push(spelling, false, false);
                }
            }
        }
        derived.sort_by(|a, b| b.text.len().cmp(&a.text.len()));

        UnitClass {
            name: name.into(),
            default_units,
            units,
            derived,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_units(&self) -> Option<&str> {
        self.default_units.as_deref()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn derived_units(&self) -> &[DerivedUnit] {
        &self.derived
    }

    /// If `value` carries one of this class's units, return the value with the unit removed
    /// (trimmed). Returns `None` when no unit spelling matches.
    pub fn strip_units<'v>(&self, value: &'v str) -> Option<&'v str> {
        let value = value.trim();
        for unit in self.derived.iter() {
            if unit.is_prefix {
                if let Some(rest) = value.strip_prefix(unit.text.as_str()) {
                    return Some(rest.trim_start());
                }
                continue;
            }
            if value.len() <= unit.text.len() {
                continue;
            }
            let split = value.len() - unit.text.len();
            if !value.is_char_boundary(split) {
                continue;
            }
            let (head, tail) = value.split_at(split);
            let matched = if unit.case_sensitive {
                tail == unit.text
            } else {
                tail.eq_ignore_ascii_case(&unit.text)
            };
            if matched {
                return Some(head.trim_end());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time() -> UnitClass {
        UnitClass::new(
            "time",
            Some("s".to_string()),
            vec![
                Unit::new("second").si(),
                Unit::new("s").si().symbol(),
                Unit::new("minute"),
                Unit::new("hour"),
            ],
        )
    }

    #[test]
    fn test_strip_symbol_units() {
        let time = time();
        assert_eq!(time.strip_units("3 s"), Some("3"));
        assert_eq!(time.strip_units("3 ms"), Some("3"));
        assert_eq!(time.strip_units("3ms"), Some("3"));
        assert_eq!(time.strip_units("3 MS"), None);
        assert_eq!(time.strip_units("s"), None);
    }

    #[test]
    fn test_strip_named_units() {
        let time = time();
        assert_eq!(time.strip_units("2 minutes"), Some("2"));
        assert_eq!(time.strip_units("2 Minute"), Some("2"));
        assert_eq!(time.strip_units("4.5 milliseconds"), Some("4.5"));
        assert_eq!(time.strip_units("1 fortnight"), None);
    }

    #[test]
    fn test_prefix_units() {
        let currency = UnitClass::new(
            "currency",
            Some("$".to_string()),
            vec![Unit::new("$").prefix(), Unit::new("dollar")],
        );
        assert_eq!(currency.strip_units("$25.99"), Some("25.99"));
        assert_eq!(currency.strip_units("25 dollars"), Some("25"));
        assert_eq!(currency.default_units(), Some("$"));
    }

    #[test]
    fn test_derived_units_sorted_longest_first() {
        let time = time();
        let lengths: Vec<usize> = time.derived_units().iter().map(|d| d.text.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }
}
