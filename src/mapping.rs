//! Section → option → value storage.

use std::collections::BTreeMap;
use std::fmt;

use crate::tokenize::COMMENT;

/// Options of one section, keyed by lowercased option name.
pub type OptionMapping = BTreeMap<String, String>;

/// Two-level preference mapping.
///
/// Section and option names are canonicalized on the way in (see [`fold`]).
/// Values are kept verbatim apart from line breaks, which become spaces.
/// Iteration is sorted by name so serialization is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMapping {
    sections: BTreeMap<String, OptionMapping>,
}

/// Characters with a meaning of their own in a preference file.
const NAME_RESERVED: [char; 5] = ['=', COMMENT, '[', ']', '"'];

/// Canonical form of a section or option name: lowercased, with whitespace
/// and [`NAME_RESERVED`] characters removed.
///
/// Parsed names never contain those, so any name given to a setter is stored
/// the way it would read back from saved text.
pub(crate) fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !NAME_RESERVED.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

impl ConfigMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&fold(section))
    }

    pub fn section(&self, section: &str) -> Option<&OptionMapping> {
        self.sections.get(&fold(section))
    }

    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.section(section)?.get(&fold(option)).map(String::as_str)
    }

    /// Insert or replace a single value, creating the section if needed.
    pub fn set(&mut self, section: &str, option: &str, value: impl Into<String>) {
        let mut value = value.into();
        if value.contains(['\n', '\r']) {
            value = value.replace(['\n', '\r'], " ");
        }
        self.ensure_section(section).insert(fold(option), value);
    }

    /// Get the options of `section`, recording it as an empty section if absent.
    pub fn ensure_section(&mut self, section: &str) -> &mut OptionMapping {
        self.sections.entry(fold(section)).or_default()
    }

    /// Merge `other` into `self`. Values from `other` win per (section, option);
    /// options only present in `self` are kept.
    pub fn merge(&mut self, other: ConfigMapping) {
        for (name, options) in other.sections {
            self.sections.entry(name).or_default().extend(options);
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &OptionMapping)> {
        self.sections
            .iter()
            .map(|(name, options)| (name.as_str(), options))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Serialize to `[section]` / `key = value` text.
    ///
    /// Values that would not survive re-parsing as bare text (whitespace,
    /// `#`, `"` or brackets) are written in quotes.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

fn needs_quotes(value: &str) -> bool {
    value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, COMMENT | '"' | '[' | ']'))
}

impl fmt::Display for ConfigMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, options) in &self.sections {
            writeln!(f, "[{name}]")?;
            for (option, value) in options {
                if needs_quotes(value) {
                    writeln!(f, "{option} = \"{value}\"")?;
                } else {
                    writeln!(f, "{option} = {value}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
