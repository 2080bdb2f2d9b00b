//! The preference store.
//!
//! Lookups go environment override → merged mapping → caller default.
//! Values are stored as text and converted on every read.

mod coerce;
mod env;
pub mod shared;

use std::fmt;

use tracing::{debug, trace};

use crate::mapping::{fold, ConfigMapping};
use crate::parse::{parse_into, FormatError};

pub use coerce::{format_bool, parse_bool, parse_double, parse_long};
pub use env::{EnvLookup, NoEnv, ProcessEnv};

/// Prefix of override variables, e.g. `GR_CONF_AUDIO_VERBOSE`.
pub const DEFAULT_ENV_PREFIX: &str = "GR_CONF_";

pub struct Prefs {
    mapping: ConfigMapping,
    env: Box<dyn EnvLookup>,
    env_prefix: String,
}

impl Default for Prefs {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Prefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefs")
            .field("mapping", &self.mapping)
            .field("env_prefix", &self.env_prefix)
            .finish_non_exhaustive()
    }
}

impl Prefs {
    /// Empty store reading overrides from the process environment.
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }

    /// Empty store reading overrides from `env`.
    pub fn with_env(env: impl EnvLookup + 'static) -> Self {
        Self {
            mapping: ConfigMapping::new(),
            env: Box::new(env),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Build a store from source texts, merged in order.
    pub fn from_sources<I, S>(sources: I) -> Result<Self, FormatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefs = Self::new();
        prefs.load_sources(sources)?;
        Ok(prefs)
    }

    /// Merge several source texts in order; later sources win.
    ///
    /// Stops at the first malformed source. Sources before it stay merged.
    pub fn load_sources<I, S>(&mut self, sources: I) -> Result<(), FormatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for source in sources {
            self.add_config_file(source.as_ref())?;
        }
        Ok(())
    }

    /// Parse one more source text and merge it over the current values.
    pub fn add_config_file(&mut self, contents: &str) -> Result<(), FormatError> {
        parse_into(&mut self.mapping, contents)?;
        debug!(sections = self.mapping.len(), "merged config source");
        Ok(())
    }

    pub fn mapping(&self) -> &ConfigMapping {
        &self.mapping
    }

    /// Name of the variable that overrides `section.option`.
    pub fn env_var_name(&self, section: &str, option: &str) -> String {
        format!(
            "{}{}_{}",
            self.env_prefix,
            fold(section).to_uppercase(),
            fold(option).to_uppercase()
        )
    }

    fn env_override(&self, section: &str, option: &str) -> Option<String> {
        let name = self.env_var_name(section, option);
        let value = self.env.var(&name)?;
        trace!(%name, "using environment override");
        Some(value)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.mapping.has_section(section)
    }

    /// True when an override variable is set or the mapping holds the option.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.env_override(section, option).is_some()
            || self.mapping.get(section, option).is_some()
    }

    /// Resolved text for an option. Empty text counts as unset.
    fn lookup(&self, section: &str, option: &str) -> Option<String> {
        self.env_override(section, option)
            .or_else(|| self.mapping.get(section, option).map(str::to_string))
            .filter(|value| !value.is_empty())
    }

    pub fn get_string(&self, section: &str, option: &str, default: &str) -> String {
        self.lookup(section, option)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_bool(&self, section: &str, option: &str, default: bool) -> bool {
        self.lookup(section, option)
            .and_then(|text| parse_bool(&text))
            .unwrap_or(default)
    }

    pub fn get_long(&self, section: &str, option: &str, default: i64) -> i64 {
        self.lookup(section, option)
            .and_then(|text| parse_long(&text))
            .unwrap_or(default)
    }

    pub fn get_double(&self, section: &str, option: &str, default: f64) -> f64 {
        self.lookup(section, option)
            .and_then(|text| parse_double(&text))
            .unwrap_or(default)
    }

    /// Set a value in memory. Nothing is written to disk or the environment.
    pub fn set_string(&mut self, section: &str, option: &str, value: &str) {
        self.mapping.set(section, option, value);
    }

    pub fn set_bool(&mut self, section: &str, option: &str, value: bool) {
        self.mapping.set(section, option, format_bool(value));
    }

    pub fn set_long(&mut self, section: &str, option: &str, value: i64) {
        self.mapping.set(section, option, value.to_string());
    }

    pub fn set_double(&mut self, section: &str, option: &str, value: f64) {
        self.mapping.set(section, option, value.to_string());
    }

    /// The merged mapping in `[section]` / `key = value` form.
    pub fn to_text(&self) -> String {
        self.mapping.to_text()
    }
}
