//! Layered preference store.
//!
//! Preference files use a sectioned `[section]` / `key = value` format:
//!
//! ```text
//! # comments start with '#'
//! [audio]
//! verbose = on
//! device  = "hw:0, 1"   # quotes keep inner spaces
//! ```
//!
//! Sources are merged in order (later files win per option) into a [`Prefs`]
//! store, whose typed getters check an environment override
//! (`GR_CONF_<SECTION>_<OPTION>`) first, then the merged files, then the
//! caller's default.
//!
//! ```
//! use grprefs::{NoEnv, Prefs};
//!
//! let mut prefs = Prefs::with_env(NoEnv);
//! prefs.add_config_file("[audio]\nverbose = on\n").unwrap();
//! assert!(prefs.get_bool("Audio", "Verbose", false));
//! assert_eq!(prefs.get_long("audio", "channels", 2), 2);
//! ```

pub mod files;
pub mod mapping;
pub mod output;
pub mod parse;
pub mod prefs;
pub mod tokenize;

pub use files::{
    load, load_files, read_source, read_source_or_empty, save, LoadError, LoadPolicy,
    PrefsPaths,
};
pub use mapping::{ConfigMapping, OptionMapping};
pub use parse::{parse, parse_into, FormatError, Token};
pub use prefs::{
    parse_bool, parse_double, parse_long, shared, EnvLookup, NoEnv, Prefs, ProcessEnv,
    DEFAULT_ENV_PREFIX,
};
pub use tokenize::{normalize, normalize_line, significant_lines, token_stream, NormalizedLine};
