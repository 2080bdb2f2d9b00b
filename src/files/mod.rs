//! Reading preference files from disk and writing them back.
//!
//! This module provides:
//! - Locating the system directory and user override file
//! - Loading discovered files into a [`Prefs`] in order
//! - Saving the merged store to the user file

mod paths;

pub use paths::{
    conf_files_in, PrefsPaths, CONF_EXTENSION, DEFAULT_SYSTEM_DIR, SYSTEM_DIR_ENV,
    USER_DIR_ENV, USER_DIR_NAME, USER_FILE_NAME,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::parse::FormatError;
use crate::prefs::Prefs;

/// Error type for file-backed loading and saving.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file error in '{path}': {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What to do with a file that cannot be read or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Stop at the first bad file.
    #[default]
    Strict,
    /// Log a warning and continue with the next file.
    SkipInvalid,
}

pub fn read_source(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`read_source`], but a file that does not exist reads as empty.
///
/// Any other failure (permissions, a directory, invalid UTF-8) is an error.
pub fn read_source_or_empty(path: &Path) -> Result<String, LoadError> {
    match fs::read_to_string(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        result => result.map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl Prefs {
    /// Read one file and merge it over the current values.
    pub fn add_config_path(&mut self, path: &Path) -> Result<(), LoadError> {
        let contents = read_source(path)?;
        self.add_config_file(&contents)
            .map_err(|source| LoadError::Format {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(())
    }
}

/// Merge `files` into `prefs` in order. Returns how many were merged.
pub fn load_files(
    prefs: &mut Prefs,
    files: &[PathBuf],
    policy: LoadPolicy,
) -> Result<usize, LoadError> {
    let mut loaded = 0;
    for path in files {
        match prefs.add_config_path(path) {
            Ok(()) => loaded += 1,
            Err(e) if policy == LoadPolicy::SkipInvalid => {
                warn!(error = %e, "skipping config file");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(loaded)
}

/// Build a store from every file [`PrefsPaths::discover`] finds.
pub fn load(paths: &PrefsPaths, policy: LoadPolicy) -> Result<Prefs, LoadError> {
    let mut prefs = Prefs::new();
    load_files(&mut prefs, &paths.discover(), policy)?;
    Ok(prefs)
}

/// Write the full store to `path`, creating parent directories.
pub fn save(prefs: &Prefs, path: &Path) -> Result<(), LoadError> {
    let write_err = |source| LoadError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, prefs.to_text()).map_err(write_err)?;
    debug!(path = %path.display(), "saved preferences");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::NoEnv;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_source_or_empty_missing_file() {
        let dir = TempDir::new().unwrap();
        let text = read_source_or_empty(&dir.path().join("missing.conf")).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_read_source_or_empty_reports_other_errors() {
        let dir = TempDir::new().unwrap();
        let result = read_source_or_empty(dir.path());
        assert!(matches!(result, Err(LoadError::Read { path, .. }) if path == dir.path()));

        let invalid = dir.path().join("latin1.conf");
        fs::write(&invalid, [b'[', 0xff, b']']).unwrap();
        assert!(matches!(
            read_source_or_empty(&invalid),
            Err(LoadError::Read { .. })
        ));
    }

    #[test]
    fn test_add_config_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.conf", "[foo]\nbar = 1\n");

        let mut prefs = Prefs::with_env(NoEnv);
        prefs.add_config_path(&path).unwrap();
        assert_eq!(prefs.get_long("foo", "bar", 0), 1);
    }

    #[test]
    fn test_add_config_path_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut prefs = Prefs::with_env(NoEnv);

        let result = prefs.add_config_path(&dir.path().join("missing.conf"));
        assert!(matches!(result, Err(LoadError::Read { .. })));
    }

    #[test]
    fn test_add_config_path_reports_file_on_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.conf", "[foo\n");

        let mut prefs = Prefs::with_env(NoEnv);
        let err = prefs.add_config_path(&path).unwrap_err();
        assert!(matches!(&err, LoadError::Format { path: p, .. } if p == &path));
        assert!(err.to_string().contains("bad.conf"));
    }

    #[test]
    fn test_load_files_in_order() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "1.conf", "[foo]\nbar = 1\nonly = first\n");
        let second = write(&dir, "2.conf", "[foo]\nbar = 2\n");

        let mut prefs = Prefs::with_env(NoEnv);
        let loaded = load_files(&mut prefs, &[first, second], LoadPolicy::Strict).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(prefs.get_long("foo", "bar", 0), 2);
        assert_eq!(prefs.get_string("foo", "only", ""), "first");
    }

    #[test]
    fn test_load_files_strict_stops() {
        let dir = TempDir::new().unwrap();
        let bad = write(&dir, "1.conf", "[oops\n");
        let good = write(&dir, "2.conf", "[foo]\nbar = 2\n");

        let mut prefs = Prefs::with_env(NoEnv);
        let result = load_files(&mut prefs, &[bad, good], LoadPolicy::Strict);

        assert!(matches!(result, Err(LoadError::Format { .. })));
        assert!(!prefs.has_section("foo"));
    }

    #[test]
    fn test_load_files_skip_invalid_continues() {
        let dir = TempDir::new().unwrap();
        let bad = write(&dir, "1.conf", "[oops\n");
        let missing = dir.path().join("missing.conf");
        let good = write(&dir, "2.conf", "[foo]\nbar = 2\n");

        let mut prefs = Prefs::with_env(NoEnv);
        let loaded =
            load_files(&mut prefs, &[bad, missing, good], LoadPolicy::SkipInvalid).unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(prefs.get_long("foo", "bar", 0), 2);
    }

    #[test]
    fn test_load_from_paths() {
        let dir = TempDir::new().unwrap();
        let system = dir.path().join("conf.d");
        fs::create_dir(&system).unwrap();
        fs::write(system.join("a.conf"), "[foo]\nbar = system\nx = 1\n").unwrap();
        let user_file = write(&dir, "config.conf", "[foo]\nbar = user\n");

        let paths = PrefsPaths {
            system_dir: Some(system),
            user_file: Some(user_file),
        };
        let prefs = load(&paths, LoadPolicy::Strict).unwrap();

        assert_eq!(prefs.mapping().get("foo", "bar"), Some("user"));
        assert_eq!(prefs.mapping().get("foo", "x"), Some("1"));
    }

    #[test]
    fn test_save_creates_parent_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/config.conf");

        let mut prefs = Prefs::with_env(NoEnv);
        prefs.set_string("Foo", "Bar", "a b");
        prefs.set_long("foo", "n", 3);
        save(&prefs, &path).unwrap();

        let mut reloaded = Prefs::with_env(NoEnv);
        reloaded.add_config_path(&path).unwrap();
        assert_eq!(reloaded.mapping(), prefs.mapping());
    }

    #[test]
    fn test_save_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.conf");

        let mut prefs = Prefs::with_env(NoEnv);
        prefs.set_string("a", "b", "c");
        save(&prefs, &path).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        save(&prefs, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }
}
