//! Where preference files live and which ones get loaded.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use ignore::WalkBuilder;
use tracing::warn;

use crate::prefs::{EnvLookup, ProcessEnv};

/// Overrides the system directory.
pub const SYSTEM_DIR_ENV: &str = "GR_PREFSDIR";
/// Overrides the user directory.
pub const USER_DIR_ENV: &str = "GR_PREFS_PATH";

pub const DEFAULT_SYSTEM_DIR: &str = "/etc/gnuradio/conf.d";
pub const USER_DIR_NAME: &str = ".gnuradio";
pub const USER_FILE_NAME: &str = "config.conf";
pub const CONF_EXTENSION: &str = "conf";

/// Locations of the system config directory and the user override file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefsPaths {
    pub system_dir: Option<PathBuf>,
    pub user_file: Option<PathBuf>,
}

impl PrefsPaths {
    /// Locations for this process.
    pub fn detect() -> Self {
        Self::detect_with(&ProcessEnv)
    }

    /// Locations derived from `env`, falling back to the built-in defaults.
    pub fn detect_with(env: &dyn EnvLookup) -> Self {
        let non_empty = |name: &str| env.var(name).filter(|v| !v.is_empty());

        let system_dir = non_empty(SYSTEM_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SYSTEM_DIR));

        let user_dir = non_empty(USER_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().join(USER_DIR_NAME)));

        Self {
            system_dir: Some(system_dir),
            user_file: user_dir.map(|dir| dir.join(USER_FILE_NAME)),
        }
    }

    /// Files to merge, in order: sorted `*.conf` files of the system
    /// directory, then the user file if it exists.
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut files = self
            .system_dir
            .as_deref()
            .map(conf_files_in)
            .unwrap_or_default();

        if let Some(user_file) = &self.user_file {
            if user_file.is_file() {
                files.push(user_file.clone());
            }
        }

        files
    }
}

/// `*.conf` files directly inside `dir`, sorted by path.
///
/// A missing directory yields no files.
pub fn conf_files_in(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .max_depth(Some(1))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                let is_conf = entry.path().extension().is_some_and(|ext| ext == CONF_EXTENSION);
                if is_file && is_conf {
                    files.push(entry.into_path());
                }
            }
            Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable entry"),
        }
    }

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_detect_uses_env_overrides() {
        let paths = PrefsPaths::detect_with(&env(&[
            (SYSTEM_DIR_ENV, "/opt/conf.d"),
            (USER_DIR_ENV, "/home/me/.prefs"),
        ]));

        assert_eq!(paths.system_dir, Some(PathBuf::from("/opt/conf.d")));
        assert_eq!(
            paths.user_file,
            Some(PathBuf::from("/home/me/.prefs/config.conf"))
        );
    }

    #[test]
    fn test_detect_defaults() {
        let paths = PrefsPaths::detect_with(&env(&[(SYSTEM_DIR_ENV, "")]));

        assert_eq!(paths.system_dir, Some(PathBuf::from(DEFAULT_SYSTEM_DIR)));
        if let Some(user_file) = paths.user_file {
            assert!(user_file.ends_with(".gnuradio/config.conf"));
        }
    }

    #[test]
    fn test_conf_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.conf"), "").unwrap();
        fs::write(dir.path().join("a.conf"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.conf"), "").unwrap();

        let files = conf_files_in(dir.path());
        assert_eq!(
            files,
            vec![dir.path().join("a.conf"), dir.path().join("b.conf")]
        );
    }

    #[test]
    fn test_conf_files_include_hidden() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".local.conf"), "").unwrap();

        assert_eq!(conf_files_in(dir.path()).len(), 1);
    }

    #[test]
    fn test_conf_files_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(conf_files_in(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn test_discover_appends_user_file_last() {
        let dir = TempDir::new().unwrap();
        let system = dir.path().join("conf.d");
        fs::create_dir(&system).unwrap();
        fs::write(system.join("00-base.conf"), "").unwrap();
        let user_file = dir.path().join("config.conf");
        fs::write(&user_file, "").unwrap();

        let paths = PrefsPaths {
            system_dir: Some(system.clone()),
            user_file: Some(user_file.clone()),
        };
        assert_eq!(paths.discover(), vec![system.join("00-base.conf"), user_file]);
    }

    #[test]
    fn test_discover_skips_missing_user_file() {
        let dir = TempDir::new().unwrap();
        let paths = PrefsPaths {
            system_dir: None,
            user_file: Some(dir.path().join("config.conf")),
        };
        assert!(paths.discover().is_empty());
    }
}
