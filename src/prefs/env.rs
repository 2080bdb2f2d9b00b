//! Environment lookup used for option overrides.

use std::collections::HashMap;

/// Source of override variables.
///
/// The store asks for `<PREFIX><SECTION>_<OPTION>` (uppercased) before it
/// looks at its own mapping.
pub trait EnvLookup: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

/// Never reports an override.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnv;

impl EnvLookup for NoEnv {
    fn var(&self, _name: &str) -> Option<String> {
        None
    }
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_env_is_empty() {
        assert_eq!(NoEnv.var("PATH"), None);
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |name: &str| (name == "X").then(|| "1".to_string());
        assert_eq!(lookup.var("X").as_deref(), Some("1"));
        assert_eq!(lookup.var("Y"), None);
    }

    #[test]
    fn test_map_lookup() {
        let env = HashMap::from([("GR_CONF_A_B".to_string(), "v".to_string())]);
        assert_eq!(env.var("GR_CONF_A_B").as_deref(), Some("v"));
        assert_eq!(env.var("GR_CONF_A_C"), None);
    }

    #[test]
    fn test_process_env_missing_variable() {
        assert_eq!(ProcessEnv.var("GRPREFS_TEST_SURELY_UNSET_VARIABLE"), None);
    }
}
