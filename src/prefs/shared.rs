//! Optional process-wide store.
//!
//! Nothing is created implicitly: the application builds a [`Prefs`], hands
//! it to [`install`] once, and readers reach it through [`get`]. All access
//! goes through the returned `RwLock`.

use std::sync::{OnceLock, RwLock};

use super::Prefs;

static SHARED: OnceLock<RwLock<Prefs>> = OnceLock::new();

/// Install `prefs` as the shared store.
///
/// Returns the store back if one was already installed.
pub fn install(prefs: Prefs) -> Result<&'static RwLock<Prefs>, Prefs> {
    let mut pending = Some(prefs);
    let handle = SHARED.get_or_init(|| RwLock::new(pending.take().unwrap_or_default()));
    match pending {
        None => Ok(handle),
        Some(prefs) => Err(prefs),
    }
}

/// The shared store, if [`install`] has been called.
pub fn get() -> Option<&'static RwLock<Prefs>> {
    SHARED.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::NoEnv;

    // The slot is process-global, so the whole lifecycle lives in one test.
    #[test]
    fn test_install_once() {
        let mut first = Prefs::with_env(NoEnv);
        first.set_string("shared", "owner", "first");

        let handle = install(first).unwrap();
        assert!(std::ptr::eq(handle, get().unwrap()));

        let mut second = Prefs::with_env(NoEnv);
        second.set_string("shared", "owner", "second");
        let rejected = install(second).unwrap_err();
        assert_eq!(rejected.get_string("shared", "owner", ""), "second");

        handle.write().unwrap().set_string("shared", "extra", "1");
        let prefs = get().unwrap().read().unwrap();
        assert_eq!(prefs.get_string("shared", "owner", ""), "first");
        assert_eq!(prefs.get_long("shared", "extra", 0), 1);
    }
}
