//! Process-global environment mutation helpers for tests and tooling.

use std::sync::{Mutex, OnceLock};

/// Return the global lock used to serialize environment mutations.
///
/// Hold the guard for as long as any [`EnvGuard`] created under it is alive.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers serialize mutation through `env_lock`.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Restores every touched environment variable when dropped.
///
/// Overrides are recorded in order; restoration runs in reverse so a key
/// touched twice ends up at its original value.
#[derive(Default)]
pub struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    /// Set `key=value` for the lifetime of a new guard.
    pub fn set(key: &str, value: &str) -> Self {
        Self::default().and_set(key, value)
    }

    /// Remove `key` for the lifetime of a new guard.
    pub fn remove(key: &str) -> Self {
        Self::default().and_remove(key)
    }

    /// Chain another override onto this guard.
    pub fn and_set(mut self, key: &str, value: &str) -> Self {
        self.record(key);
        write_var(key, Some(value));
        self
    }

    /// Chain another removal onto this guard.
    pub fn and_remove(mut self, key: &str) -> Self {
        self.record(key);
        write_var(key, None);
        self
    }

    fn record(&mut self, key: &str) {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            write_var(&key, previous.as_deref());
        }
    }
}
