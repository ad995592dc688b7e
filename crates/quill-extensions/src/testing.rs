//! Test support for code that reads policy environment variables.

use std::env;

/// Scoped environment variable override.
///
/// Captures the variable's current value on construction and restores it on
/// drop, so a panicking test cannot leak state into the next one. The process
/// environment is shared across threads; serialize tests that use this guard
/// (the Quill suites use `#[serial]` from `serial_test`).
#[derive(Debug)]
pub struct EnvVarGuard {
    key: String,
    previous: Option<String>,
}

impl EnvVarGuard {
    /// Sets `key` to `value` for the lifetime of the guard.
    pub fn set(key: impl Into<String>, value: &str) -> Self {
        let key = key.into();
        let previous = env::var(&key).ok();
        // Safety: callers serialize tests that touch the environment.
        unsafe { env::set_var(&key, value) };
        Self { key, previous }
    }

    /// Removes `key` for the lifetime of the guard.
    pub fn unset(key: impl Into<String>) -> Self {
        let key = key.into();
        let previous = env::var(&key).ok();
        // Safety: callers serialize tests that touch the environment.
        unsafe { env::remove_var(&key) };
        Self { key, previous }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.previous {
            // Safety: same serialization contract as the constructors.
            Some(value) => unsafe { env::set_var(&self.key, value) },
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_set_restores_previous_value() {
        unsafe { env::set_var("QUILL_GUARD_TEST", "before") };
        {
            let _guard = EnvVarGuard::set("QUILL_GUARD_TEST", "during");
            assert_eq!(env::var("QUILL_GUARD_TEST").as_deref(), Ok("during"));
        }
        assert_eq!(env::var("QUILL_GUARD_TEST").as_deref(), Ok("before"));
        unsafe { env::remove_var("QUILL_GUARD_TEST") };
    }

    #[test]
    #[serial]
    fn test_unset_restores_missing_value() {
        {
            let _guard = EnvVarGuard::set("QUILL_GUARD_TEST", "value");
            {
                let _inner = EnvVarGuard::unset("QUILL_GUARD_TEST");
                assert!(env::var("QUILL_GUARD_TEST").is_err());
            }
            assert_eq!(env::var("QUILL_GUARD_TEST").as_deref(), Ok("value"));
        }
        assert!(env::var("QUILL_GUARD_TEST").is_err());
    }
}
