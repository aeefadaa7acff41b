//! Engine configuration.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # Backend selection: sqlite://path/to/store.db, sqlite::memory:, or memory:
//! CREW_DATABASE_URL=sqlite:///var/lib/crew/store.db
//!
//! # Join-code allocation retry bound (defensive; default 10)
//! CREW_JOIN_CODE_ATTEMPTS=10
//! ```

use std::env;

use thiserror::Error;

use crate::join_code::MAX_JOIN_CODE_ATTEMPTS;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Backend database URL
    pub database_url: String,
    /// How many join codes to draw before giving up
    pub join_code_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: "memory:".to_string(),
            join_code_attempts: MAX_JOIN_CODE_ATTEMPTS,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid CREW_JOIN_CODE_ATTEMPTS: {0}. Expected a positive integer")]
    InvalidJoinCodeAttempts(String),
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("CREW_DATABASE_URL").unwrap_or_else(|_| "memory:".to_string());

        let join_code_attempts = match env::var("CREW_JOIN_CODE_ATTEMPTS") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidJoinCodeAttempts(raw))?,
            Err(_) => MAX_JOIN_CODE_ATTEMPTS,
        };

        Ok(Self {
            database_url,
            join_code_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    // All env vars we touch in tests - cleared before each test
    const ENV_VARS: &[&str] = &["CREW_DATABASE_URL", "CREW_JOIN_CODE_ATTEMPTS"];

    // Helper to clean up env vars - holds mutex lock
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
    }

    impl<'a> EnvGuard<'a> {
        fn new() -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            for var in ENV_VARS {
                env::remove_var(var);
            }
            Self { _lock: lock }
        }

        fn set(&self, key: &str, value: &str) {
            env::set_var(key, value);
        }
    }

    impl<'a> Drop for EnvGuard<'a> {
        fn drop(&mut self) {
            for var in ENV_VARS {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn defaults_to_memory_backend() {
        let _guard = EnvGuard::new();

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.database_url, "memory:");
        assert_eq!(config.join_code_attempts, MAX_JOIN_CODE_ATTEMPTS);
    }

    #[test]
    fn reads_database_url() {
        let guard = EnvGuard::new();
        guard.set("CREW_DATABASE_URL", "sqlite:///tmp/crew.db");

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.database_url, "sqlite:///tmp/crew.db");
    }

    #[test]
    fn reads_join_code_attempts() {
        let guard = EnvGuard::new();
        guard.set("CREW_JOIN_CODE_ATTEMPTS", "25");

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.join_code_attempts, 25);
    }

    #[test]
    fn rejects_non_numeric_attempts() {
        let guard = EnvGuard::new();
        guard.set("CREW_JOIN_CODE_ATTEMPTS", "plenty");

        let result = EngineConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidJoinCodeAttempts(_))
        ));
    }

    #[test]
    fn rejects_zero_attempts() {
        let guard = EnvGuard::new();
        guard.set("CREW_JOIN_CODE_ATTEMPTS", "0");

        let result = EngineConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidJoinCodeAttempts(_))
        ));
    }
}
