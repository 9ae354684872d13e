//! Environment configuration.

use std::env;
use std::time::Duration;

pub const ENV_API_BASE_URL: &str = "CHAT_API_BASE_URL";
pub const ENV_API_TIMEOUT_SEC: &str = "CHAT_API_TIMEOUT_SEC";
pub const ENV_LOG: &str = "CHAT_LOG";
pub const ENV_BACKEND: &str = "CHAT_BACKEND";

/// Which backend implementation to start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Http,
    Mock,
}

impl BackendKind {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            other => Err(format!(
                "Unknown backend '{other}'. Expected one of: http, mock"
            )),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Mock => "mock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvConfig {
    /// API origin; `None` means the default local origin.
    pub api_base_url: Option<String>,
    pub api_timeout: Option<Duration>,
    pub log_filter: Option<String>,
    pub backend: BackendKind,
}

impl EnvConfig {
    /// Reads configuration from the process environment.
    ///
    /// Blank values count as unset. Malformed values are reported instead of
    /// silently ignored.
    pub fn from_env() -> Result<Self, String> {
        let api_timeout = env_string_opt(ENV_API_TIMEOUT_SEC)
            .map(|value| parse_timeout_secs(&value))
            .transpose()?;
        let backend = env_string_opt(ENV_BACKEND)
            .map(|value| BackendKind::parse(&value))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            api_base_url: env_string_opt(ENV_API_BASE_URL),
            api_timeout,
            log_filter: env_string_opt(ENV_LOG),
            backend,
        })
    }
}

/// Parses a strictly positive whole number of seconds.
pub fn parse_timeout_secs(value: &str) -> Result<Duration, String> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(format!(
            "{ENV_API_TIMEOUT_SEC} must be a positive integer, got '{value}'"
        )),
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn unset_environment_yields_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard(ENV_API_BASE_URL, None);
        let _g2 = set_env_guard(ENV_API_TIMEOUT_SEC, None);
        let _g3 = set_env_guard(ENV_LOG, None);
        let _g4 = set_env_guard(ENV_BACKEND, None);

        let config = EnvConfig::from_env().expect("defaults should parse");
        assert_eq!(config, EnvConfig::default());
        assert_eq!(config.backend, BackendKind::Http);
    }

    #[test]
    fn populated_environment_is_read() {
        let _lock = env_lock();
        let _g1 = set_env_guard(ENV_API_BASE_URL, Some(" http://chat.local:9000 "));
        let _g2 = set_env_guard(ENV_API_TIMEOUT_SEC, Some("30"));
        let _g3 = set_env_guard(ENV_LOG, Some("chat_session=debug"));
        let _g4 = set_env_guard(ENV_BACKEND, Some("MOCK"));

        let config = EnvConfig::from_env().expect("values should parse");
        assert_eq!(config.api_base_url.as_deref(), Some("http://chat.local:9000"));
        assert_eq!(config.api_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.log_filter.as_deref(), Some("chat_session=debug"));
        assert_eq!(config.backend, BackendKind::Mock);
    }

    #[test]
    fn blank_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard(ENV_API_BASE_URL, Some("   "));
        let _g2 = set_env_guard(ENV_API_TIMEOUT_SEC, Some(""));
        let _g3 = set_env_guard(ENV_LOG, None);
        let _g4 = set_env_guard(ENV_BACKEND, Some(" "));

        let config = EnvConfig::from_env().expect("blank values should parse");
        assert!(config.api_base_url.is_none());
        assert!(config.api_timeout.is_none());
        assert_eq!(config.backend, BackendKind::Http);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let _lock = env_lock();
        let _g1 = set_env_guard(ENV_API_TIMEOUT_SEC, Some("0"));
        let _g2 = set_env_guard(ENV_BACKEND, None);
        let error = EnvConfig::from_env().expect_err("zero timeout is invalid");
        assert!(error.contains(ENV_API_TIMEOUT_SEC));

        let _g3 = set_env_guard(ENV_API_TIMEOUT_SEC, None);
        let _g4 = set_env_guard(ENV_BACKEND, Some("grpc"));
        let error = EnvConfig::from_env().expect_err("unknown backend is invalid");
        assert!(error.contains("grpc"));
    }
}
