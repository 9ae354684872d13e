use std::sync::Arc;
use std::time::Duration;

use chat_backend::ChatBackend;
use chat_backend_http::{HttpBackendConfig, HttpChatBackend, HTTP_BACKEND_ID};
use chat_backend_mock::{MockBackend, MOCK_BACKEND_ID};

/// Settings needed to build any supported backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSettings {
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

pub fn backend_for_id(
    backend_id: &str,
    settings: &BackendSettings,
) -> Result<Arc<dyn ChatBackend>, String> {
    match backend_id.trim() {
        HTTP_BACKEND_ID => {
            let mut config = HttpBackendConfig::new(settings.base_url.clone().unwrap_or_default())
                .with_user_agent(concat!("chat_cli/", env!("CARGO_PKG_VERSION")));
            if let Some(timeout) = settings.timeout {
                config = config.with_timeout(timeout);
            }
            let backend = HttpChatBackend::new(config).map_err(|error| error.to_string())?;
            Ok(Arc::new(backend))
        }
        MOCK_BACKEND_ID => Ok(Arc::new(
            MockBackend::default()
                .with_greeting("Wetin dey sup? Knack your gist make we yarn.")
                .with_reply_delay(Duration::from_millis(300)),
        )),
        unknown => Err(format!(
            "Unsupported backend '{unknown}'. Available backends: {HTTP_BACKEND_ID}, {MOCK_BACKEND_ID}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_for_id_supports_http_and_mock() {
        let settings = BackendSettings::default();

        let http = backend_for_id("http", &settings).expect("http backend should resolve");
        assert_eq!(http.profile().backend_id, "http");
        assert_eq!(
            http.profile().endpoint.as_deref(),
            Some("http://127.0.0.1:8000/api")
        );

        let mock = backend_for_id("mock", &settings).expect("mock backend should resolve");
        assert_eq!(mock.profile().backend_id, "mock");
    }

    #[test]
    fn backend_for_id_rejects_unknown_backend() {
        let error = match backend_for_id("grpc", &BackendSettings::default()) {
            Ok(_) => panic!("unknown backends should fail"),
            Err(error) => error,
        };

        assert!(error.contains("Unsupported backend 'grpc'"));
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let settings = BackendSettings {
            base_url: Some("not a url".to_string()),
            timeout: None,
        };
        let error = match backend_for_id("http", &settings) {
            Ok(_) => panic!("invalid base url should fail"),
            Err(error) => error,
        };

        assert!(error.contains("Failed to initialize http backend"));
    }
}
