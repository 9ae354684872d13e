use url::Url;

use crate::error::ChatApiError;

/// Origin used when the configured base URL is blank ("same origin").
pub const DEFAULT_API_ORIGIN: &str = "http://127.0.0.1:8000";

/// Path prefix every endpoint lives under.
pub const API_PREFIX: &str = "/api";

/// Normalize a configured origin to the API base.
///
/// Normalization rules:
/// 1) blank input selects [`DEFAULT_API_ORIGIN`]
/// 2) keep a trailing `/api` unchanged
/// 3) append `/api` otherwise
pub fn normalize_api_base(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_API_ORIGIN
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        return trimmed.to_string();
    }
    format!("{trimmed}{API_PREFIX}")
}

/// Build an endpoint URL below `api_base`, percent-encoding each segment.
pub fn endpoint_url(api_base: &str, segments: &[&str]) -> Result<Url, ChatApiError> {
    let mut url = Url::parse(api_base)
        .map_err(|error| ChatApiError::InvalidBaseUrl(format!("{api_base}: {error}")))?;

    {
        let mut path = url.path_segments_mut().map_err(|_| {
            ChatApiError::InvalidBaseUrl(format!("{api_base}: URL cannot be a base"))
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_encodes_reserved_characters_in_segments() {
        let url = endpoint_url("http://localhost:8000/api", &["chats", "a/b c"])
            .expect("valid base should build");
        assert_eq!(url.as_str(), "http://localhost:8000/api/chats/a%2Fb%20c");
    }

    #[test]
    fn endpoint_url_rejects_non_hierarchical_base() {
        let error = endpoint_url("mailto:someone@example.com", &["chats"])
            .expect_err("mailto URLs cannot carry path segments");
        assert!(matches!(error, ChatApiError::InvalidBaseUrl(_)));
    }
}
