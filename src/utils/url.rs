//! URL utilities for building signed connection endpoints.
//!
//! This module provides utilities for assembling the `wss://` URL a session
//! dials, preventing issues with stray slashes between host and path.

/// Build the full connection URL from a host, an endpoint path, and a
/// pre-built query string.
///
/// The host may carry a trailing slash and the path may or may not carry a
/// leading one; both are normalized so the result never contains a doubled
/// or missing separator.
///
/// # Examples
///
/// ```
/// use sparkstream::utils::url::request_url;
///
/// assert_eq!(
///     request_url("spark-api.xf-yun.com", "/v3.5/chat", "a=1&b=2"),
///     "wss://spark-api.xf-yun.com/v3.5/chat?a=1&b=2"
/// );
/// assert_eq!(
///     request_url("spark-api.xf-yun.com/", "v3.5/chat", "a=1"),
///     "wss://spark-api.xf-yun.com/v3.5/chat?a=1"
/// );
/// ```
pub fn request_url(host: &str, path: &str, query: &str) -> String {
    let host = host.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("wss://{host}/{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        // Plain host and rooted path
        assert_eq!(
            request_url("spark-api.xf-yun.com", "/v3.5/chat", "q=1"),
            "wss://spark-api.xf-yun.com/v3.5/chat?q=1"
        );

        // Host with trailing slash
        assert_eq!(
            request_url("spark-api.xf-yun.com/", "/v3.5/chat", "q=1"),
            "wss://spark-api.xf-yun.com/v3.5/chat?q=1"
        );

        // Path without leading slash
        assert_eq!(
            request_url("spark-api.xf-yun.com", "v1.1/chat", "q=1"),
            "wss://spark-api.xf-yun.com/v1.1/chat?q=1"
        );

        // Both normalized at once
        assert_eq!(
            request_url("spark-api.xf-yun.com///", "///v2.1/chat", "q=1"),
            "wss://spark-api.xf-yun.com/v2.1/chat?q=1"
        );
    }
}
