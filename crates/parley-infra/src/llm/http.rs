//! Shared HTTP plumbing for the backends: client construction and mapping
//! transport failures and status codes onto [`GenerationError`].

use std::time::Duration;

use parley_types::llm::GenerationError;

/// Build a reqwest client with the configured per-request timeout.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|e| GenerationError::Unavailable(format!("failed to create HTTP client: {e}")))
}

/// Join a base URL and an API path without doubling slashes.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Map a failed request (no HTTP response) to a generation error.
pub fn map_send_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::Unavailable(format!("connection failed: {e}"))
    } else {
        GenerationError::Provider {
            message: format!("HTTP request failed: {e}"),
        }
    }
}

/// Pass successful responses through; turn error statuses into errors.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => GenerationError::AuthenticationFailed,
        429 => GenerationError::RateLimited,
        _ => GenerationError::Provider {
            message: format!("HTTP {status}: {error_body}"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8080/v1/", "/completions"),
            "http://localhost:8080/v1/completions"
        );
        assert_eq!(
            join_url("http://localhost:11434", "api/generate"),
            "http://localhost:11434/api/generate"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let client = build_client(5).unwrap();
        let err = client
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .map_err(map_send_error)
            .unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }
}
