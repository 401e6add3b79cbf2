use reqwest::{Client, Method};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;

use crate::error::RequestError;
use crate::models::{HttpMethod, RequestOutcome};

/// Transport failures worth another attempt, matched against the lower-cased
/// error source chain.
const RETRYABLE_PATTERNS: &[&str] = &[
    "timeout",
    "timed out",
    "connection refused",
    "connection reset",
    "connection closed",
    "temporary failure",
    "dns error",
    "network is unreachable",
    "no route to host",
    "broken pipe",
];

pub const USER_AGENT: &str = concat!("xsspect/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct RequesterConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_unit: Duration,
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

pub struct Requester {
    client: Client,
    config: RequesterConfig,
}

impl Requester {
    pub fn new(config: RequesterConfig) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(false)
            .build()
            .map_err(|e| RequestError::Build(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Sends one request, retrying only on transport failures. Any HTTP
    /// response, whatever its status, ends the loop on the spot.
    pub async fn send(&self, url: &str, method: HttpMethod) -> RequestOutcome {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            let request = self.client.request(Self::to_reqwest_method(method), url);

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    let message = error_chain(&e);
                    if !is_retryable(&message) {
                        return RequestOutcome::error(RequestError::Transport(message));
                    }
                    if attempt >= max_retries {
                        return RequestOutcome::error(RequestError::RetriesExhausted {
                            retries: max_retries,
                            last: message,
                            source: e,
                        });
                    }

                    attempt += 1;
                    let backoff = self.config.backoff_unit * attempt;
                    debug!(
                        "Transport error on {} (attempt {}/{}), retrying in {:?}: {}",
                        url,
                        attempt,
                        max_retries + 1,
                        backoff,
                        message
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            };

            let status = response.status().as_u16();
            return match response.text().await {
                Ok(body) => RequestOutcome::new(status, body),
                Err(e) => RequestOutcome::error(RequestError::Body(error_chain(&e))),
            };
        }
    }

    fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
            HttpMethod::Connect => Method::CONNECT,
            HttpMethod::Trace => Method::TRACE,
        }
    }
}

pub fn is_retryable(message: &str) -> bool {
    let lower = message.to_lowercase();
    RETRYABLE_PATTERNS.iter().any(|p| lower.contains(p))
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !parts.contains(&text) {
            parts.push(text);
        }
        source = inner.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_patterns() {
        assert!(is_retryable(
            "error sending request: tcp connect error: Connection refused (os error 111)"
        ));
        assert!(is_retryable("operation timed out"));
        assert!(is_retryable(
            "dns error: failed to lookup address information: Temporary failure in name resolution"
        ));
        assert!(is_retryable("Broken pipe (os error 32)"));
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!is_retryable("builder error: relative URL without a base"));
        assert!(!is_retryable("invalid certificate: UnknownIssuer"));
    }

    #[test]
    fn test_error_chain_deduplicates() {
        let inner =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let chain = error_chain(&inner);
        assert_eq!(chain, "connection refused");
    }

    #[test]
    fn test_default_config() {
        let config = RequesterConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.backoff_unit, Duration::from_secs(1));
    }

    #[test]
    fn test_user_agent_is_versioned() {
        assert!(USER_AGENT.starts_with("xsspect/"));
    }
}
