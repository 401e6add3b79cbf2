use url::Url;

use super::HttpMethod;
use crate::error::ConfigError;
use crate::http::validate_url;
use crate::payload::PayloadSource;

/// Fully validated scan configuration. Building one performs every check
/// that must pass before any network activity starts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: Url,
    pub method: HttpMethod,
    pub parameters: Vec<String>,
    pub payload_source: PayloadSource,
    pub stop_on_hit: bool,
    pub show_all: bool,
    pub browser_verify: bool,
}

impl ScanConfig {
    pub fn new(
        url: &str,
        method: &str,
        params: &str,
        payload: Option<String>,
        payload_file: Option<std::path::PathBuf>,
    ) -> Result<Self, ConfigError> {
        let target = validate_url(url)?;
        let method = HttpMethod::validate(method)?;
        let parameters = Self::parse_params(params);
        if parameters.is_empty() {
            return Err(ConfigError::NoParameters);
        }
        let payload_source = PayloadSource::from_options(payload, payload_file)?;

        Ok(Self {
            target,
            method,
            parameters,
            payload_source,
            stop_on_hit: false,
            show_all: false,
            browser_verify: false,
        })
    }

    pub fn with_stop_on_hit(mut self, stop_on_hit: bool) -> Self {
        self.stop_on_hit = stop_on_hit;
        self
    }

    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    pub fn with_browser_verify(mut self, browser_verify: bool) -> Self {
        self.browser_verify = browser_verify;
        self
    }

    fn parse_params(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    }
}
