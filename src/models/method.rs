use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
        };
        write!(f, "{}", s)
    }
}

impl HttpMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            "CONNECT" => Some(HttpMethod::Connect),
            "TRACE" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    pub fn validate(s: &str) -> Result<Self, ConfigError> {
        Self::parse(s).ok_or_else(|| ConfigError::InvalidMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("Trace"), Some(HttpMethod::Trace));
        assert_eq!(HttpMethod::parse(" post "), Some(HttpMethod::Post));
    }

    #[test]
    fn test_validate_rejects_unknown_verb() {
        let err = HttpMethod::validate("FETCH").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMethod(ref m) if m == "FETCH"));
    }

    #[test]
    fn test_display_round_trips() {
        for method in [HttpMethod::Get, HttpMethod::Connect, HttpMethod::Options] {
            assert_eq!(HttpMethod::parse(&method.to_string()), Some(method));
        }
    }
}
