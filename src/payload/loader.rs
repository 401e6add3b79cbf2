use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::PayloadCorpus;
use crate::error::ConfigError;

const COMMENT_PREFIXES: &[&str] = &["#", "//"];

/// Where the payloads for a scan come from. Exactly one source is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    Literal(String),
    File(PathBuf),
    BuiltIn,
}

impl PayloadSource {
    pub fn from_options(
        literal: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        match (literal, file) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingPayloadSources),
            (Some(payload), None) if !payload.is_empty() => Ok(PayloadSource::Literal(payload)),
            (_, Some(path)) => {
                if !has_txt_extension(&path) {
                    return Err(ConfigError::UnsupportedPayloadFile(path));
                }
                Ok(PayloadSource::File(path))
            }
            _ => Ok(PayloadSource::BuiltIn),
        }
    }

    pub fn load(&self) -> Result<Vec<String>, ConfigError> {
        match self {
            PayloadSource::Literal(payload) => Ok(vec![payload.clone()]),
            PayloadSource::File(path) => load_payload_file(path),
            PayloadSource::BuiltIn => Ok(PayloadCorpus::all()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PayloadSource::Literal(payload) => format!("custom payload only: {}", payload),
            PayloadSource::File(path) => format!("payload file: {}", path.display()),
            PayloadSource::BuiltIn => "built-in corpus".to_string(),
        }
    }
}

pub fn load_payload_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    if !has_txt_extension(path) {
        return Err(ConfigError::UnsupportedPayloadFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::PayloadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let payloads = parse_payloads(&content);
    if payloads.is_empty() {
        return Err(ConfigError::EmptyPayloadFile(path.to_path_buf()));
    }

    debug!("Loaded {} payloads from {}", payloads.len(), path.display());
    Ok(payloads)
}

pub fn parse_payloads(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !COMMENT_PREFIXES.iter().any(|p| line.starts_with(p)))
        .map(String::from)
        .collect()
}

fn has_txt_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content =
            "# heading\n\n<script>alert(1)</script>\n  // note\n  <svg onload=alert(1)>  \n";
        let payloads = parse_payloads(content);
        assert_eq!(
            payloads,
            vec!["<script>alert(1)</script>", "<svg onload=alert(1)>"]
        );
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "<b>one</b>").unwrap();
        writeln!(file, "<i>two</i>").unwrap();

        let payloads = load_payload_file(file.path()).unwrap();
        assert_eq!(payloads, vec!["<b>one</b>", "<i>two</i>"]);
    }

    #[test]
    fn test_empty_file_is_error() {
        let mut file = tempfile::Builder::new().suffix(".TXT").tempfile().unwrap();
        writeln!(file, "# only comments").unwrap();

        let result = load_payload_file(file.path());
        assert!(matches!(result, Err(ConfigError::EmptyPayloadFile(_))));
    }

    #[test]
    fn test_rejects_non_txt_extension() {
        let result = PayloadSource::from_options(None, Some("payloads.json".into()));
        assert!(matches!(result, Err(ConfigError::UnsupportedPayloadFile(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = load_payload_file(Path::new("/nonexistent/payloads.txt"));
        assert!(matches!(result, Err(ConfigError::PayloadFile { .. })));
    }

    #[test]
    fn test_source_selection() {
        assert_eq!(
            PayloadSource::from_options(Some("<x>".to_string()), None).unwrap(),
            PayloadSource::Literal("<x>".to_string())
        );
        assert_eq!(
            PayloadSource::from_options(None, None).unwrap(),
            PayloadSource::BuiltIn
        );
        assert_eq!(
            PayloadSource::Literal("<x>".to_string()).load().unwrap(),
            vec!["<x>"]
        );
        assert!(!PayloadSource::BuiltIn.load().unwrap().is_empty());
    }
}
