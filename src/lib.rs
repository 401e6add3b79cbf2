pub mod analyzer;
pub mod browser;
pub mod cli;
pub mod error;
pub mod http;
pub mod models;
pub mod payload;
pub mod reporter;
pub mod scanner;

pub use analyzer::ReflectionAnalyzer;
pub use browser::{BrowserVerifier, ChromeLauncher, Detection};
pub use error::{BrowserError, ConfigError, RequestError};
pub use models::{
    HttpMethod, ReflectionVerdict, ScanConfig, ScanReport, Severity, Trial, TriggerKind,
};
pub use reporter::{ConsoleReporter, CsvExporter, JsonExporter, TextExporter};
pub use scanner::Scanner;
