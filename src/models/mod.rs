mod config;
mod method;
mod result;
mod verdict;

pub use config::ScanConfig;
pub use method::HttpMethod;
pub use result::{RequestOutcome, ScanReport, Trial};
pub use verdict::{ReflectionVerdict, Severity, TriggerKind};
