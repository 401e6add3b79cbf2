use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HttpMethod, ReflectionVerdict, Severity, TriggerKind};
use crate::error::RequestError;

#[derive(Debug)]
pub struct RequestOutcome {
    pub status: u16,
    pub body: String,
    pub error: Option<RequestError>,
}

impl RequestOutcome {
    pub fn new(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            error: None,
        }
    }

    pub fn error(err: RequestError) -> Self {
        Self {
            status: 0,
            body: String::new(),
            error: Some(err),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub parameter: String,
    pub payload: String,
    pub verdict: ReflectionVerdict,
    pub browser_verified: bool,
    pub trigger_kind: Option<TriggerKind>,
}

impl Trial {
    pub fn new(parameter: &str, payload: &str, verdict: ReflectionVerdict) -> Self {
        Self {
            parameter: parameter.to_string(),
            payload: payload.to_string(),
            verdict,
            browser_verified: false,
            trigger_kind: None,
        }
    }

    /// Marks the trial as confirmed in a browser. Only raw reflections can be
    /// verified; any other verdict leaves the trial untouched.
    pub fn verified(mut self, kind: TriggerKind) -> Self {
        if self.verdict.is_raw() {
            self.browser_verified = true;
            self.trigger_kind = Some(kind);
        }
        self
    }

    pub fn severity(&self) -> Severity {
        match self.verdict {
            ReflectionVerdict::RawReflection if self.browser_verified => Severity::Critical,
            ReflectionVerdict::RawReflection => Severity::High,
            ReflectionVerdict::EscapedReflection => Severity::Low,
            ReflectionVerdict::NoReflection => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: String,
    pub method: HttpMethod,
    pub parameters: Vec<String>,
    pub payload_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub browser_verification: bool,
    pub trials: Vec<Trial>,
    pub raw_count: usize,
    pub escaped_count: usize,
    pub verified_count: usize,
}

impl ScanReport {
    #[allow(clippy::too_many_arguments)]
    pub fn from_trials(
        target: String,
        method: HttpMethod,
        parameters: Vec<String>,
        payload_count: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        browser_verification: bool,
        trials: Vec<Trial>,
    ) -> Self {
        let mut report = Self {
            target,
            method,
            parameters,
            payload_count,
            started_at,
            finished_at,
            browser_verification,
            trials: Vec::new(),
            raw_count: 0,
            escaped_count: 0,
            verified_count: 0,
        };

        for trial in &trials {
            match trial.verdict {
                ReflectionVerdict::RawReflection => {
                    report.raw_count += 1;
                    if trial.browser_verified {
                        report.verified_count += 1;
                    }
                }
                ReflectionVerdict::EscapedReflection => report.escaped_count += 1,
                ReflectionVerdict::NoReflection => {}
            }
        }

        report.trials = trials;
        report
    }

    pub fn max_severity(&self) -> Severity {
        self.trials
            .iter()
            .map(Trial::severity)
            .max_by_key(|s| s.numeric_value())
            .unwrap_or(Severity::Info)
    }

    pub fn raw_trials(&self) -> impl Iterator<Item = &Trial> {
        self.trials.iter().filter(|t| t.verdict.is_raw())
    }

    pub fn duration_secs(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}
