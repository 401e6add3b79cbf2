use std::sync::Arc;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::analyzer::ReflectionAnalyzer;
use crate::browser::{BrowserVerifier, SessionLauncher, VerifierConfig};
use crate::error::BrowserError;
use crate::http::{Requester, inject_query_param};
use crate::models::{ScanConfig, ScanReport, Trial, TriggerKind};
use crate::reporter::{ConsoleReporter, ParameterTally};

/// Runs every (parameter, payload) trial in order, one request and at most
/// one browser session at a time.
pub struct Scanner<L: SessionLauncher> {
    requester: Requester,
    config: ScanConfig,
    launcher: Option<Arc<L>>,
    verifier_config: VerifierConfig,
    reporter: ConsoleReporter,
    show_progress: bool,
    static_only: bool,
}

impl<L: SessionLauncher> Scanner<L> {
    pub fn new(requester: Requester, config: ScanConfig, launcher: Option<L>) -> Self {
        let static_only = !config.browser_verify || launcher.is_none();
        Self {
            requester,
            config,
            launcher: launcher.map(Arc::new),
            verifier_config: VerifierConfig::default(),
            reporter: ConsoleReporter::new(),
            show_progress: false,
            static_only,
        }
    }

    pub fn with_verifier_config(mut self, verifier_config: VerifierConfig) -> Self {
        self.verifier_config = verifier_config;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// True once verification is off for the rest of the scan, either by
    /// configuration or because the browser could not be started.
    pub fn is_static_only(&self) -> bool {
        self.static_only
    }

    pub async fn scan(&mut self, payloads: &[String]) -> ScanReport {
        let started_at = Utc::now();
        let parameters = self.config.parameters.clone();
        let mut trials = Vec::new();

        info!(
            "Scanning {} with {} parameter(s) and {} payload(s)",
            self.config.target,
            parameters.len(),
            payloads.len()
        );

        for parameter in &parameters {
            self.scan_parameter(parameter, payloads, &mut trials).await;
        }

        ScanReport::from_trials(
            self.config.target.to_string(),
            self.config.method,
            parameters,
            payloads.len(),
            started_at,
            Utc::now(),
            self.config.browser_verify && !self.static_only,
            trials,
        )
    }

    async fn scan_parameter(
        &mut self,
        parameter: &str,
        payloads: &[String],
        trials: &mut Vec<Trial>,
    ) {
        let pb = self.create_progress_bar(payloads.len(), parameter);
        let mut session: Option<BrowserVerifier<L::Driver>> = None;
        let mut tally = ParameterTally::default();

        for payload in payloads {
            let url = inject_query_param(&self.config.target, parameter, payload);
            let outcome = self.requester.send(url.as_str(), self.config.method).await;
            pb.inc(1);

            if let Some(err) = &outcome.error {
                debug!("Skipping {}={:?}: {}", parameter, payload, err);
                continue;
            }

            let classification = ReflectionAnalyzer::classify(&outcome.body, payload, parameter);
            let mut trial = Trial::new(parameter, payload, classification.verdict);

            if trial.verdict.is_raw() {
                debug!("Raw reflection of {:?} near {:?}", payload, classification.snippet);
                if let Some(kind) = self.verify(&mut session, url.as_str()).await {
                    trial = trial.verified(kind);
                }
            }

            tally.record(&trial);
            pb.suspend(|| {
                self.reporter
                    .print_trial(&trial, self.config.browser_verify, self.config.show_all)
            });

            let hit = trial.verdict.is_raw();
            trials.push(trial);

            if hit && self.config.stop_on_hit {
                pb.suspend(|| self.reporter.print_stop(parameter));
                break;
            }
        }

        pb.finish_and_clear();
        if let Some(verifier) = session {
            Self::close_session(verifier).await;
        }

        self.reporter
            .print_parameter_summary(parameter, &tally, self.config.browser_verify);
    }

    /// Verifies one raw hit in the parameter's session, launching it first if
    /// needed. A session whose connection dropped is replaced once.
    async fn verify(
        &mut self,
        session: &mut Option<BrowserVerifier<L::Driver>>,
        url: &str,
    ) -> Option<TriggerKind> {
        for relaunch in [false, true] {
            if session.is_none() {
                *session = self.start_session().await;
            }
            let verifier = session.take()?;

            let target = url.to_string();
            let (verifier, result) = match tokio::task::spawn_blocking(move || {
                let mut verifier = verifier;
                let result = verifier.verify_with_retry(&target);
                (verifier, result)
            })
            .await
            {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Browser verification task failed for {}: {}", url, e);
                    return None;
                }
            };

            match result {
                Ok(detection) => {
                    *session = Some(verifier);
                    return detection.trigger_kind();
                }
                Err(e) if e.is_disconnected() && !relaunch => {
                    info!("Browser session lost, relaunching: {}", e);
                    Self::close_session(verifier).await;
                }
                Err(e) => {
                    warn!("Browser verification failed for {}: {}", url, e);
                    if e.is_disconnected() {
                        Self::close_session(verifier).await;
                    } else {
                        *session = Some(verifier);
                    }
                    return None;
                }
            }
        }
        None
    }

    async fn start_session(&mut self) -> Option<BrowserVerifier<L::Driver>> {
        if self.static_only {
            return None;
        }
        let launcher = Arc::clone(self.launcher.as_ref()?);

        let launched = tokio::task::spawn_blocking(move || launcher.launch())
            .await
            .unwrap_or_else(|e| Err(BrowserError::Launch(e.to_string())));

        match launched {
            Ok(driver) => Some(BrowserVerifier::new(driver, self.verifier_config.clone())),
            Err(e) => {
                warn!(
                    "Browser verification disabled, continuing with static analysis only: {}",
                    e
                );
                self.static_only = true;
                None
            }
        }
    }

    async fn close_session(verifier: BrowserVerifier<L::Driver>) {
        let closed = tokio::task::spawn_blocking(move || {
            let mut verifier = verifier;
            verifier.close();
        })
        .await;
        if let Err(e) = closed {
            debug!("Browser shutdown task failed: {}", e);
        }
    }

    fn create_progress_bar(&self, total: usize, parameter: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("param '{}'", parameter));
        pb
    }
}
