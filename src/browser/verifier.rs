use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::driver::{BrowserDriver, Navigation};
use crate::error::BrowserError;
use crate::models::TriggerKind;

/// Replaces the dialog globals with recorders so dialogs fired after load
/// leave a trace instead of blocking the page.
const HOOK_SCRIPT: &str = r#"
window.__xsspect_triggered = false;
window.__xsspect_kind = '';
window.alert = function () {
    window.__xsspect_triggered = true;
    window.__xsspect_kind = 'alert';
    return true;
};
window.confirm = function () {
    window.__xsspect_triggered = true;
    window.__xsspect_kind = 'confirm';
    return true;
};
window.prompt = function () {
    window.__xsspect_triggered = true;
    window.__xsspect_kind = 'prompt';
    return null;
};
true;
"#;

const READ_TRIGGERED: &str = "window.__xsspect_triggered === true";
const READ_KIND: &str = "window.__xsspect_kind || ''";

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub page_load_timeout: Duration,
    pub settle: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            page_load_timeout: Duration::from_secs(10),
            settle: Duration::from_millis(500),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// How a verification resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// A dialog opened before the page finished loading.
    NavigationBlocked(TriggerKind),
    /// A dialog fired after load, seen by the hook or as an open modal.
    HookDetected(TriggerKind),
    NoDialog,
}

impl Detection {
    pub fn triggered(&self) -> bool {
        !matches!(self, Detection::NoDialog)
    }

    pub fn trigger_kind(&self) -> Option<TriggerKind> {
        match self {
            Detection::NavigationBlocked(kind) | Detection::HookDetected(kind) => Some(*kind),
            Detection::NoDialog => None,
        }
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Navigating,
    DialogDetected { kind: TriggerKind, during_load: bool },
    ScriptHookRunning,
    Resolved(Detection),
}

/// Owns one browser session for the lifetime of a parameter's trials. The
/// session is released on `close` or when the verifier is dropped. Every
/// method blocks on the browser and belongs on a blocking thread.
pub struct BrowserVerifier<D: BrowserDriver> {
    driver: D,
    config: VerifierConfig,
    closed: bool,
}

impl<D: BrowserDriver> BrowserVerifier<D> {
    pub fn new(driver: D, config: VerifierConfig) -> Self {
        Self {
            driver,
            config,
            closed: false,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn verify(&mut self, url: &str) -> Result<Detection, BrowserError> {
        if self.closed {
            return Err(BrowserError::NotStarted);
        }

        let mut state = State::Idle;
        loop {
            state = match state {
                State::Idle => State::Navigating,
                State::Navigating => {
                    match self.driver.navigate(url, self.config.page_load_timeout)? {
                        Navigation::BlockedByDialog(kind) => State::DialogDetected {
                            kind,
                            during_load: true,
                        },
                        Navigation::Loaded => State::ScriptHookRunning,
                        Navigation::TimedOut => {
                            debug!("Page load timed out, injecting dialog hook anyway: {}", url);
                            State::ScriptHookRunning
                        }
                    }
                }
                State::DialogDetected { kind, during_load } => {
                    if let Err(e) = self.driver.dismiss_dialog() {
                        warn!("Could not dismiss {} dialog: {}", kind, e);
                    }
                    State::Resolved(if during_load {
                        Detection::NavigationBlocked(kind)
                    } else {
                        Detection::HookDetected(kind)
                    })
                }
                State::ScriptHookRunning => self.run_hook()?,
                State::Resolved(detection) => return Ok(detection),
            };
        }
    }

    pub fn verify_with_retry(&mut self, url: &str) -> Result<Detection, BrowserError> {
        let max_retries = self.config.max_retries;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.verify(url) {
                Ok(detection) => return Ok(detection),
                Err(e) if e.is_disconnected() => return Err(e),
                Err(e) => {
                    debug!(
                        "Verification attempt {}/{} failed: {}",
                        attempt + 1,
                        max_retries + 1,
                        e
                    );
                    last_error = Some(e);
                    if attempt < max_retries {
                        thread::sleep(self.config.retry_delay);
                    }
                }
            }
        }

        Err(last_error.unwrap_or(BrowserError::NotStarted))
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.driver.quit();
            self.closed = true;
        }
    }

    fn run_hook(&mut self) -> Result<State, BrowserError> {
        if let Err(e) = self.driver.execute(HOOK_SCRIPT) {
            debug!("Dialog hook injection failed: {}", e);
            if let Some(kind) = self.driver.open_dialog()? {
                return Ok(State::DialogDetected {
                    kind,
                    during_load: false,
                });
            }
        }

        thread::sleep(self.config.settle);

        if let Some(kind) = self.driver.open_dialog()? {
            return Ok(State::DialogDetected {
                kind,
                during_load: false,
            });
        }

        let triggered = self
            .driver
            .execute(READ_TRIGGERED)?
            .as_bool()
            .unwrap_or(false);
        if !triggered {
            return Ok(State::Resolved(Detection::NoDialog));
        }

        let kind = self
            .driver
            .execute(READ_KIND)
            .ok()
            .and_then(|value| value.as_str().and_then(TriggerKind::parse))
            .unwrap_or(TriggerKind::Alert);
        Ok(State::Resolved(Detection::HookDetected(kind)))
    }
}

impl<D: BrowserDriver> Drop for BrowserVerifier<D> {
    fn drop(&mut self) {
        self.close();
    }
}
