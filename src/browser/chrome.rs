use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use headless_chrome::protocol::cdp::Page;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use tracing::{debug, info};

use super::driver::{BrowserDriver, Navigation, SessionLauncher};
use crate::error::BrowserError;
use crate::models::TriggerKind;

const CHROME_ARGS: &[&str] = &[
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-web-security",
];

const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "never came"];

/// Errors raised once the DevTools transport has shut down, e.g. after the
/// browser idle timeout elapsed.
const DISCONNECT_MARKERS: &[&str] = &[
    "connection is closed",
    "connection closed",
    "closed channel",
    "channel closed",
    "target closed",
    "no such target",
];

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub idle_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            idle_timeout: Duration::from_secs(1800),
        }
    }
}

pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl SessionLauncher for ChromeLauncher {
    type Driver = ChromeDriver;

    fn launch(&self) -> Result<ChromeDriver, BrowserError> {
        ChromeDriver::start(&self.config)
    }
}

type DialogSlot = Arc<Mutex<Option<TriggerKind>>>;

/// A headless Chrome process driven over the DevTools protocol with a single
/// tab. Dialog openings are captured from `Page.javascriptDialogOpening`.
pub struct ChromeDriver {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
    dialog: DialogSlot,
}

impl ChromeDriver {
    pub fn start(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let args: Vec<&OsStr> = CHROME_ARGS.iter().map(OsStr::new).collect();

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .path(config.chrome_path.clone())
            .idle_browser_timeout(config.idle_timeout)
            .args(args)
            .build()
            .map_err(|e| BrowserError::Launch(format!("launch options error: {}", e)))?;

        let browser = Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))?;
        let mut driver = Self {
            browser: Some(browser),
            tab: None,
            dialog: Arc::new(Mutex::new(None)),
        };

        let tab = driver
            .browser
            .as_ref()
            .ok_or(BrowserError::NotStarted)?
            .new_tab()
            .map_err(|e| BrowserError::Launch(format!("failed to open tab: {}", e)))?;

        let slot = Arc::clone(&driver.dialog);
        tab.add_event_listener(Arc::new(move |event: &Event| match event {
            Event::PageJavascriptDialogOpening(opening) => {
                let kind = serde_json::to_value(&opening.params)
                    .ok()
                    .and_then(|params| {
                        params
                            .get("type")
                            .and_then(Value::as_str)
                            .and_then(TriggerKind::parse)
                    })
                    .unwrap_or(TriggerKind::Alert);
                if let Ok(mut open) = slot.lock() {
                    *open = Some(kind);
                }
            }
            Event::PageJavascriptDialogClosed(_) => {
                if let Ok(mut open) = slot.lock() {
                    *open = None;
                }
            }
            _ => {}
        }))
        .map_err(|e| BrowserError::Launch(format!("failed to watch dialogs: {}", e)))?;

        driver.tab = Some(tab);
        info!("Headless browser started");
        Ok(driver)
    }

    fn tab(&self) -> Result<&Arc<Tab>, BrowserError> {
        self.tab.as_ref().ok_or(BrowserError::NotStarted)
    }

    fn current_dialog(&self) -> Option<TriggerKind> {
        self.dialog.lock().ok().and_then(|open| *open)
    }

    fn clear_dialog(&self) {
        if let Ok(mut open) = self.dialog.lock() {
            *open = None;
        }
    }
}

impl BrowserDriver for ChromeDriver {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<Navigation, BrowserError> {
        self.clear_dialog();
        let tab = self.tab()?;
        tab.set_default_timeout(timeout);

        let result = tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ());

        if let Some(kind) = self.current_dialog() {
            return Ok(Navigation::BlockedByDialog(kind));
        }

        match result {
            Ok(()) => Ok(Navigation::Loaded),
            Err(e) => {
                let message = e.to_string();
                if let Some(kind) = TriggerKind::from_blocked_navigation(&message) {
                    return Ok(Navigation::BlockedByDialog(kind));
                }
                let lower = message.to_lowercase();
                if TIMEOUT_MARKERS.iter().any(|m| lower.contains(m)) && !is_disconnect(&lower) {
                    debug!("Page load timed out for {}", url);
                    Ok(Navigation::TimedOut)
                } else {
                    Err(browser_error(message, BrowserError::Navigation))
                }
            }
        }
    }

    fn open_dialog(&mut self) -> Result<Option<TriggerKind>, BrowserError> {
        self.tab()?;
        Ok(self.current_dialog())
    }

    fn dismiss_dialog(&mut self) -> Result<(), BrowserError> {
        let tab = self.tab()?;
        tab.call_method(Page::HandleJavaScriptDialog {
            accept: false,
            prompt_text: None,
        })
        .map_err(|e| browser_error(e.to_string(), BrowserError::Dialog))?;
        self.clear_dialog();
        Ok(())
    }

    fn execute(&mut self, script: &str) -> Result<Value, BrowserError> {
        let tab = self.tab()?;
        let remote = tab
            .evaluate(script, false)
            .map_err(|e| browser_error(e.to_string(), BrowserError::Script))?;
        Ok(remote.value.unwrap_or(Value::Null))
    }

    fn quit(&mut self) {
        if let Some(tab) = self.tab.take() {
            if let Err(e) = tab.close(false) {
                debug!("Failed to close tab cleanly: {}", e);
            }
        }
        if self.browser.take().is_some() {
            info!("Headless browser stopped");
        }
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        self.quit();
    }
}

fn is_disconnect(lower: &str) -> bool {
    DISCONNECT_MARKERS.iter().any(|m| lower.contains(m))
}

fn browser_error(message: String, otherwise: fn(String) -> BrowserError) -> BrowserError {
    if is_disconnect(&message.to_lowercase()) {
        BrowserError::Disconnected(message)
    } else {
        otherwise(message)
    }
}
