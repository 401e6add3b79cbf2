use std::time::Duration;

use serde_json::Value;

use crate::error::BrowserError;
use crate::models::TriggerKind;

/// How a timed page load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Loaded,
    TimedOut,
    BlockedByDialog(TriggerKind),
}

/// Remote control over one browser page. Implementations own the browser
/// process and must release it in `quit`, which may be called repeatedly.
/// Calls block, so callers run them off the async executor.
pub trait BrowserDriver: Send {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<Navigation, BrowserError>;

    /// Structured "modal present" query: the kind of dialog currently open.
    fn open_dialog(&mut self) -> Result<Option<TriggerKind>, BrowserError>;

    fn dismiss_dialog(&mut self) -> Result<(), BrowserError>;

    fn execute(&mut self, script: &str) -> Result<Value, BrowserError>;

    fn quit(&mut self);
}

/// Starts a fresh browser session on demand.
pub trait SessionLauncher: Send + Sync + 'static {
    type Driver: BrowserDriver + 'static;

    fn launch(&self) -> Result<Self::Driver, BrowserError>;
}
