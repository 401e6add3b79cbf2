mod chrome;
mod driver;
mod verifier;

pub use chrome::{BrowserConfig, ChromeDriver, ChromeLauncher};
pub use driver::{BrowserDriver, Navigation, SessionLauncher};
pub use verifier::{BrowserVerifier, Detection, VerifierConfig};
