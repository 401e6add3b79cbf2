use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use wiremock::{
    matchers::method,
    Mock, MockServer, Request, Respond, ResponseTemplate,
};
use xsspect::analyzer::escape_html;
use xsspect::browser::{BrowserDriver, Navigation, SessionLauncher, VerifierConfig};
use xsspect::error::BrowserError;
use xsspect::http::{Requester, RequesterConfig};
use xsspect::models::{ReflectionVerdict, ScanConfig, TriggerKind};
use xsspect::scanner::Scanner;

/// Echoes every query value into the page, raw when it contains "hit" and
/// entity-escaped otherwise.
struct Reflector;

impl Respond for Reflector {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: String = request
            .url
            .query_pairs()
            .map(|(_, value)| {
                if value.contains("hit") {
                    format!("<div>{}</div>", value)
                } else {
                    format!("<div>{}</div>", escape_html(&value))
                }
            })
            .collect();
        ResponseTemplate::new(200).set_body_string(format!("<html><body>{}</body></html>", body))
    }
}

struct DialogDriver {
    quits: Arc<AtomicUsize>,
    navigations_left: Option<usize>,
}

impl BrowserDriver for DialogDriver {
    fn navigate(&mut self, _url: &str, _timeout: Duration) -> Result<Navigation, BrowserError> {
        match self.navigations_left {
            Some(0) => {
                return Err(BrowserError::Disconnected(
                    "underlying connection is closed".to_string(),
                ));
            }
            Some(left) => self.navigations_left = Some(left - 1),
            None => {}
        }
        Ok(Navigation::BlockedByDialog(TriggerKind::Confirm))
    }

    fn open_dialog(&mut self) -> Result<Option<TriggerKind>, BrowserError> {
        Ok(None)
    }

    fn dismiss_dialog(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    fn execute(&mut self, _script: &str) -> Result<Value, BrowserError> {
        Ok(Value::Null)
    }

    fn quit(&mut self) {
        self.quits.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct MockLauncher {
    fail: bool,
    first_session_navigations: Option<usize>,
    launches: Arc<AtomicUsize>,
    quits: Arc<AtomicUsize>,
}

impl SessionLauncher for MockLauncher {
    type Driver = DialogDriver;

    fn launch(&self) -> Result<DialogDriver, BrowserError> {
        let previous = self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BrowserError::Launch("chrome not found".to_string()));
        }
        Ok(DialogDriver {
            quits: Arc::clone(&self.quits),
            navigations_left: if previous == 0 {
                self.first_session_navigations
            } else {
                None
            },
        })
    }
}

fn requester() -> Requester {
    Requester::new(RequesterConfig {
        timeout: Duration::from_secs(5),
        max_retries: 0,
        backoff_unit: Duration::from_millis(10),
    })
    .unwrap()
}

fn payloads() -> Vec<String> {
    vec![
        "<b>one</b>".to_string(),
        "<i>hit</i>".to_string(),
        "<u>three</u>".to_string(),
    ]
}

fn fast_verifier() -> VerifierConfig {
    VerifierConfig {
        page_load_timeout: Duration::from_secs(1),
        settle: Duration::ZERO,
        max_retries: 1,
        retry_delay: Duration::ZERO,
    }
}

async fn reflecting_server() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(Reflector)
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_all_trials_run_in_order() {
    let mock_server = reflecting_server().await;
    let config = ScanConfig::new(&mock_server.uri(), "GET", "q,name", None, None).unwrap();

    let mut scanner: Scanner<MockLauncher> = Scanner::new(requester(), config, None);
    let report = scanner.scan(&payloads()).await;

    let order: Vec<(&str, &str)> = report
        .trials
        .iter()
        .map(|t| (t.parameter.as_str(), t.payload.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("q", "<b>one</b>"),
            ("q", "<i>hit</i>"),
            ("q", "<u>three</u>"),
            ("name", "<b>one</b>"),
            ("name", "<i>hit</i>"),
            ("name", "<u>three</u>"),
        ]
    );
    assert_eq!(report.trials[0].verdict, ReflectionVerdict::EscapedReflection);
    assert_eq!(report.trials[1].verdict, ReflectionVerdict::RawReflection);
    assert_eq!(report.raw_count, 2);
    assert_eq!(report.escaped_count, 4);
    assert!(!report.browser_verification);
}

#[tokio::test]
async fn test_stop_on_hit_skips_rest_of_parameter() {
    let mock_server = reflecting_server().await;
    let config = ScanConfig::new(&mock_server.uri(), "GET", "q,name", None, None)
        .unwrap()
        .with_stop_on_hit(true);

    let mut scanner: Scanner<MockLauncher> = Scanner::new(requester(), config, None);
    let report = scanner.scan(&payloads()).await;

    assert_eq!(report.trials.len(), 4);
    assert!(report.trials.iter().all(|t| t.payload != "<u>three</u>"));
    assert_eq!(report.trials[2].parameter, "name");

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 4);
}

#[tokio::test]
async fn test_raw_hits_are_verified_in_browser() {
    let mock_server = reflecting_server().await;
    let config = ScanConfig::new(&mock_server.uri(), "GET", "q,name", None, None)
        .unwrap()
        .with_browser_verify(true);

    let launcher = MockLauncher::default();
    let launches = Arc::clone(&launcher.launches);
    let quits = Arc::clone(&launcher.quits);

    let mut scanner = Scanner::new(requester(), config, Some(launcher))
        .with_verifier_config(fast_verifier());
    let report = scanner.scan(&payloads()).await;

    let raw: Vec<_> = report.raw_trials().collect();
    assert_eq!(raw.len(), 2);
    assert!(raw.iter().all(|t| t.browser_verified));
    assert!(raw.iter().all(|t| t.trigger_kind == Some(TriggerKind::Confirm)));
    assert_eq!(report.verified_count, 2);
    assert!(report.browser_verification);

    // One session per parameter, released when its loop ends.
    assert_eq!(launches.load(Ordering::SeqCst), 2);
    assert_eq!(quits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_lost_session_is_relaunched() {
    let mock_server = reflecting_server().await;
    let config = ScanConfig::new(&mock_server.uri(), "GET", "q", None, None)
        .unwrap()
        .with_browser_verify(true);

    let launcher = MockLauncher {
        first_session_navigations: Some(1),
        ..Default::default()
    };
    let launches = Arc::clone(&launcher.launches);
    let quits = Arc::clone(&launcher.quits);

    let mut scanner = Scanner::new(requester(), config, Some(launcher))
        .with_verifier_config(fast_verifier());
    let payloads = vec![
        "<i>hit one</i>".to_string(),
        "<b>quiet</b>".to_string(),
        "<i>hit two</i>".to_string(),
    ];
    let report = scanner.scan(&payloads).await;

    let raw: Vec<_> = report.raw_trials().collect();
    assert_eq!(raw.len(), 2);
    assert!(raw.iter().all(|t| t.browser_verified));
    assert!(!scanner.is_static_only());
    assert_eq!(launches.load(Ordering::SeqCst), 2);
    assert_eq!(quits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_launch_falls_back_to_static() {
    let mock_server = reflecting_server().await;
    let config = ScanConfig::new(&mock_server.uri(), "GET", "q,name", None, None)
        .unwrap()
        .with_browser_verify(true);

    let launcher = MockLauncher {
        fail: true,
        ..Default::default()
    };
    let launches = Arc::clone(&launcher.launches);

    let mut scanner = Scanner::new(requester(), config, Some(launcher))
        .with_verifier_config(fast_verifier());
    let report = scanner.scan(&payloads()).await;

    assert!(scanner.is_static_only());
    assert_eq!(launches.load(Ordering::SeqCst), 1);
    assert_eq!(report.raw_count, 2);
    assert_eq!(report.verified_count, 0);
    assert!(report.raw_trials().all(|t| !t.browser_verified));
    assert!(!report.browser_verification);
}

#[tokio::test]
async fn test_transport_failures_are_skipped() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let target = format!("http://127.0.0.1:{}/search", port);
    let config = ScanConfig::new(&target, "GET", "q", None, None).unwrap();

    let mut scanner: Scanner<MockLauncher> = Scanner::new(requester(), config, None);
    let report = scanner.scan(&payloads()).await;

    assert!(report.trials.is_empty());
    assert_eq!(report.payload_count, 3);
    assert_eq!(report.parameters, vec!["q".to_string()]);
}
