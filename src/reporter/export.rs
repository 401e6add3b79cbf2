use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

use crate::models::{ScanReport, Severity};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CSV_HEADER: [&str; 9] = [
    "Timestamp",
    "Target_URL",
    "HTTP_Method",
    "Parameter",
    "Payload",
    "Reflection_Type",
    "Browser_Verified",
    "XSS_Event_Type",
    "Severity",
];

pub struct JsonExporter;

impl JsonExporter {
    pub fn export(report: &ScanReport, path: &str) -> Result<()> {
        ensure_parent(path)?;
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json).with_context(|| format!("Failed to write to {}", path))?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<ScanReport> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))?;

        let report = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a saved scan report", path))?;
        Ok(report)
    }
}

pub struct TextExporter;

impl TextExporter {
    pub fn export(report: &ScanReport, path: &str) -> Result<()> {
        ensure_parent(path)?;
        let text = Self::render(report)?;
        fs::write(path, text).with_context(|| format!("Failed to write to {}", path))?;
        Ok(())
    }

    pub fn render(report: &ScanReport) -> Result<String> {
        let mut tera = Tera::default();
        tera.add_raw_template("report.txt", TEXT_TEMPLATE)?;

        let (risk, risk_text) = Self::risk_assessment(report);

        let mut context = TeraContext::new();
        context.insert("target", &report.target);
        context.insert("method", &report.method.to_string());
        context.insert("parameters", &report.parameters.join(", "));
        context.insert("payload_count", &report.payload_count);
        context.insert("started_at", &report.started_at.format(TIMESTAMP_FORMAT).to_string());
        context.insert("finished_at", &report.finished_at.format(TIMESTAMP_FORMAT).to_string());
        context.insert("duration", &report.duration_secs());
        context.insert("browser_verification", &report.browser_verification);
        context.insert("raw_count", &report.raw_count);
        context.insert("verified_count", &report.verified_count);
        context.insert("escaped_count", &report.escaped_count);
        context.insert("risk", risk);
        context.insert("risk_text", risk_text);

        let findings: Vec<FindingRow> = report
            .raw_trials()
            .enumerate()
            .map(|(i, trial)| FindingRow {
                number: i + 1,
                parameter: trial.parameter.clone(),
                payload: trial.payload.clone(),
                status: match trial.trigger_kind {
                    Some(kind) if trial.browser_verified => {
                        format!("VERIFIED ({}() executed in browser)", kind)
                    }
                    _ => "RAW REFLECTION (Static Analysis)".to_string(),
                },
                severity: trial.severity().to_string().to_uppercase(),
            })
            .collect();
        context.insert("findings", &findings);

        Ok(tera.render("report.txt", &context)?)
    }

    fn risk_assessment(report: &ScanReport) -> (&'static str, &'static str) {
        match report.max_severity() {
            Severity::Critical => (
                "CRITICAL",
                "The application is vulnerable to XSS attacks. Browser verification confirmed \
                 that\nmalicious scripts can be executed in the user's browser.",
            ),
            Severity::High => (
                "HIGH",
                "The application reflects user input without proper sanitization.\n\
                 This may lead to XSS vulnerabilities.",
            ),
            Severity::Low => (
                "LOW",
                "The application properly escapes user input in most cases.",
            ),
            Severity::Info => (
                "INFO",
                "No reflections detected. The application may be secure against reflected XSS.",
            ),
        }
    }
}

pub struct CsvExporter;

impl CsvExporter {
    pub fn export(report: &ScanReport, path: &str) -> Result<()> {
        ensure_parent(path)?;
        let file = fs::File::create(path).with_context(|| format!("Failed to create {}", path))?;
        Self::write(report, file)
    }

    pub fn write<W: std::io::Write>(report: &ScanReport, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(CSV_HEADER).context("Failed to write CSV header")?;

        let timestamp = report.finished_at.format(TIMESTAMP_FORMAT).to_string();
        let method = report.method.to_string();

        for trial in &report.trials {
            let verdict = trial.verdict.to_string();
            let verified = if trial.browser_verified { "Yes" } else { "No" };
            let event = trial.trigger_kind.map(|k| k.to_string()).unwrap_or_default();
            let severity = trial.severity().to_string();

            writer
                .write_record([
                    timestamp.as_str(),
                    report.target.as_str(),
                    method.as_str(),
                    trial.parameter.as_str(),
                    trial.payload.as_str(),
                    verdict.as_str(),
                    verified,
                    event.as_str(),
                    severity.as_str(),
                ])
                .context("Failed to write CSV row")?;
        }

        writer.flush().context("Failed to flush CSV report")?;
        Ok(())
    }
}

fn ensure_parent(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct FindingRow {
    number: usize,
    parameter: String,
    payload: String,
    status: String,
    severity: String,
}

const TEXT_TEMPLATE: &str = r#"================================================================================
                         XSSpect Security Report
================================================================================
SCAN DETAILS
------------
Target URL: {{ target }}
HTTP Method: {{ method }}
Parameters Tested: {{ parameters }}
Total Payloads: {{ payload_count }}
Scan Start: {{ started_at }}
Scan End: {{ finished_at }}
Duration: {{ duration }}s
Browser Verification: {{ browser_verification }}

RESULTS SUMMARY
---------------
RAW XSS Found: {{ raw_count }}
Browser Verified: {{ verified_count }}
Escaped Reflections: {{ escaped_count }}

RISK ASSESSMENT
---------------
Severity: {{ risk }}
{{ risk_text }}

{% if findings %}VULNERABILITIES FOUND
---------------------
{% for finding in findings %}
[{{ finding.number }}] Parameter: {{ finding.parameter }}
    Payload: {{ finding.payload }}
    Status: {{ finding.status }}
    Severity: {{ finding.severity }}
{% endfor %}{% else %}No XSS vulnerabilities found.
{% endif %}

REMEDIATION RECOMMENDATIONS
---------------------------
1. Implement proper output encoding based on context (HTML, JavaScript, URL, CSS)
2. Use Content Security Policy (CSP) headers
3. Validate and sanitize all user inputs on the server-side
4. Use HTTPOnly and Secure flags for cookies
5. Consider using a Web Application Firewall (WAF)


================================================================================
                              End of Report
================================================================================
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::{HttpMethod, ReflectionVerdict, Trial, TriggerKind};

    fn sample_report() -> ScanReport {
        let now = Utc::now();
        ScanReport::from_trials(
            "https://x.test/s?q=1".to_string(),
            HttpMethod::Get,
            vec!["q".to_string()],
            3,
            now,
            now,
            true,
            vec![
                Trial::new("q", "<script>alert(1)</script>", ReflectionVerdict::RawReflection)
                    .verified(TriggerKind::Alert),
                Trial::new("q", "\"><img src=x>", ReflectionVerdict::EscapedReflection),
                Trial::new("q", "a,b", ReflectionVerdict::NoReflection),
            ],
        )
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.json");
        let path = path.to_str().unwrap();

        let report = sample_report();
        JsonExporter::export(&report, path).unwrap();
        let loaded = JsonExporter::load(path).unwrap();

        assert_eq!(loaded.trials, report.trials);
        assert_eq!(loaded.verified_count, 1);
    }

    #[test]
    fn test_load_rejects_other_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");
        fs::write(&path, "{\"results\": []}").unwrap();

        assert!(JsonExporter::load(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_text_report_sections() {
        let text = TextExporter::render(&sample_report()).unwrap();

        assert!(text.contains("Target URL: https://x.test/s?q=1"));
        assert!(text.contains("Severity: CRITICAL"));
        assert!(text.contains("[1] Parameter: q"));
        assert!(text.contains("Payload: <script>alert(1)</script>"));
        assert!(text.contains("VERIFIED (alert() executed in browser)"));
        assert!(text.contains("REMEDIATION RECOMMENDATIONS"));
    }

    #[test]
    fn test_text_report_without_findings() {
        let now = Utc::now();
        let report = ScanReport::from_trials(
            "https://x.test/".to_string(),
            HttpMethod::Get,
            vec!["q".to_string()],
            1,
            now,
            now,
            false,
            vec![Trial::new("q", "x", ReflectionVerdict::NoReflection)],
        );
        let text = TextExporter::render(&report).unwrap();

        assert!(text.contains("Severity: INFO"));
        assert!(text.contains("No XSS vulnerabilities found."));
    }

    #[test]
    fn test_csv_rows() {
        let mut out = Vec::new();
        CsvExporter::write(&sample_report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert!(lines[1].ends_with(",RAW_REFLECTION,Yes,alert,Critical"));
        assert!(lines[2].contains("\"\"\"><img src=x>\""));
        assert!(lines[3].contains("\"a,b\""));
        assert!(lines[3].ends_with(",NO_REFLECTION,No,,Info"));
    }
}
