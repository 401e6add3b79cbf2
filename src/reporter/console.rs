use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::models::{ReflectionVerdict, ScanReport, Severity, Trial};

pub struct ConsoleReporter;

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Parameter")]
    parameter: String,
    #[tabled(rename = "Trials")]
    trials: usize,
    #[tabled(rename = "Raw")]
    raw: usize,
    #[tabled(rename = "Verified")]
    verified: usize,
    #[tabled(rename = "Escaped")]
    escaped: usize,
    #[tabled(rename = "Status")]
    status: String,
}

/// Running counts for one parameter's trial loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParameterTally {
    pub raw: usize,
    pub verified: usize,
    pub escaped: usize,
}

impl ParameterTally {
    pub fn record(&mut self, trial: &Trial) {
        match trial.verdict {
            ReflectionVerdict::RawReflection => {
                self.raw += 1;
                if trial.browser_verified {
                    self.verified += 1;
                }
            }
            ReflectionVerdict::EscapedReflection => self.escaped += 1,
            ReflectionVerdict::NoReflection => {}
        }
    }
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_banner(&self) {
        println!(
            "\n{} {}",
            "XSSpect".red().bold(),
            format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
        );
        println!("{}\n", "Reflected XSS scanner with browser verification".dimmed());
    }

    pub fn print_trial(&self, trial: &Trial, browser_verify: bool, show_all: bool) {
        match trial.verdict {
            ReflectionVerdict::RawReflection => {
                if trial.browser_verified {
                    println!("\n{}", "[+++] VERIFIED XSS (Executed in Browser!)".red().bold());
                } else if browser_verify {
                    println!(
                        "\n{}",
                        "[+] RAW XSS FOUND (Static Analysis - Not Verified in Browser)".red()
                    );
                } else {
                    println!("\n{}", "[+] RAW XSS FOUND".red());
                }
                Self::print_location(trial);
                if let Some(kind) = trial.trigger_kind {
                    println!("    Event Type: {}()", kind.to_string().yellow());
                }
                println!();
            }
            ReflectionVerdict::EscapedReflection if show_all => {
                println!("\n{}", "[~] Escaped reflection".yellow());
                Self::print_location(trial);
                println!();
            }
            ReflectionVerdict::NoReflection if show_all => {
                println!("{}", "[-] No reflection".dimmed());
                Self::print_location(trial);
                println!();
            }
            _ => {}
        }
    }

    pub fn print_stop(&self, parameter: &str) {
        println!(
            "{} Stopping tests for param '{}' (--stop-on-hit enabled)\n",
            "[*]".cyan(),
            parameter
        );
    }

    pub fn print_parameter_summary(
        &self,
        parameter: &str,
        tally: &ParameterTally,
        browser_verify: bool,
    ) {
        if tally.raw == 0 && tally.escaped == 0 {
            println!("{} No reflections found for param: {}\n", "[-]".dimmed(), parameter);
        } else if browser_verify && tally.verified > 0 {
            println!(
                "{} Summary for param '{}': {} raw ({} verified in browser), {} escaped\n",
                "[*]".cyan(),
                parameter,
                tally.raw,
                tally.verified,
                tally.escaped
            );
        } else {
            println!(
                "{} Summary for param '{}': {} raw, {} escaped\n",
                "[*]".cyan(),
                parameter,
                tally.raw,
                tally.escaped
            );
        }
    }

    pub fn print_summary(&self, report: &ScanReport) {
        let rows: Vec<TableRow> = report
            .parameters
            .iter()
            .map(|parameter| {
                let mut tally = ParameterTally::default();
                let trials: Vec<&Trial> = report
                    .trials
                    .iter()
                    .filter(|t| &t.parameter == parameter)
                    .collect();
                for trial in &trials {
                    tally.record(trial);
                }

                let status = if tally.verified > 0 {
                    Self::severity_label(Severity::Critical)
                } else if tally.raw > 0 {
                    Self::severity_label(Severity::High)
                } else if tally.escaped > 0 {
                    Self::severity_label(Severity::Low)
                } else {
                    "OK".green().to_string()
                };

                TableRow {
                    parameter: parameter.clone(),
                    trials: trials.len(),
                    raw: tally.raw,
                    verified: tally.verified,
                    escaped: tally.escaped,
                    status,
                }
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        println!("\n{}", "Summary".bold().underline());
        println!("{}", table);
        println!(
            "{} trials against {} in {}s",
            report.trials.len(),
            report.target,
            report.duration_secs()
        );
        println!(
            "Overall risk: {}\n",
            Self::severity_label(report.max_severity())
        );
    }

    fn print_location(trial: &Trial) {
        println!("    Param: {}", trial.parameter.white().bold());
        println!("    Payload: {}", trial.payload);
    }

    fn severity_label(severity: Severity) -> String {
        match severity {
            Severity::Critical => "CRITICAL".red().bold().to_string(),
            Severity::High => "HIGH".red().to_string(),
            Severity::Low => "LOW".blue().to_string(),
            Severity::Info => "INFO".cyan().to_string(),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
