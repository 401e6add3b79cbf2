use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use xsspect::browser::{BrowserConfig, ChromeLauncher, VerifierConfig};
use xsspect::cli::{Cli, Commands, ReportFormat, ScanArgs};
use xsspect::http::{Requester, RequesterConfig};
use xsspect::models::ScanConfig;
use xsspect::reporter::{ConsoleReporter, CsvExporter, JsonExporter, RcloneSync, TextExporter};
use xsspect::scanner::Scanner;

const OUTPUTS_DIR: &str = "outputs";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            init_tracing(args.verbose);
            run_scan(args).await
        }
        Commands::Report { input, format, output } => {
            init_tracing(0);
            run_report(&input, format, output.as_deref())
        }
    }
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("xsspect={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_scan(args: ScanArgs) -> Result<()> {
    let reporter = ConsoleReporter::new();
    reporter.print_banner();

    let config = ScanConfig::new(
        &args.url,
        &args.method,
        &args.params,
        args.payload.clone(),
        args.payload_file.clone(),
    )?
    .with_stop_on_hit(args.stop_on_hit)
    .with_show_all(args.show)
    .with_browser_verify(args.browser_verify);

    let payloads = config.payload_source.load()?;
    println!("{} Target: {} ({})", "[*]".cyan(), config.target, config.method);
    println!("{} Parameters: {}", "[*]".cyan(), config.parameters.join(", "));
    println!(
        "{} Payloads: {} from {}",
        "[*]".cyan(),
        payloads.len(),
        config.payload_source.describe()
    );
    if config.browser_verify {
        println!("{} Browser verification enabled", "[*]".cyan());
    }
    println!();

    let requester = Requester::new(RequesterConfig {
        timeout: Duration::from_secs(args.timeout),
        max_retries: args.retries,
        ..RequesterConfig::default()
    })?;

    let launcher = config.browser_verify.then(|| {
        ChromeLauncher::new(BrowserConfig {
            chrome_path: args.chrome_path.clone(),
            headless: !args.headful,
            ..BrowserConfig::default()
        })
    });

    let verifier_config = VerifierConfig {
        page_load_timeout: Duration::from_secs(args.timeout),
        max_retries: args.verify_retries,
        ..VerifierConfig::default()
    };

    let mut scanner = Scanner::new(requester, config, launcher)
        .with_verifier_config(verifier_config)
        .with_progress(true);
    let report = scanner.scan(&payloads).await;

    reporter.print_summary(&report);

    if let Some(path) = &args.output {
        JsonExporter::export(&report, path)?;
        println!("{} JSON report written to {}", "[+]".green(), path);
    }

    if let Some(path) = &args.txt_output {
        TextExporter::export(&report, path)?;
        println!("{} Text report written to {}", "[+]".green(), path);
    }

    if args.report || args.csv_output.is_some() {
        let path = args.csv_output.clone().unwrap_or_else(|| {
            format!(
                "{}/xsspect_report_{}.csv",
                OUTPUTS_DIR,
                Local::now().format("%Y%m%d_%H%M%S")
            )
        });
        CsvExporter::export(&report, &path)?;
        println!("{} CSV report written to {}", "[+]".green(), path);
    }

    if let Some(remote) = &args.sync_remote {
        let sync = RcloneSync::new(remote);
        match sync.sync(OUTPUTS_DIR).await {
            Ok(()) => println!("{} Reports synced to {}", "[+]".green(), sync.remote()),
            Err(e) => warn!("Report sync failed: {:#}", e),
        }
    }

    info!("Scan finished with {} raw finding(s)", report.raw_count);
    Ok(())
}

fn run_report(input: &str, format: ReportFormat, output: Option<&str>) -> Result<()> {
    let report = JsonExporter::load(input)?;

    match (format, output) {
        (ReportFormat::Txt, Some(path)) => TextExporter::export(&report, path)?,
        (ReportFormat::Txt, None) => print!("{}", TextExporter::render(&report)?),
        (ReportFormat::Csv, Some(path)) => CsvExporter::export(&report, path)?,
        (ReportFormat::Csv, None) => CsvExporter::write(&report, std::io::stdout().lock())?,
        (ReportFormat::Json, Some(path)) => JsonExporter::export(&report, path)?,
        (ReportFormat::Json, None) => {
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            println!("{}", json);
        }
    }

    if let Some(path) = output {
        println!("{} Report written to {}", "[+]".green(), path);
    }
    Ok(())
}
