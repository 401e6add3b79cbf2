use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "xsspect")]
#[command(version, about = "Reflected XSS scanner with headless browser verification")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Scan(ScanArgs),

    /// Re-render a scan saved with --output
    Report {
        #[arg(short, long)]
        input: String,

        #[arg(short, long, value_enum, default_value = "txt")]
        format: ReportFormat,

        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(clap::Args)]
pub struct ScanArgs {
    #[arg(short, long)]
    pub url: String,

    /// Comma-separated query parameters to test
    #[arg(short, long)]
    pub params: String,

    #[arg(short, long, default_value = "GET")]
    pub method: String,

    #[arg(long)]
    pub stop_on_hit: bool,

    /// Also list escaped and non-reflected payloads
    #[arg(long)]
    pub show: bool,

    #[arg(long, conflicts_with = "payload_file")]
    pub payload: Option<String>,

    /// Payload file, one payload per line (.txt only)
    #[arg(long)]
    pub payload_file: Option<PathBuf>,

    #[arg(long)]
    pub browser_verify: bool,

    #[arg(long)]
    pub chrome_path: Option<PathBuf>,

    #[arg(long)]
    pub headful: bool,

    #[arg(short, long, default_value = "10")]
    pub timeout: u64,

    #[arg(long, default_value = "2")]
    pub retries: u32,

    #[arg(long, default_value = "1")]
    pub verify_retries: u32,

    /// Write a CSV report (timestamped under outputs/ unless --csv-output is set)
    #[arg(long)]
    pub report: bool,

    #[arg(long)]
    pub csv_output: Option<String>,

    #[arg(long)]
    pub txt_output: Option<String>,

    #[arg(short, long)]
    pub output: Option<String>,

    /// rclone remote to mirror the outputs directory to
    #[arg(long)]
    pub sync_remote: Option<String>,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Txt,
    Csv,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let cli =
            Cli::try_parse_from(["xsspect", "scan", "--url", "https://x.test/", "--params", "q"])
                .unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.method, "GET");
        assert_eq!(args.timeout, 10);
        assert_eq!(args.retries, 2);
        assert_eq!(args.verify_retries, 1);
        assert_eq!(args.verbose, 0);
        assert!(!args.browser_verify);
    }

    #[test]
    fn test_payload_sources_conflict() {
        let result = Cli::try_parse_from([
            "xsspect",
            "scan",
            "--url",
            "https://x.test/",
            "--params",
            "q",
            "--payload",
            "<b>",
            "--payload-file",
            "p.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_format() {
        let cli =
            Cli::try_parse_from(["xsspect", "report", "-i", "scan.json", "-f", "csv"]).unwrap();
        let Commands::Report { format, .. } = cli.command else {
            panic!("expected report");
        };
        assert_eq!(format, ReportFormat::Csv);
    }
}
