//! ManaConv: ManaBox export converter
//!
//! Converts card lists exported by the ManaBox app into vendor buylist CSVs,
//! either through an interactive preview or a one-shot `convert` command.

use anyhow::Result;
use clap::Parser;

use manaconv::cli::{
    run_convert, run_file_selector, run_open, run_preview, run_vendors, select_vendor, Cli,
    Commands, ConvertConfig, FileSelectResult, PreviewConfig,
};
use manaconv::pipeline::Vendor;
use manaconv::utils::{init_logging, SystemBrowser};

/// Log file used by the full-screen preview when none is given
const PREVIEW_LOG_FILE: &str = "manaconv.log";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        init_logging(cli.verbose, cli.log_file.as_deref())?;
        return match command {
            Commands::Convert(args) => run_convert(&ConvertConfig::from(args)).map(|_| ()),
            Commands::Vendors => run_vendors(),
            Commands::Open { vendor } => run_open(*vendor, &SystemBrowser),
        };
    }

    // Interactive preview - log lines would draw over the screen, so they go to a file
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(PREVIEW_LOG_FILE));
    init_logging(cli.verbose, Some(&log_file))?;

    let input = match cli.input() {
        Some(input) => input.clone(),
        None => match run_file_selector()? {
            FileSelectResult::Selected(path) => path,
            FileSelectResult::Cancelled => {
                println!("Cancelled by user.");
                return Ok(());
            }
        },
    };

    let vendor = match cli.vendor {
        Some(vendor) => vendor,
        None => select_vendor(Vendor::default())?,
    };
    run_preview(PreviewConfig {
        input,
        output: cli.output.clone(),
        vendor,
    })
}
