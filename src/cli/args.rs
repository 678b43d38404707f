//! Command-line argument definitions using clap

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{Field, Vendor};

/// ManaConv - Convert ManaBox collection exports into vendor buylist CSVs
#[derive(Parser, Debug)]
#[command(name = "manaconv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// ManaBox export to preview (CSV).
    /// If not provided, a file selector opens.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file path for the converted CSV.
    /// Defaults to the input directory with a vendor suffix (e.g., cards.csv → cards_cardkingdom.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Vendor to convert for. If not provided, it is chosen interactively.
    #[arg(long, value_parser = parse_vendor)]
    pub vendor: Option<Vendor>,

    /// Increase log verbosity (-v info, -vv debug). MANACONV_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a ManaBox export without the interactive preview
    Convert(ConvertArgs),

    /// List known vendors, whether they have a mapping, and their submission pages
    Vendors,

    /// Open a vendor's submission page in the browser
    Open {
        /// Vendor name (e.g., "Card Kingdom" or cardkingdom)
        #[arg(value_parser = parse_vendor)]
        vendor: Vendor,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// ManaBox export (CSV)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path (optional, defaults to input with a vendor suffix)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Vendor to convert for
    #[arg(long, value_parser = parse_vendor, default_value = "Card Kingdom")]
    pub vendor: Vendor,

    /// Column filter as FIELD=TEXT (case-insensitive substring).
    /// Repeat for several fields; all must match.
    #[arg(long = "filter", value_name = "FIELD=TEXT", value_parser = parse_filter)]
    pub filters: Vec<(Field, String)>,

    /// Sort by a field. Each repeat toggles that field's direction,
    /// starting ascending (e.g., --sort quantity --sort quantity sorts descending).
    #[arg(long = "sort", value_name = "FIELD", value_parser = parse_field)]
    pub sorts: Vec<Field>,

    /// Number of rows shown in the preview table
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Skip the preview table
    #[arg(long, default_value = "false")]
    pub no_preview: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Overwrite an existing output file without asking
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

impl Cli {
    /// Get the input path, if one was given for the interactive preview.
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }
}

impl ConvertArgs {
    /// Get the output path, deriving it from the input if not explicitly provided.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_output_path(&self.input, self.vendor))
    }
}

/// `<input dir>/<stem>_<vendor slug>.csv`
pub fn derive_output_path(input: &Path, vendor: Vendor) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}_{}.csv", stem, vendor.slug()))
}

/// Parser for vendor names
fn parse_vendor(s: &str) -> Result<Vendor, String> {
    s.parse()
}

/// Parser for field names
fn parse_field(s: &str) -> Result<Field, String> {
    s.parse()
}

/// Parser for FIELD=TEXT filters
fn parse_filter(s: &str) -> Result<(Field, String), String> {
    let (field, text) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not a FIELD=TEXT filter", s))?;
    Ok((field.parse()?, text.to_string()))
}
