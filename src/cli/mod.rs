//! CLI module - argument parsing, commands and interactive screens

pub mod args;
pub mod convert;
pub mod file_selector;
pub mod preview;
pub mod prompts;
pub mod vendors;

pub use args::{derive_output_path, Cli, Commands, ConvertArgs};
pub use convert::{run_convert, ConvertConfig, ConvertOutcome};
pub use file_selector::{run_file_selector, FileSelectResult};
pub use preview::{run_preview, PreviewConfig};
pub use prompts::*;
pub use vendors::{run_open, run_vendors};
