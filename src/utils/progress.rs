//! Spinners and row counters for the conversion steps

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::ConversionReport;

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Spinner shown while a whole-file read or write is in progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("    {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(SPINNER_TICK);
    pb
}

/// Bar counting input rows as the worker reports them, converted or skipped
pub fn create_row_progress(total_rows: usize) -> ProgressBar {
    let pb = ProgressBar::new(total_rows as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("    Converting [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) {msg}")
            .unwrap()
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Close the row bar with the run's outcome
pub fn finish_row_progress(pb: &ProgressBar, report: &ConversionReport) {
    if report.skipped == 0 {
        finish_with_success(pb, &format!("{} row(s) converted", report.converted));
    } else {
        finish_with_warning(
            pb,
            &format!(
                "{} converted, {} skipped",
                report.converted, report.skipped
            ),
        );
    }
}

pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

pub fn finish_with_warning(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("⚠️  {}", message));
}
