//! Non-interactive conversion of a ManaBox export

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use super::args::ConvertArgs;
use super::prompts::confirm_overwrite;
use crate::pipeline::{
    write_records, ConversionEvent, ConversionReport, ConversionRunner, Field, Filters,
    ResultStore, Summary, Vendor,
};
use crate::report::{export_run_report, preview_table, ConversionSummary, RunReport, SortStep};
use crate::utils::{
    create_row_progress, create_spinner, finish_row_progress, finish_with_success,
    finish_with_warning, print_banner, print_completion, print_config, print_count, print_info,
    print_link, print_step_header, print_success, print_warning,
};

/// Resolved settings for one `convert` run
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub vendor: Vendor,
    pub filters: Filters,
    /// Sort toggles, applied in order
    pub sorts: Vec<Field>,
    pub preview_limit: usize,
    pub show_preview: bool,
    pub report: Option<PathBuf>,
    pub no_confirm: bool,
}

impl From<&ConvertArgs> for ConvertConfig {
    fn from(args: &ConvertArgs) -> Self {
        let mut filters = Filters::new();
        for (field, text) in &args.filters {
            filters.set(*field, text);
        }
        Self {
            input: args.input.clone(),
            output: args.output_path(),
            vendor: args.vendor,
            filters,
            sorts: args.sorts.clone(),
            preview_limit: args.limit,
            show_preview: !args.no_preview,
            report: args.report.clone(),
            no_confirm: args.no_confirm,
        }
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    pub conversion: ConversionReport,
    /// Aggregate over the filtered view
    pub displayed: Summary,
    /// Where the CSV was written, `None` when the user declined to overwrite
    pub saved_to: Option<PathBuf>,
}

/// Convert, filter, sort, preview and export in one pass
pub fn run_convert(config: &ConvertConfig) -> Result<ConvertOutcome> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config.input, config.vendor, &config.output);

    // Step 1: read and convert on the worker, following its progress events
    print_step_header(1, "Convert Rows");
    let step_start = Instant::now();
    let mut store = ResultStore::new();
    store.set_filters(config.filters.clone());

    let conversion = convert_with_progress(&mut store, &config.input, config.vendor)?;
    if conversion.skipped > 0 {
        print_warning(&format!(
            "{} row(s) skipped: {} has no mapping yet",
            conversion.skipped,
            config.vendor.name()
        ));
    }
    print_step_time(step_start);

    // Step 2: filters and sort toggles
    print_step_header(2, "Filter & Sort");
    if config.filters.is_empty() {
        print_info("No filters applied");
    } else {
        for field in Field::ALL {
            let text = config.filters.get(field);
            if !text.is_empty() {
                print_info(&format!("{} contains \"{}\"", field, text));
            }
        }
    }

    let mut sort_steps = Vec::with_capacity(config.sorts.len());
    for &field in &config.sorts {
        let direction = store.sort(field);
        print_info(&format!("Sorted by {} ({})", field, direction));
        sort_steps.push(SortStep { field, direction });
    }
    print_count("displayed row(s)", store.displayed_len(), None);

    if config.show_preview && config.preview_limit > 0 {
        print_preview(&store, config.preview_limit);
    }

    // Step 3: export in the store's current order
    print_step_header(3, "Save Results");
    let step_start = Instant::now();
    let saved_to = save_records(&store, &config.output, config.no_confirm)?;
    print_step_time(step_start);

    let displayed = store.summary();
    if let Some(report_path) = &config.report {
        let report = RunReport::new(
            &config.input,
            saved_to.as_deref(),
            conversion.clone(),
            config.filters.clone(),
            sort_steps,
            displayed,
        );
        export_run_report(&report, report_path)?;
        print_success(&format!("Run report written to {}", report_path.display()));
    }

    ConversionSummary::new(conversion.clone(), displayed).display();
    println!();
    print_link(config.vendor);
    print_completion();

    Ok(ConvertOutcome {
        conversion,
        displayed,
        saved_to,
    })
}

fn convert_with_progress(
    store: &mut ResultStore,
    input: &Path,
    vendor: Vendor,
) -> Result<ConversionReport> {
    let spinner = create_spinner("Reading ManaBox export...");
    let runner = ConversionRunner::new();
    let handle = match runner.start(input, vendor) {
        Ok(handle) => handle,
        Err(err) => {
            finish_with_warning(&spinner, "Could not read input");
            return Err(err.into());
        }
    };
    spinner.finish_and_clear();

    let mut progress = None;
    let report = handle.drain_into(store, |event| match event {
        ConversionEvent::Started { total } => {
            progress = Some(create_row_progress(*total));
        }
        ConversionEvent::Converted { .. } | ConversionEvent::Skipped { .. } => {
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }
        ConversionEvent::Finished(_) => {}
    })?;

    if let Some(pb) = &progress {
        finish_row_progress(pb, &report);
    }
    Ok(report)
}

fn print_preview(store: &ResultStore, limit: usize) {
    println!();
    for line in preview_table(store, limit).to_string().lines() {
        println!("    {}", line);
    }
    let hidden = store.displayed_len().saturating_sub(limit);
    if hidden > 0 {
        println!(
            "    {}",
            style(format!("… and {} more row(s)", hidden)).dim()
        );
    }
}

fn save_records(store: &ResultStore, output: &Path, no_confirm: bool) -> Result<Option<PathBuf>> {
    if output.exists() && !no_confirm && !confirm_overwrite(output)? {
        print_warning("Output file left untouched");
        return Ok(None);
    }

    let spinner = create_spinner("Writing output file...");
    write_records(output, store.records())
        .with_context(|| format!("Could not save {} converted row(s)", store.len()))?;
    finish_with_success(
        &spinner,
        &format!("Saved {} row(s) to {}", store.len(), output.display()),
    );
    Ok(Some(output.to_path_buf()))
}

fn print_step_time(start: Instant) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", start.elapsed().as_secs_f64())).dim()
    );
}
