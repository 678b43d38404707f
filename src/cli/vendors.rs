//! Vendor listing and submission page commands

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::Vendor;
use crate::utils::{open_vendor_page, print_success, UrlOpener};

/// Table of every registered vendor
pub fn vendor_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Vendor").add_attribute(Attribute::Bold),
        Cell::new("Mapping").add_attribute(Attribute::Bold),
        Cell::new("Submission Page").add_attribute(Attribute::Bold),
    ]);

    for vendor in Vendor::ALL {
        let mapping = if vendor.is_supported() {
            Cell::new("✓ available").fg(Color::Green)
        } else {
            Cell::new("— not yet").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(vendor.name()),
            mapping,
            Cell::new(vendor.submission_url()),
        ]);
    }
    table
}

/// Print the vendor registry
pub fn run_vendors() -> Result<()> {
    println!();
    println!(
        "    {} {}",
        style("🏪").cyan(),
        style("VENDORS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
    for line in vendor_table().to_string().lines() {
        println!("    {}", line);
    }
    println!();
    Ok(())
}

/// Open the submission page of `vendor`
pub fn run_open(vendor: Vendor, opener: &dyn UrlOpener) -> Result<()> {
    let url = open_vendor_page(vendor, opener)?;
    print_success(&format!("Opened {} submission page: {}", vendor.name(), url));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_table_lists_every_vendor() {
        let rendered = vendor_table().to_string();
        for vendor in Vendor::ALL {
            assert!(rendered.contains(vendor.name()));
            assert!(rendered.contains(vendor.submission_url()));
        }
    }
}
