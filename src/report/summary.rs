//! Conversion summary table

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{ConversionReport, Summary};

/// Counts shown at the end of a run
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub report: ConversionReport,
    /// Aggregate over the displayed (filtered) records
    pub displayed: Summary,
}

impl ConversionSummary {
    pub fn new(report: ConversionReport, displayed: Summary) -> Self {
        Self { report, displayed }
    }

    /// Share of input rows that produced a record, in percent
    pub fn conversion_rate(&self) -> f64 {
        if self.report.total_rows == 0 {
            0.0
        } else {
            self.report.converted as f64 / self.report.total_rows as f64 * 100.0
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("🏪 Vendor"),
            Cell::new(self.report.vendor.name()),
        ]);
        table.add_row(vec![
            Cell::new("📁 Rows Read"),
            Cell::new(self.report.total_rows),
        ]);
        table.add_row(vec![
            Cell::new("✅ Converted"),
            Cell::new(self.report.converted).fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("⏭️  Skipped (No Mapping)"),
            Cell::new(self.report.skipped).fg(if self.report.skipped == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
        table.add_row(vec![
            Cell::new("👀 Displayed Rows"),
            Cell::new(self.displayed.row_count),
        ]);
        table.add_row(vec![
            Cell::new("🃏 Total Quantity"),
            Cell::new(self.displayed.quantity_total)
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
        ]);

        let rate = self.conversion_rate();
        let color = if rate >= 99.9 {
            Color::Green
        } else if rate > 0.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new("📈 Conversion Rate"),
            Cell::new(format!("{:.1}%", rate))
                .fg(color)
                .add_attribute(Attribute::Bold),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("CONVERSION SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.to_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Vendor;
    use chrono::Utc;

    fn report(total_rows: usize, converted: usize) -> ConversionReport {
        ConversionReport {
            vendor: Vendor::CardKingdom,
            total_rows,
            converted,
            skipped: total_rows - converted,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_conversion_rate() {
        let summary = ConversionSummary::new(report(4, 3), Summary::default());
        assert!((summary.conversion_rate() - 75.0).abs() < 1e-9);

        let empty = ConversionSummary::new(report(0, 0), Summary::default());
        assert_eq!(empty.conversion_rate(), 0.0);
    }

    #[test]
    fn test_table_lists_counts() {
        let displayed = Summary {
            row_count: 2,
            quantity_total: 17,
        };
        let rendered = ConversionSummary::new(report(3, 2), displayed)
            .to_table()
            .to_string();

        assert!(rendered.contains("Card Kingdom"));
        assert!(rendered.contains("17"));
        assert!(rendered.contains("66.7%"));
    }
}
