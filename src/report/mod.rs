//! Report module - summaries and exports of a conversion run

pub mod preview_table;
pub mod run_report;
pub mod summary;

pub use preview_table::*;
pub use run_report::*;
pub use summary::*;
