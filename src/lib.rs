//! ManaConv: ManaBox export conversion library
//!
//! Reads card lists exported by the ManaBox app, converts each row into a
//! vendor buylist format, and offers filtering, sorting and CSV export of
//! the converted rows.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
