//! Terminal output, progress, logging and browser helpers

pub mod browser;
pub mod logging;
pub mod progress;
pub mod styling;

pub use browser::*;
pub use logging::*;
pub use progress::*;
pub use styling::*;
