//! Conversion pipeline - load, convert, store, export

pub mod converter;
pub mod error;
pub mod export;
pub mod loader;
pub mod record;
pub mod store;
pub mod worker;

pub use converter::*;
pub use error::{ConvertError, Result};
pub use export::*;
pub use loader::*;
pub use record::*;
pub use store::*;
pub use worker::*;
