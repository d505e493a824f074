//! Data models for the CSV importer
//!
//! These models are shared between the parser, the importer and the CLI.

pub mod record;
pub mod summary;

pub use record::*;
pub use summary::*;
