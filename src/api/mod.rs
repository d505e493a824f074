//! Host-facing import API
//!
//! Entry points used by the CLI binary and by library callers.

pub mod import_api;

pub use import_api::{import_csv, import_from_reader, init_logging, ImportConfig};
