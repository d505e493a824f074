//! # Caido CSV Import
//!
//! Moves HTTP traffic exported as CSV into a Caido project.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 caido_csv_import (CLI)                    │
//! ├──────────────────────────────────────────────────────────┤
//! │                     api::import_api                       │
//! │  ┌────────────┐   ┌──────────┐   ┌─────────────────────┐  │
//! │  │ CSV reader │──▶│  Parser  │──▶│  Importer (SQLite)  │  │
//! │  └────────────┘   └──────────┘   └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each record becomes six rows, always written in this order:
//! raw response, response, raw request, request metadata, request,
//! intercept entry.

pub mod api;
pub mod models;
pub mod parser;
pub mod storage;

pub use api::{import_csv, ImportConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
