//! jobscout - multi-source job listing acquisition.
//!
//! Drives a browser session over four public listing sites, parses the
//! rendered pages into normalized records, and exports the aggregate to
//! a spreadsheet. An optional AI-assisted path extracts structured
//! fields from pages without a stable markup shape.

pub mod cli;
pub mod config;
pub mod dom;
pub mod export;
pub mod http;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod sources;
