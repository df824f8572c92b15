// Shared foundation for the savant crates: data model, configuration,
// CSV ingestion, and the SQLite store.

pub mod config;
pub mod db;
pub mod ingest;
pub mod types;
