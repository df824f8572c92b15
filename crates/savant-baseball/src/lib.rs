// Library root: the sabermetric formula library and the season compute
// pipeline built on it. Nothing in this crate performs I/O.

pub mod metrics;
pub mod pipeline;

pub use pipeline::{compute_savant_data, compute_savant_data_at, compute_savant_data_with};
