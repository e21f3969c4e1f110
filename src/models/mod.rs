//! Data models shared across the pipeline

mod types;

pub use types::*;
