//! Datasets, built-in corpora and file export

mod dataset;
mod loader;

pub use dataset::{Dataset, HistogramBin};
pub use loader::{DataLoader, MetricRow};
