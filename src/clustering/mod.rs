//! K-means clustering and silhouette evaluation

mod kmeans;
mod silhouette;

pub use kmeans::{train_clustering, KMeans, KMeansFit};
pub use silhouette::silhouette_score;

/// Squared Euclidean distance
pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
