//! Silhouette coefficient

use super::squared_distance;
use crate::error::{PipelineError, Result};
use std::collections::BTreeSet;

/// Mean silhouette coefficient over all samples (Euclidean distance).
///
/// For sample `i` with mean intra-cluster distance `a` and smallest mean
/// distance to another cluster `b`, `s(i) = (b - a) / max(a, b)`; samples in
/// singleton clusters score 0. Defined for `2 <= n_labels <= n_samples - 1`.
pub fn silhouette_score(features: &[Vec<f64>], labels: &[usize]) -> Result<f64> {
    let n = features.len();
    if labels.len() != n {
        return Err(PipelineError::DimensionMismatch {
            expected: n,
            actual: labels.len(),
        });
    }

    let distinct: BTreeSet<usize> = labels.iter().copied().collect();
    let n_labels = distinct.len();
    if n_labels < 2 || n_labels > n.saturating_sub(1) {
        return Err(PipelineError::InsufficientData(format!(
            "silhouette needs 2 <= n_labels <= n_samples - 1, got {} labels for {} samples",
            n_labels, n
        )));
    }

    let max_label = distinct.iter().next_back().copied().unwrap_or(0);
    let mut sizes = vec![0usize; max_label + 1];
    for &l in labels {
        sizes[l] += 1;
    }

    let mut total = 0.0;
    for i in 0..n {
        let mut sums = vec![0.0; max_label + 1];
        for j in 0..n {
            if i != j {
                sums[labels[j]] += squared_distance(&features[i], &features[j]).sqrt();
            }
        }

        let own = labels[i];
        if sizes[own] <= 1 {
            continue;
        }
        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = distinct
            .iter()
            .filter(|&&l| l != own)
            .map(|&l| sums[l] / sizes[l] as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    Ok(total / n as f64)
}
