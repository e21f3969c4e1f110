//! Lloyd's k-means with k-means++ seeding

use super::silhouette::silhouette_score;
use super::squared_distance;
use crate::config::ClusteringConfig;
use crate::error::{PipelineError, Result};
use crate::models::ClusteringResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// K-means clusterer.
///
/// Runs `n_init` independent seedings and keeps the run with the lowest
/// inertia (sum of squared distances to the assigned center).
#[derive(Debug, Clone)]
pub struct KMeans {
    pub n_clusters: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

/// Output of a k-means fit
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centers: Vec<Vec<f64>>,
    pub inertia: f64,
    pub n_iter: usize,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }

    pub fn from_config(n_clusters: usize, config: &ClusteringConfig) -> Self {
        Self {
            n_clusters,
            n_init: config.n_init,
            max_iter: config.max_iter,
            tol: config.tol,
            seed: config.seed,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fit on the rows of `features` and return the cluster of each row
    pub fn fit_predict(&self, features: &[Vec<f64>]) -> Result<KMeansFit> {
        let n = features.len();
        if self.n_clusters == 0 {
            return Err(PipelineError::invalid("n_clusters", "must be at least 1"));
        }
        if self.n_clusters > n {
            return Err(PipelineError::invalid(
                "n_clusters",
                format!("{} clusters requested for {} samples", self.n_clusters, n),
            ));
        }
        if self.n_init == 0 {
            return Err(PipelineError::invalid("n_init", "must be at least 1"));
        }
        let dim = features[0].len();
        if let Some(row) = features.iter().find(|row| row.len() != dim) {
            return Err(PipelineError::DimensionMismatch {
                expected: dim,
                actual: row.len(),
            });
        }

        let tol = self.tol * mean_variance(features);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best: Option<KMeansFit> = None;
        for run in 0..self.n_init {
            let fit = self.single_run(features, tol, &mut rng);
            debug!(
                "k-means run {}: inertia = {:.6}, iterations = {}",
                run + 1,
                fit.inertia,
                fit.n_iter
            );
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| PipelineError::invalid("n_init", "must be at least 1"))
    }

    fn single_run(&self, features: &[Vec<f64>], tol: f64, rng: &mut StdRng) -> KMeansFit {
        let k = self.n_clusters;
        let dim = features[0].len();
        let mut centers = kmeans_plus_plus(features, k, rng);
        let mut labels = vec![0; features.len()];
        let mut n_iter = 0;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;
            assign(features, &centers, &mut labels);

            // Update centers
            let mut sums = vec![vec![0.0; dim]; k];
            let mut counts = vec![0usize; k];
            for (row, &label) in features.iter().zip(labels.iter()) {
                counts[label] += 1;
                for (s, x) in sums[label].iter_mut().zip(row.iter()) {
                    *s += x;
                }
            }

            for j in 0..k {
                if counts[j] != 0 {
                    continue;
                }
                // Re-seed with the point farthest from its own center, taken
                // from a cluster that keeps at least one member
                if let Some(far) = farthest_point(features, &centers, &labels, &counts) {
                    let old = labels[far];
                    counts[old] -= 1;
                    for (s, x) in sums[old].iter_mut().zip(features[far].iter()) {
                        *s -= x;
                    }
                    sums[j] = features[far].clone();
                    counts[j] = 1;
                    labels[far] = j;
                }
            }

            let mut shift = 0.0;
            for j in 0..k {
                let new_center: Vec<f64> = sums[j].iter().map(|s| s / counts[j] as f64).collect();
                shift += squared_distance(&centers[j], &new_center);
                centers[j] = new_center;
            }

            if shift <= tol {
                break;
            }
        }

        assign(features, &centers, &mut labels);
        let inertia = features
            .iter()
            .zip(labels.iter())
            .map(|(row, &l)| squared_distance(row, &centers[l]))
            .sum();

        KMeansFit {
            labels,
            centers,
            inertia,
            n_iter,
        }
    }
}

/// k-means++: first center uniform, the rest sampled proportionally to the
/// squared distance to the nearest chosen center
fn kmeans_plus_plus(features: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = features.len();
    let mut centers = Vec::with_capacity(k);
    centers.push(features[rng.gen_range(0..n)].clone());

    let mut closest: Vec<f64> = features
        .iter()
        .map(|row| squared_distance(row, &centers[0]))
        .collect();

    while centers.len() < k {
        let total: f64 = closest.iter().sum();
        let idx = if total <= 0.0 {
            rng.gen_range(0..n)
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = n - 1;
            for (i, &d) in closest.iter().enumerate() {
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        };

        let center = features[idx].clone();
        for (c, row) in closest.iter_mut().zip(features.iter()) {
            *c = c.min(squared_distance(row, &center));
        }
        centers.push(center);
    }

    centers
}

fn assign(features: &[Vec<f64>], centers: &[Vec<f64>], labels: &mut [usize]) {
    for (row, label) in features.iter().zip(labels.iter_mut()) {
        let mut best_dist = f64::MAX;
        for (j, center) in centers.iter().enumerate() {
            let dist = squared_distance(row, center);
            if dist < best_dist {
                best_dist = dist;
                *label = j;
            }
        }
    }
}

/// Point farthest from its center among clusters with more than one member
fn farthest_point(
    features: &[Vec<f64>],
    centers: &[Vec<f64>],
    labels: &[usize],
    counts: &[usize],
) -> Option<usize> {
    features
        .iter()
        .zip(labels.iter())
        .enumerate()
        .filter(|(_, (_, &l))| counts[l] > 1)
        .map(|(i, (row, &l))| (i, squared_distance(row, &centers[l])))
        .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
            Some((_, best_d)) if best_d >= d => best,
            _ => Some((i, d)),
        })
        .map(|(i, _)| i)
}

/// Mean per-feature variance, used to scale the convergence tolerance
fn mean_variance(features: &[Vec<f64>]) -> f64 {
    let n = features.len() as f64;
    let dim = features[0].len();
    if dim == 0 {
        return 0.0;
    }
    let mut total = 0.0;
    for j in 0..dim {
        let mean = features.iter().map(|row| row[j]).sum::<f64>() / n;
        total += features.iter().map(|row| (row[j] - mean).powi(2)).sum::<f64>() / n;
    }
    total / dim as f64
}

/// Fit k-means and score the labeling with the silhouette coefficient.
///
/// The silhouette is left empty (with a warning) when the labeling has fewer
/// than two distinct clusters or one cluster per sample.
pub fn train_clustering(
    features: &[Vec<f64>],
    n_clusters: usize,
    config: &ClusteringConfig,
) -> Result<ClusteringResult> {
    info!(
        "Clustering {} documents into {} clusters",
        features.len(),
        n_clusters
    );

    let fit = KMeans::from_config(n_clusters, config).fit_predict(features)?;

    let silhouette = match silhouette_score(features, &fit.labels) {
        Ok(score) => {
            info!("Silhouette score: {:.3}", score);
            Some(score)
        }
        Err(e) => {
            warn!("Silhouette score unavailable: {}", e);
            None
        }
    };

    Ok(ClusteringResult {
        labels: fit.labels,
        silhouette_score: silhouette,
        n_clusters,
        centers: fit.centers,
        inertia: fit.inertia,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.2],
            vec![0.2, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 5.2],
            vec![5.2, 4.9],
            vec![0.0, 9.0],
            vec![0.2, 9.1],
        ]
    }

    #[test]
    fn test_kmeans_separates_blobs() {
        let fit = KMeans::new(3).fit_predict(&blobs()).unwrap();

        assert_eq!(fit.labels.len(), 8);
        assert!(fit.labels.iter().all(|&l| l < 3));
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[5]);
        assert_eq!(fit.labels[6], fit.labels[7]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert_ne!(fit.labels[0], fit.labels[6]);
        assert_ne!(fit.labels[3], fit.labels[6]);
    }

    #[test]
    fn test_kmeans_deterministic() {
        let a = KMeans::new(2).with_seed(7).fit_predict(&blobs()).unwrap();
        let b = KMeans::new(2).with_seed(7).fit_predict(&blobs()).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_kmeans_invalid_k() {
        assert!(KMeans::new(0).fit_predict(&blobs()).is_err());
        assert!(KMeans::new(9).fit_predict(&blobs()).is_err());
    }

    #[test]
    fn test_kmeans_identical_points() {
        let features = vec![vec![1.0, 1.0]; 4];
        let fit = KMeans::new(2).fit_predict(&features).unwrap();
        assert_eq!(fit.inertia, 0.0);
        assert!(fit.labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn test_farthest_point_skips_singletons() {
        let features = vec![vec![0.0], vec![1.0], vec![100.0]];
        // Point 2 is the farthest from a center but alone in its cluster
        let centers = vec![vec![0.5], vec![0.0]];
        let labels = vec![0, 0, 1];
        assert_eq!(farthest_point(&features, &centers, &labels, &[2, 1]), Some(0));

        let centers = vec![vec![0.0], vec![1.0], vec![100.0]];
        assert_eq!(
            farthest_point(&features, &centers, &[0, 1, 2], &[1, 1, 1]),
            None
        );
    }

    #[test]
    fn test_kmeans_one_cluster_per_point() {
        let features = vec![vec![0.0, 0.0], vec![3.0, 0.0], vec![0.0, 4.0]];
        let fit = KMeans::new(3).fit_predict(&features).unwrap();

        let mut labels = fit.labels.clone();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1, 2]);
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn test_train_clustering_scores() {
        let result = train_clustering(&blobs(), 3, &ClusteringConfig::default()).unwrap();
        let score = result.silhouette_score.unwrap();
        assert!(score > 0.8 && score <= 1.0);
        assert_eq!(result.cluster_sizes().iter().sum::<usize>(), 8);
    }

    #[test]
    fn test_train_clustering_one_per_sample() {
        let features = vec![vec![0.0], vec![1.0], vec![2.0]];
        let result = train_clustering(&features, 3, &ClusteringConfig::default()).unwrap();
        assert!(result.silhouette_score.is_none());
    }
}
