//! Train/test splitting with a seeded shuffle

use crate::error::{PipelineError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn split_sizes(n_samples: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::invalid("test_size", "must be in (0, 1)"));
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(PipelineError::InsufficientData(format!(
            "{} samples with test_size={:.2} leaves an empty partition",
            n_samples, test_size
        )));
    }

    Ok((n_train, n_test))
}

/// Random split: `ceil(test_size * n)` rows go to the test set
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    let (_, n_test) = split_sizes(n_samples, test_size)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

/// Split that keeps class proportions in both partitions
///
/// The test set is allocated per class by largest remainder, and every class
/// keeps at least one row in the training set.
pub fn stratified_split(labels: &[String], test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    let n_samples = labels.len();
    let (_, n_test) = split_sizes(n_samples, test_size)?;

    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        by_class.entry(label.as_str()).or_default().push(idx);
    }

    let counts: Vec<usize> = by_class.values().map(|v| v.len()).collect();
    let allocation = allocate(&counts, n_test, n_samples);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_samples - n_test);
    let mut test = Vec::with_capacity(n_test);

    for (mut members, n_class_test) in by_class.into_values().zip(allocation) {
        members.shuffle(&mut rng);
        let rest = members.split_off(n_class_test);
        test.extend(members);
        train.extend(rest);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(TrainTestSplit { train, test })
}

/// Distribute `n_test` rows over classes proportionally to `counts`
fn allocate(counts: &[usize], n_test: usize, n_samples: usize) -> Vec<usize> {
    let mut allocation = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());

    for (class_idx, &count) in counts.iter().enumerate() {
        let exact = n_test as f64 * count as f64 / n_samples as f64;
        let floor = (exact.floor() as usize).min(count.saturating_sub(1));
        allocation.push(floor);
        remainders.push((class_idx, exact - floor as f64));
    }

    remainders.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut missing = n_test.saturating_sub(allocation.iter().sum());
    while missing > 0 {
        let mut progressed = false;
        for &(class_idx, _) in &remainders {
            if missing == 0 {
                break;
            }
            if allocation[class_idx] + 1 < counts[class_idx] {
                allocation[class_idx] += 1;
                missing -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels(pattern: &[(&str, usize)]) -> Vec<String> {
        pattern
            .iter()
            .flat_map(|(l, n)| std::iter::repeat(l.to_string()).take(*n))
            .collect()
    }

    #[test]
    fn test_split_sizes_use_ceil() {
        let split = train_test_split(15, 0.3, 42).unwrap();
        assert_eq!(split.test.len(), 5);
        assert_eq!(split.train.len(), 10);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(20, 0.25, 7).unwrap();
        let all: HashSet<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        assert_eq!(all.len(), 20);
    }

    #[test]
    fn test_split_is_deterministic() {
        assert_eq!(
            train_test_split(30, 0.2, 42).unwrap(),
            train_test_split(30, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(train_test_split(10, 0.0, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
        assert!(train_test_split(1, 0.5, 42).is_err());
    }

    #[test]
    fn test_stratified_keeps_proportions() {
        let y = labels(&[("a", 5), ("b", 5), ("c", 5)]);
        let split = stratified_split(&y, 0.3, 42).unwrap();

        assert_eq!(split.test.len(), 5);
        for class in ["a", "b", "c"] {
            let in_test = split.test.iter().filter(|&&i| y[i] == class).count();
            let in_train = split.train.iter().filter(|&&i| y[i] == class).count();
            assert!(in_test >= 1, "class {} missing from test", class);
            assert!(in_train >= 3, "class {} under-represented in train", class);
        }
    }

    #[test]
    fn test_stratified_never_takes_a_whole_class() {
        let y = labels(&[("big", 8), ("small", 2)]);
        let split = stratified_split(&y, 0.5, 1).unwrap();
        assert!(split.train.iter().any(|&i| y[i] == "small"));
    }
}
