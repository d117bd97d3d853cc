//! Stratified train/test split

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::synthetic::LabeledSample;
use super::TrainingError;

/// Split each class separately so both halves keep the class proportions.
///
/// Every class with at least two samples contributes at least one sample to
/// each side.
pub fn train_test_split(
    samples: &[LabeledSample],
    test_size: f64,
    seed: u64,
) -> Result<(Vec<LabeledSample>, Vec<LabeledSample>), TrainingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::InvalidSplit(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, sample) in samples.iter().enumerate() {
        by_class.entry(sample.label.as_str()).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (_, mut indices) in by_class {
        indices.shuffle(&mut rng);

        let n = indices.len();
        let n_test = if n < 2 {
            0
        } else {
            ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1)
        };

        test.extend(indices[..n_test].iter().map(|&i| samples[i].clone()));
        train.extend(indices[n_test..].iter().map(|&i| samples[i].clone()));
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::synthetic::{generate_seeded, vehicle_catalog};

    #[test]
    fn test_split_sizes_are_stratified() {
        let catalog = vehicle_catalog();
        let samples = generate_seeded(&catalog, 100, 42).unwrap();

        let (train, test) = train_test_split(&samples, 0.2, 42).unwrap();

        assert_eq!(train.len() + test.len(), samples.len());
        assert_eq!(test.len(), 20 * catalog.len());
        for spec in &catalog {
            assert_eq!(test.iter().filter(|s| s.label == spec.label).count(), 20);
        }
    }

    #[test]
    fn test_split_is_reproducible() {
        let samples = generate_seeded(&vehicle_catalog(), 30, 1).unwrap();

        let (train_a, test_a) = train_test_split(&samples, 0.25, 9).unwrap();
        let (train_b, test_b) = train_test_split(&samples, 0.25, 9).unwrap();

        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn test_small_classes_keep_a_training_sample() {
        let samples = generate_seeded(&vehicle_catalog()[..2], 2, 3).unwrap();
        let (train, test) = train_test_split(&samples, 0.9, 3).unwrap();

        assert_eq!(train.len(), 2);
        assert_eq!(test.len(), 2);
    }

    #[test]
    fn test_invalid_test_size() {
        let samples = generate_seeded(&vehicle_catalog(), 5, 1).unwrap();
        assert!(train_test_split(&samples, 0.0, 1).is_err());
        assert!(train_test_split(&samples, 1.0, 1).is_err());
    }
}
