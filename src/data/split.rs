//! Shuffled train/test split of rating samples.

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::RatingSample;
use crate::error::{CfError, Result};

fn validate_split_inputs(n_samples: usize, test_fraction: f64) -> Result<(usize, usize)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(CfError::invalid_hyperparameter(
            "test_fraction",
            test_fraction,
            "in (0, 1)",
        ));
    }

    let n_test = (n_samples as f64 * test_fraction).round() as usize;
    let n_train = n_samples - n_test.min(n_samples);

    if n_test == 0 || n_train == 0 {
        return Err(CfError::invalid_hyperparameter(
            "test_fraction",
            test_fraction,
            &format!("a split leaving both sides non-empty (n_train={n_train}, n_test={n_test})"),
        ));
    }

    Ok((n_train, n_test))
}

fn shuffle_indices(n_samples: usize, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();

    if let Some(seed) = seed {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    indices
}

/// Split samples into shuffled `(train, test)` sets.
///
/// # Arguments
///
/// * `samples` - All observed ratings
/// * `test_fraction` - Share of samples held out, in `(0, 1)`
/// * `seed` - Seed for a reproducible shuffle (`None` for a random one)
///
/// # Errors
///
/// Returns [`CfError::InvalidHyperparameter`] if `test_fraction` is outside
/// `(0, 1)` or the split would leave one side empty.
///
/// # Examples
///
/// ```
/// use usercf::data::{train_test_split, RatingSample};
///
/// let samples: Vec<RatingSample> = (0..10)
///     .map(|i| RatingSample::new(i, i, 3.0))
///     .collect();
/// let (train, test) = train_test_split(&samples, 0.2, Some(42)).unwrap();
///
/// assert_eq!(train.len(), 8);
/// assert_eq!(test.len(), 2);
/// ```
pub fn train_test_split(
    samples: &[RatingSample],
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<(Vec<RatingSample>, Vec<RatingSample>)> {
    let (n_train, _) = validate_split_inputs(samples.len(), test_fraction)?;

    let indices = shuffle_indices(samples.len(), seed);
    let train = indices[..n_train].iter().map(|&i| samples[i]).collect();
    let test = indices[n_train..].iter().map(|&i| samples[i]).collect();

    Ok((train, test))
}
