//! Scores a fitted model against observed ratings.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{Rating, RatingSample};
use crate::error::Result;
use crate::metrics::{mae, rmse};
use crate::recommend::{predict, NeighborLists, Neighborhoods, Profiles};

/// Paired predictions and observed ratings, in sample order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Model predictions
    pub predictions: Vec<Rating>,
    /// Observed ratings
    pub targets: Vec<Rating>,
}

impl Evaluation {
    /// Root mean squared error of the predictions.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::EmptyInput`](crate::error::CfError::EmptyInput)
    /// for an evaluation over no samples.
    pub fn rmse(&self) -> Result<f64> {
        rmse(&self.predictions, &self.targets)
    }

    /// Mean absolute error of the predictions.
    ///
    /// # Errors
    ///
    /// As [`Evaluation::rmse`].
    pub fn mae(&self) -> Result<f64> {
        mae(&self.predictions, &self.targets)
    }

    /// Number of scored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True if nothing was scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Predict every sample with precomputed tables.
///
/// # Errors
///
/// Returns [`CfError::UnknownUser`](crate::error::CfError::UnknownUser) for a
/// sample whose user has no profile.
pub fn evaluate_tables(
    samples: &[RatingSample],
    profiles: &Profiles,
    neighbors: &NeighborLists,
    bounds: (Rating, Rating),
) -> Result<Evaluation> {
    let score = |s: &RatingSample| predict(s.user, s.item, profiles, neighbors, bounds);

    #[cfg(feature = "parallel")]
    let predictions: Vec<Rating> = samples.par_iter().map(score).collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let predictions: Vec<Rating> = samples.iter().map(score).collect::<Result<_>>()?;

    let targets = samples.iter().map(|s| s.rating).collect();
    debug!(samples = samples.len(), "evaluation complete");

    Ok(Evaluation {
        predictions,
        targets,
    })
}

/// Predict every sample with a fitted model.
///
/// # Errors
///
/// As [`evaluate_tables`].
///
/// # Examples
///
/// ```
/// use usercf::config::CfConfig;
/// use usercf::data::{RatingIndex, RatingSample};
/// use usercf::metrics::evaluate;
/// use usercf::recommend::Neighborhoods;
///
/// let train = vec![
///     RatingSample::new(0, 1, 5.0),
///     RatingSample::new(0, 2, 3.0),
///     RatingSample::new(1, 1, 4.0),
///     RatingSample::new(1, 2, 2.0),
/// ];
/// let index = RatingIndex::from_samples(&train).unwrap();
/// let model = Neighborhoods::fit(&index, CfConfig::new().with_k(1).with_min_common_items(1)).unwrap();
///
/// let test = vec![RatingSample::new(0, 3, 4.0)];
/// let report = evaluate(&test, &model).unwrap();
///
/// assert_eq!(report.predictions, vec![4.0]);
/// assert_eq!(report.rmse().unwrap(), 0.0);
/// ```
pub fn evaluate(samples: &[RatingSample], model: &Neighborhoods) -> Result<Evaluation> {
    evaluate_tables(
        samples,
        model.profiles(),
        model.neighbor_lists(),
        model.config().rating_bounds,
    )
}
